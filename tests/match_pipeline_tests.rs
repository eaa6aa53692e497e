mod utils;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use banterboard::ai::{fame_fallback, shame_fallback};
use utils::*;

async fn hall(setup: &TestSetup) -> Vec<Value> {
    let (status, body) = setup.get("/hall").await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap_or_default()
}

async fn matches(setup: &TestSetup) -> Vec<Value> {
    let (status, body) = setup.get("/matches").await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_confirmed_win_updates_both_players() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, token) = setup.player("Alice").await;
    let bob = setup.register("Bob").await;
    let stats = StatsBuilder::new().score(3, 1).build();

    let (status, record) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("win"))),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", record);
    assert_eq!(record["winnerId"], alice.as_str());
    assert_eq!(record["createdBy"], alice.as_str());
    assert_eq!(record["opponentName"], "Bob");
    assert_eq!(record["team1Stats"]["userId"], alice.as_str());
    assert_eq!(record["team2Stats"]["userId"], bob.as_str());

    let alice_view = setup.user(&alice).await;
    assert_eq!(alice_view["stats"]["wins"], 1);
    assert_eq!(alice_view["stats"]["goalsFor"], 3);
    assert_eq!(alice_view["stats"]["goalsAgainst"], 1);
    assert_eq!(alice_view["matchesPlayed"], 1);

    let bob_view = setup.user(&bob).await;
    assert_eq!(bob_view["stats"]["losses"], 1);
    assert_eq!(bob_view["stats"]["goalsFor"], 1);
    assert_eq!(bob_view["stats"]["goalsAgainst"], 3);
}

#[tokio::test]
async fn test_decisive_match_produces_fame_and_shame() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, token) = setup.player("Alice").await;
    let bob = setup.register("Bob").await;
    let stats = StatsBuilder::new().score(3, 1).build();

    let (status, record) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("win"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert!(eventually(|| async move { hall(setup).await.len() == 2 }).await);

    let entries = hall(setup).await;
    let fame = entries.iter().find(|e| e["type"] == "fame").unwrap();
    let shame = entries.iter().find(|e| e["type"] == "shame").unwrap();

    assert_eq!(fame["subjectId"], alice.as_str());
    assert_eq!(fame["title"], "Glorious Victory");
    assert_eq!(fame["headline"], "Alice defeated Bob");
    assert_eq!(fame["stat"], "Won by 2 goals");
    assert_eq!(fame["matchId"], record["id"]);
    assert_eq!(shame["subjectId"], bob.as_str());
    assert_eq!(shame["title"], "Crushing Defeat");
}

#[tokio::test]
async fn test_resubmission_from_opponent_is_rejected() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, alice_token) = setup.player("Alice").await;
    let (bob, bob_token) = setup.player("Bob").await;
    let stats = StatsBuilder::new().score(3, 1).build();

    let (status, _) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&alice_token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("win"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same screenshot, seen from the other chair
    let (status, body) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&bob_token),
            Some(submission(&stats, Some("team2"), Some(&alice), Some("loss"))),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(matches(setup).await.len(), 1);
    assert_eq!(setup.user(&alice).await["stats"]["wins"], 1);
    assert_eq!(setup.user(&bob).await["stats"]["losses"], 1);
}

#[tokio::test]
async fn test_incomplete_confirmation_writes_nothing() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, token) = setup.player("Alice").await;
    let bob = setup.register("Bob").await;
    let stats = StatsBuilder::new().score(2, 0).build();

    let (status, _) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some(&bob), None)),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some(&alice), Some("win"))),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(matches(setup).await.is_empty());
    assert_eq!(setup.user(&alice).await["matchesPlayed"], 0);
    assert_eq!(setup.user(&bob).await["matchesPlayed"], 0);
}

#[tokio::test]
async fn test_unknown_opponent_is_not_found() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, token) = setup.player("Alice").await;
    let stats = StatsBuilder::new().score(1, 0).build();

    let (status, _) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some("ghost"), Some("win"))),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(matches(setup).await.is_empty());
    assert_eq!(setup.user(&alice).await["stats"]["wins"], 0);
}

#[tokio::test]
async fn test_narrative_outage_never_blocks_the_save() {
    let narrator = Arc::new(FailingNarrator::new());
    let setup = &TestSetupBuilder::new()
        .with_narrator(narrator.clone())
        .build();
    let (_alice, token) = setup.player("Alice").await;
    let bob = setup.register("Bob").await;
    let stats = StatsBuilder::new().score(4, 0).build();

    let (status, record) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("win"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert!(eventually(|| async move { hall(setup).await.len() == 2 }).await);
    let entries = hall(setup).await;
    let fame = entries.iter().find(|e| e["type"] == "fame").unwrap();
    let shame = entries.iter().find(|e| e["type"] == "shame").unwrap();
    assert_eq!(fame["roast"], fame_fallback("Alice").as_str());
    assert_eq!(shame["roast"], shame_fallback("Bob").as_str());

    assert!(
        eventually(|| async move {
            let (_, badges) = setup.get("/badges").await;
            badges
                .as_array()
                .map(|all| {
                    all.iter().any(|b| {
                        b["id"] == "first-victory" && b["description"] == "Get your first win"
                    })
                })
                .unwrap_or(false)
        })
        .await
    );

    let (status, stored) = setup
        .get(&format!("/matches/{}", record["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(stored["roast"].is_null());
    assert!(narrator.call_count() > 0);
}

#[tokio::test]
async fn test_unlock_notifications_reach_only_the_submitter() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, alice_token) = setup.player("Alice").await;
    let (bob, bob_token) = setup.player("Bob").await;
    let stats = StatsBuilder::new().score(1, 3).build();

    // Alice reports her own defeat; Bob earns the badge
    let (status, _) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&alice_token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("loss"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let bob_id = bob.as_str();
    assert!(
        eventually(|| async move {
            setup.user(bob_id).await["badges"]
                .as_array()
                .map(|badges| badges.contains(&json!("first-victory")))
                .unwrap_or(false)
        })
        .await
    );

    let (status, bob_notes) = setup
        .send(Method::GET, "/notifications", Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bob_notes, json!([]));

    let alice_badges = setup.user(&alice).await["badges"].clone();
    assert_eq!(alice_badges, json!([]));

    // Alice gets her own notification once she submits a win
    let rematch = StatsBuilder::new().score(2, 0).variant(1).build();
    let (status, _) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&alice_token),
            Some(submission(&rematch, Some("team1"), Some(&bob), Some("win"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let drained = Mutex::new(Vec::new());
    let drained_ref = &drained;
    let alice_token = alice_token.as_str();
    assert!(
        eventually(|| async move {
            let (_, notes) = setup
                .send(Method::GET, "/notifications", Some(alice_token), None)
                .await;
            let mut drained = drained_ref.lock().await;
            drained.extend(notes.as_array().cloned().unwrap_or_default());
            !drained.is_empty()
        })
        .await
    );
    let drained = drained.into_inner();
    assert!(drained.iter().any(|n| n["name"] == "First Victory"));
}

#[tokio::test]
async fn test_draw_has_no_hall_entries() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, token) = setup.player("Alice").await;
    let bob = setup.register("Bob").await;
    let stats = StatsBuilder::new().score(2, 2).build();

    let (status, record) = setup
        .send(
            Method::POST,
            "/matches",
            Some(&token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("draw"))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["winnerId"], "draw");

    // Badge catalog growth shows the event was handled
    assert!(
        eventually(|| async move {
            let (_, badges) = setup.get("/badges").await;
            badges.as_array().map(|b| !b.is_empty()).unwrap_or(false)
        })
        .await
    );
    assert!(hall(setup).await.is_empty());
    assert_eq!(setup.user(&alice).await["stats"]["draws"], 1);
    assert_eq!(setup.user(&bob).await["stats"]["draws"], 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_submissions_commit_once() {
    let setup = &TestSetupBuilder::new().build();
    let (alice, alice_token) = setup.player("Alice").await;
    let (bob, bob_token) = setup.player("Bob").await;
    let stats = StatsBuilder::new().score(3, 2).build();

    let (first, second) = tokio::join!(
        setup.send(
            Method::POST,
            "/matches",
            Some(&alice_token),
            Some(submission(&stats, Some("team1"), Some(&bob), Some("win"))),
        ),
        setup.send(
            Method::POST,
            "/matches",
            Some(&bob_token),
            Some(submission(&stats, Some("team2"), Some(&alice), Some("loss"))),
        ),
    );

    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(matches(setup).await.len(), 1);
    assert_eq!(setup.user(&alice).await["stats"]["wins"], 1);
    assert_eq!(setup.user(&bob).await["stats"]["losses"], 1);
}

#[tokio::test]
async fn test_extract_returns_the_extractor_guess() {
    let stats = StatsBuilder::new().score(5, 1).build();
    let setup = &TestSetupBuilder::new()
        .with_extractor(Arc::new(FixedExtractor::new(stats.clone())))
        .build();
    let (_alice, token) = setup.player("Alice").await;

    let (status, body) = setup
        .send(
            Method::POST,
            "/matches/extract",
            Some(&token),
            Some(json!({ "image": TEST_IMAGE })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["team1Stats"]["score"], 5);
    assert_eq!(body["team2Name"], "Blue Moon");

    let (status, _) = setup
        .send(
            Method::POST,
            "/matches/extract",
            Some(&token),
            Some(json!({ "image": "not-an-image" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
