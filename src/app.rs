use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::interval;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument};

use crate::ai::{NarrativeGenerator, StatsExtractor};
use crate::badges::{self, BadgeAwarder, BadgeRepository, BadgeService, NotificationCenter};
use crate::config::AppConfig;
use crate::event::{EventBus, EventDispatcher};
use crate::hall::{self, HallOfFameWriter, HallRepository};
use crate::leaderboard::{self, LeaderboardService};
use crate::matches::{self, MatchRepository, MatchRoaster, MatchService};
use crate::milestones::{self, MilestoneRepository, MilestoneService};
use crate::session::{self, TokenConfig};
use crate::shared::AppState;
use crate::user::{self, UserRepository};

/// The external AI services the pipeline talks to
pub struct Collaborators {
    pub extractor: Arc<dyn StatsExtractor>,
    pub narrator: Arc<dyn NarrativeGenerator>,
}

/// Wires services and post-commit subscribers over one store.
///
/// Spawns the event dispatcher, so it must be called inside a tokio runtime.
pub fn build_state<S>(store: Arc<S>, collaborators: Collaborators, config: &AppConfig) -> AppState
where
    S: UserRepository
        + MatchRepository
        + BadgeRepository
        + HallRepository
        + MilestoneRepository
        + 'static,
{
    let Collaborators {
        extractor,
        narrator,
    } = collaborators;
    let event_bus = EventBus::with_default_capacity();

    let match_service = Arc::new(MatchService::new(
        store.clone(),
        store.clone(),
        event_bus.clone(),
    ));
    let badge_service = Arc::new(BadgeService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        narrator.clone(),
        config.catalog.badge_batch_size,
    ));
    let milestone_service = Arc::new(MilestoneService::new(
        store.clone(),
        store.clone(),
        config.catalog.milestone_interval,
    ));
    let leaderboard_service = Arc::new(LeaderboardService::new(store.clone(), store.clone()));
    let notifications = Arc::new(NotificationCenter::new());

    let mut dispatcher = EventDispatcher::new(event_bus.clone())
        .with_handler_timeout(config.effects.handler_timeout)
        .with_max_retries(config.effects.max_retries);
    dispatcher.add_handler(Arc::new(BadgeAwarder::new(
        badge_service.clone(),
        notifications.clone(),
    )));
    dispatcher.add_handler(Arc::new(HallOfFameWriter::new(
        store.clone(),
        store.clone(),
        narrator.clone(),
    )));
    dispatcher.add_handler(Arc::new(MatchRoaster::new(
        store.clone(),
        store.clone(),
        narrator,
    )));
    dispatcher.start_listening();

    AppState {
        users: store.clone(),
        hall: store,
        match_service,
        badge_service,
        milestone_service,
        leaderboard_service,
        extractor,
        notifications,
        token_config: TokenConfig::new(config.jwt_secret.clone(), config.session_expiration_days),
        event_bus,
    }
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/matches", post(matches::submit_match))
        .route("/matches/extract", post(matches::extract_stats))
        .route("/matches/:id/roast", put(matches::update_roast))
        .route("/matches/:id/comments", post(matches::add_comment))
        .route("/hall/:id/roast", put(hall::update_hall_roast))
        .route("/notifications", get(badges::drain_notifications))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::jwt_auth,
        ));

    Router::new()
        .route("/", get(|| async { "banterboard" }))
        .route("/session", post(session::create_session))
        .route("/users", get(user::list_users).post(user::register_user))
        .route("/users/:id", get(user::get_user))
        .route("/users/:id/journey", get(milestones::user_journey))
        .route("/users/:id/rivals", get(leaderboard::rivals))
        .route("/users/:id/trends", get(leaderboard::trends))
        .route("/matches", get(matches::list_matches))
        .route("/matches/:id", get(matches::get_match))
        .route("/hall", get(hall::list_hall))
        .route("/badges", get(badges::list_badges))
        .route("/leaderboard", get(leaderboard::leaderboard))
        .route("/stats/best", get(leaderboard::best_of))
        .route("/losers", get(leaderboard::losers))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Periodically grows the badge and milestone catalogs and backfills
/// missing badge descriptions. Runs until the process exits.
#[instrument(skip(state))]
pub async fn start_maintenance_task(state: AppState, every: std::time::Duration) {
    info!(
        interval_secs = every.as_secs(),
        "Starting catalog maintenance task"
    );

    let mut ticker = interval(every);

    loop {
        ticker.tick().await;

        match state.badge_service.ensure_catalog(false).await {
            Ok(created) if !created.is_empty() => {
                info!(created = created.len(), "Badge catalog extended")
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Badge catalog maintenance failed"),
        }

        if let Err(e) = state.badge_service.backfill_descriptions().await {
            error!(error = %e, "Badge description backfill failed");
        }

        if let Err(e) = state.milestone_service.ensure_catalog(Utc::now()).await {
            error!(error = %e, "Milestone maintenance failed");
        }
    }
}
