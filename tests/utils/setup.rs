use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

use banterboard::{
    ai::{CannedNarrator, DisabledExtractor, NarrativeGenerator, StatsExtractor},
    build_state, create_router, AppConfig, AppState, Collaborators, InMemoryStore,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
}

pub struct TestSetupBuilder {
    extractor: Arc<dyn StatsExtractor>,
    narrator: Arc<dyn NarrativeGenerator>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            extractor: Arc::new(DisabledExtractor),
            narrator: Arc::new(CannedNarrator),
        }
    }

    #[allow(dead_code)]
    pub fn with_extractor(mut self, extractor: Arc<dyn StatsExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[allow(dead_code)]
    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = narrator;
        self
    }

    /// Must be awaited inside a tokio runtime; the event dispatcher is spawned here
    pub fn build(self) -> TestSetup {
        let mut config = AppConfig {
            jwt_secret: "test-secret".to_string(),
            ..AppConfig::default()
        };
        config.effects.handler_timeout = Duration::from_secs(2);
        config.effects.max_retries = 1;

        let store = Arc::new(InMemoryStore::new());
        let state = build_state(
            store.clone(),
            Collaborators {
                extractor: self.extractor,
                narrator: self.narrator,
            },
            &config,
        );

        TestSetup {
            app: create_router(state.clone()),
            state,
            store,
        }
    }
}

impl TestSetup {
    /// One request through the full router; the body is parsed as JSON when present
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    /// Registers a user and returns its id
    pub async fn register(&self, name: &str) -> String {
        let (status, body) = self
            .send(Method::POST, "/users", None, Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}: {}", name, body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Opens a session for the user and returns the bearer token
    pub async fn login(&self, user_id: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/session",
                None,
                Some(json!({ "userId": user_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {}: {}", user_id, body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Registers and logs in; returns `(id, token)`
    pub async fn player(&self, name: &str) -> (String, String) {
        let id = self.register(name).await;
        let token = self.login(&id).await;
        (id, token)
    }

    #[allow(dead_code)]
    pub async fn user(&self, user_id: &str) -> Value {
        let (status, body) = self.get(&format!("/users/{}", user_id)).await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

/// Polls `check` until it holds or two seconds pass.
///
/// Post-commit effects run on the dispatcher task, so tests wait for them.
#[allow(dead_code)]
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
