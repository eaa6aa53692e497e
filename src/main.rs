use banterboard::ai::{CannedNarrator, DisabledExtractor, GeminiClient};
use banterboard::app::{build_state, create_router, start_maintenance_task, Collaborators};
use banterboard::config::AppConfig;
use banterboard::store::{InMemoryStore, PostgresStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banterboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting banterboard");

    let config = AppConfig::from_env();

    // One Gemini client serves both extraction and narrative; without a key
    // extraction is refused and banter comes from the canned lines
    let collaborators = match &config.gemini_api_key {
        Some(api_key) => {
            let gemini = Arc::new(GeminiClient::new(
                api_key.clone(),
                config.gemini_model.clone(),
                config.ai_timeout,
            ));
            Collaborators {
                extractor: gemini.clone(),
                narrator: gemini,
            }
        }
        None => {
            warn!("GEMINI_API_KEY not set, extraction disabled and using canned banter");
            Collaborators {
                extractor: Arc::new(DisabledExtractor),
                narrator: Arc::new(CannedNarrator),
            }
        }
    };

    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let store = Arc::new(PostgresStore::new(pool));
            store.migrate().await?;
            info!("Using PostgreSQL store");
            build_state(store, collaborators, &config)
        }
        None => {
            warn!("DATABASE_URL not set, data will be lost on restart");
            build_state(Arc::new(InMemoryStore::new()), collaborators, &config)
        }
    };

    tokio::spawn(start_maintenance_task(
        app_state.clone(),
        config.catalog.maintenance_interval,
    ));

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
