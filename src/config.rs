use std::time::Duration;

/// Runtime configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_expiration_days: i64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub ai_timeout: Duration,
    pub effects: EffectsConfig,
    pub catalog: CatalogConfig,
}

/// Retry/timeout policy for post-commit subscribers
#[derive(Debug, Clone)]
pub struct EffectsConfig {
    pub handler_timeout: Duration,
    pub max_retries: u32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

/// Controls lazy materialisation of the badge and milestone catalogs
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// New badges created per maintenance run
    pub badge_batch_size: usize,
    /// Minimum age of the newest milestone before another is created
    pub milestone_interval: chrono::Duration,
    /// How often the background maintenance task runs
    pub maintenance_interval: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            badge_batch_size: 2,
            milestone_interval: chrono::Duration::days(3),
            maintenance_interval: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            jwt_secret: "your-secret-key-change-in-production".to_string(),
            session_expiration_days: 365,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            ai_timeout: Duration::from_secs(30),
            effects: EffectsConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            database_url: env_opt("DATABASE_URL"),
            jwt_secret: env_or("JWT_SECRET", defaults.jwt_secret),
            session_expiration_days: env_parse(
                "SESSION_EXPIRATION_DAYS",
                defaults.session_expiration_days,
            ),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", defaults.gemini_model),
            ai_timeout: Duration::from_secs(env_parse(
                "AI_TIMEOUT_SECS",
                defaults.ai_timeout.as_secs(),
            )),
            effects: EffectsConfig {
                handler_timeout: Duration::from_secs(env_parse(
                    "EFFECT_HANDLER_TIMEOUT_SECS",
                    defaults.effects.handler_timeout.as_secs(),
                )),
                max_retries: env_parse("EFFECT_MAX_RETRIES", defaults.effects.max_retries),
            },
            catalog: CatalogConfig {
                badge_batch_size: env_parse(
                    "BADGE_BATCH_SIZE",
                    defaults.catalog.badge_batch_size,
                ),
                milestone_interval: chrono::Duration::days(env_parse(
                    "MILESTONE_INTERVAL_DAYS",
                    defaults.catalog.milestone_interval.num_days(),
                )),
                maintenance_interval: defaults.catalog.maintenance_interval,
            },
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_or(key: &str, default: String) -> String {
    env_opt(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
