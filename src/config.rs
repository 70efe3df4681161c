use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub port: u16,
    /// Process-wide symmetric secret for message encryption at rest.
    /// Absence is a fatal configuration error, not a per-request one.
    pub message_secret: String,
    pub listing_service_url: String,
    pub user_service_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        // Redis is optional: without it the service runs single-instance and
        // fans events out in-process only.
        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let message_secret = env::var("MESSAGE_ENCRYPTION_SECRET")
            .map_err(|_| crate::error::AppError::Config("MESSAGE_ENCRYPTION_SECRET missing".into()))?;
        if message_secret.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "MESSAGE_ENCRYPTION_SECRET must not be empty".into(),
            ));
        }

        let listing_service_url = env::var("LISTING_SERVICE_URL")
            .unwrap_or_else(|_| "http://listing-service:3000".into());
        let user_service_url =
            env::var("USER_SERVICE_URL").unwrap_or_else(|_| "http://user-service:3000".into());

        Ok(Self {
            database_url,
            redis_url,
            port,
            message_secret,
            listing_service_url,
            user_service_url,
        })
    }
}
