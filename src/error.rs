#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Rate limited by remote service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Parse(err)
    }
}
