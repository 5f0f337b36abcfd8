/// Shared error type used across all ReplyPilot crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: HTTP {status}")]
    ProviderHttp { provider: String, status: u16 },

    #[error("provider {provider}: {message}")]
    ProviderParse { provider: String, message: String },

    #[error("provider {provider}: credential not configured")]
    MissingCredential { provider: String },

    #[error("no AI provider is configured")]
    NoProviderConfigured,

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
