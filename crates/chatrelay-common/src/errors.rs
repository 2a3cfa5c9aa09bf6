use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("missing secret: {0} is not set")]
    MissingSecret(String),

    #[error("config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no config location: {0}")]
    NoLocation(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Whether this error came from sending or deleting an outbound message.
    pub fn is_delivery(&self) -> bool {
        matches!(self, PlatformError::Delivery(_) | PlatformError::Http(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatRelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    Other(String),
}
