pub mod errors;

pub use errors::{ChatRelayError, ConfigError, PlatformError};

pub type Result<T> = std::result::Result<T, ChatRelayError>;
