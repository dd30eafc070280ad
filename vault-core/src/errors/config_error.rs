/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {message}")]
    ParseFailed { message: String },

    #[error("invalid config value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
