pub mod capacity_error;
pub mod config_error;
pub mod index_error;
pub mod storage_error;
pub mod validation_error;

pub use capacity_error::CapacityError;
pub use config_error::ConfigError;
pub use index_error::IndexError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;

/// Crate-wide result alias.
pub type VaultResult<T> = Result<T, VaultError>;

/// Top-level error for the vault engine.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("capacity error: {0}")]
    Capacity(#[from] CapacityError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("concurrency error: {resource} lock poisoned")]
    Concurrency { resource: String },
}

impl VaultError {
    /// Store-wide invariant violations abort the whole maintenance pass.
    pub fn is_fatal_to_pass(&self) -> bool {
        matches!(self, VaultError::Index(_) | VaultError::Concurrency { .. })
    }

    /// Convenience constructor for lock poisoning.
    pub fn poisoned(resource: impl Into<String>) -> Self {
        VaultError::Concurrency {
            resource: resource.into(),
        }
    }
}

impl From<toml::de::Error> for VaultError {
    fn from(err: toml::de::Error) -> Self {
        VaultError::Config(ConfigError::ParseFailed {
            message: err.to_string(),
        })
    }
}
