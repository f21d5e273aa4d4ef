use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Duplicate unit id in snapshot: {0}")]
    DuplicateUnitId(crate::core::types::UnitId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
