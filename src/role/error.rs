use thiserror::Error;

/// Why a role lookup failed.
///
/// `Clone` so every caller joined on one fetch receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    #[error("role endpoint unreachable: {0}")]
    Transport(String),

    #[error("role endpoint answered {0}")]
    Status(u16),

    #[error("role payload could not be decoded: {0}")]
    Decode(String),

    #[error("invalid role endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("role fetch was aborted")]
    Aborted,
}

/// Failures of the persisted key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store entry is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}
