use quorum_recovery::RecoveryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No handler registered for scheme '{0}'")]
    UnknownScheme(String),
    #[error("Handler for scheme '{0}' is already registered")]
    DuplicateScheme(String),
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
    #[error("Key was not produced by scheme '{0}'")]
    KeyMismatch(String),
    #[error("Signature verification failed")]
    InvalidSignature,
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Share recovery failed: {0}")]
    Recovery(#[from] RecoveryError),
    #[error("Scheme '{scheme}' does not support {operation}")]
    Unsupported { scheme: String, operation: &'static str },
    #[error("Serialization error: {0}")]
    Serialization(String),
}
