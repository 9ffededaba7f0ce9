use std::path::PathBuf;

use crypto_handler::HandlerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeychainError {
    #[error("Key '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },
    #[error("Invalid key name '{0}'")]
    InvalidKeyName(String),
    #[error("Failed to decode key file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: hex::FromHexError,
    },
    #[error("Failed to serialize key: {0}")]
    Marshal(#[from] HandlerError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
