//! Hex-encoded key files on disk, one directory per participant.

pub mod error;
pub mod keychain;

pub use error::KeychainError;
pub use keychain::{Keychain, key_name};
