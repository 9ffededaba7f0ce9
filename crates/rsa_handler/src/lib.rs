//! Plain RSA signatures: PKCS#1 v1.5 over SHA-256 with PKCS#1 DER encoded keys.

pub mod handler;
pub mod keys;

pub use handler::Rsa;
pub use keys::{RsaPrivateKey, RsaPublicKey};

use std::sync::Arc;

use crypto_handler::SchemeHandler;

pub const RSA1024: &str = "RSA1024";
pub const RSA2048: &str = "RSA2048";
pub const RSA3072: &str = "RSA3072";

/// Modulus sizes offered as schemes, in registration order.
pub const KEY_SIZES: [usize; 3] = [1024, 2048, 3072];

pub fn all_handlers() -> Vec<Arc<dyn SchemeHandler>> {
    KEY_SIZES
        .into_iter()
        .map(|bits| Arc::new(Rsa::new(bits)) as Arc<dyn SchemeHandler>)
        .collect()
}

pub fn handler_for(scheme: &str) -> Option<Arc<dyn SchemeHandler>> {
    all_handlers().into_iter().find(|h| h.scheme_name() == scheme)
}
