pub mod error;
pub mod handler;
pub mod keys;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod registry;

pub use error::HandlerError;
pub use handler::SchemeHandler;
pub use keys::{KeyMaterial, PrivateKey, PrivateKeyList, PublicKey, downcast_key};
pub use registry::HandlerRegistry;
