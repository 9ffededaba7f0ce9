use std::any::Any;
use std::fmt::Debug;

use crate::error::HandlerError;

/// Scheme-specific key, opaque outside the handler that produced it.
pub trait KeyMaterial: Debug + Send + Sync + 'static {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError>;

    fn as_any(&self) -> &dyn Any;
}

pub type PublicKey = Box<dyn KeyMaterial>;
pub type PrivateKey = Box<dyn KeyMaterial>;

/// Private key shares in participant order.
#[derive(Debug, Default)]
pub struct PrivateKeyList(pub Vec<PrivateKey>);

impl PrivateKeyList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrivateKey> {
        self.0.iter()
    }

    pub fn marshal_binary(&self) -> Result<Vec<Vec<u8>>, HandlerError> {
        self.0.iter().map(|key| key.marshal_binary()).collect()
    }
}

impl From<Vec<PrivateKey>> for PrivateKeyList {
    fn from(keys: Vec<PrivateKey>) -> Self {
        Self(keys)
    }
}

/// Recovers the concrete key type behind a [`KeyMaterial`] handed to `scheme`.
pub fn downcast_key<'a, T: 'static>(key: &'a dyn KeyMaterial, scheme: &str) -> Result<&'a T, HandlerError> {
    key.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| HandlerError::KeyMismatch(scheme.to_string()))
}
