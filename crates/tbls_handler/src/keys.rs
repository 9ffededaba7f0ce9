use std::any::Any;

use crypto_handler::{HandlerError, KeyMaterial};
use serde::{Deserialize, Serialize};
use threshold_crypto::serde_impl::SerdeSecret;
use threshold_crypto::{PublicKey as BlsPoint, PublicKeySet, SecretKey, SecretKeyShare};

fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, HandlerError> {
    bincode::serialize(value).map_err(|e| HandlerError::Serialization(e.to_string()))
}

fn deserialize<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, HandlerError> {
    bincode::deserialize(bytes).map_err(|e| HandlerError::InvalidKey(e.to_string()))
}

/// Public polynomial commitment of a threshold key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TblsPublicKey(pub PublicKeySet);

impl TblsPublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        Ok(Self(deserialize(bytes)?))
    }

    /// Number of shares required to produce a signature.
    pub fn required_shares(&self) -> usize {
        self.0.threshold() + 1
    }
}

impl KeyMaterial for TblsPublicKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        serialize(&self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedPrivateKey {
    index: u64,
    share: SerdeSecret<SecretKeyShare>,
}

/// One participant's secret share, tagged with its index in the key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TblsPrivateKey {
    pub index: u64,
    pub share: SecretKeyShare,
}

impl TblsPrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        let encoded: EncodedPrivateKey = deserialize(bytes)?;
        Ok(Self {
            index: encoded.index,
            share: encoded.share.into_inner(),
        })
    }
}

impl KeyMaterial for TblsPrivateKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        serialize(&EncodedPrivateKey {
            index: self.index,
            share: SerdeSecret(self.share.clone()),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlsPublicKey(pub BlsPoint);

impl BlsPublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        Ok(Self(deserialize(bytes)?))
    }
}

impl KeyMaterial for BlsPublicKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        serialize(&self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlsPrivateKey(pub SecretKey);

impl BlsPrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        let secret: SerdeSecret<SecretKey> = deserialize(bytes)?;
        Ok(Self(secret.into_inner()))
    }
}

impl KeyMaterial for BlsPrivateKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        serialize(&SerdeSecret(self.0.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
