use crypto_handler::{
    HandlerError, KeyMaterial, PrivateKey, PrivateKeyList, PublicKey, SchemeHandler, downcast_key,
};
use threshold_crypto::SecretKey;

use crate::BLS256;
use crate::keys::{BlsPrivateKey, BlsPublicKey};
use crate::tbls::signature_from_bytes;

/// Plain single-key BLS. Aggregation is not offered.
#[derive(Debug, Clone, Default)]
pub struct Bls;

impl Bls {
    pub fn new() -> Self {
        Self
    }
}

impl SchemeHandler for Bls {
    fn scheme_name(&self) -> &str {
        BLS256
    }

    /// `n` and `t` are ignored: a single key pair is produced.
    fn generate(&self, _n: usize, _t: usize) -> Result<(PublicKey, PrivateKeyList), HandlerError> {
        let secret = SecretKey::random();
        let public = BlsPublicKey(secret.public_key());
        Ok((Box::new(public), vec![Box::new(BlsPrivateKey(secret)) as PrivateKey].into()))
    }

    fn sign(&self, digest: &[u8], key: &dyn KeyMaterial) -> Result<Vec<u8>, HandlerError> {
        let key = downcast_key::<BlsPrivateKey>(key, BLS256)?;
        Ok(key.0.sign(digest).to_bytes().to_vec())
    }

    fn verify(&self, signature: &[u8], msg: &[u8], key: &dyn KeyMaterial) -> Result<(), HandlerError> {
        let key = downcast_key::<BlsPublicKey>(key, BLS256)?;
        let signature = signature_from_bytes(signature)?;
        if key.0.verify(&signature, msg) {
            Ok(())
        } else {
            Err(HandlerError::InvalidSignature)
        }
    }

    fn aggregate(
        &self,
        _shares: &[Vec<u8>],
        _digest: &[u8],
        _key: &dyn KeyMaterial,
        _t: usize,
        _n: usize,
    ) -> Result<Vec<u8>, HandlerError> {
        Err(HandlerError::Unsupported {
            scheme: BLS256.to_string(),
            operation: "aggregate",
        })
    }

    fn unmarshal_public(&self, bytes: &[u8]) -> Result<PublicKey, HandlerError> {
        Ok(Box::new(BlsPublicKey::from_bytes(bytes)?))
    }

    fn unmarshal_private(&self, bytes: &[u8]) -> Result<PrivateKey, HandlerError> {
        Ok(Box::new(BlsPrivateKey::from_bytes(bytes)?))
    }
}
