use crypto_handler::{
    HandlerError, KeyMaterial, PrivateKey, PrivateKeyList, PublicKey, SchemeHandler, downcast_key,
};
use rand_core::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use sha2::Sha256;
use tracing::debug;

use crate::keys::{RsaPrivateKey, RsaPublicKey};

/// Single-key RSA of a fixed modulus size, registered as `RSA<bits>`. Aggregation is not offered.
#[derive(Debug, Clone)]
pub struct Rsa {
    scheme: String,
    bits: usize,
}

impl Rsa {
    pub fn new(bits: usize) -> Self {
        Self {
            scheme: format!("RSA{bits}"),
            bits,
        }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl SchemeHandler for Rsa {
    fn scheme_name(&self) -> &str {
        &self.scheme
    }

    /// `n` and `t` are ignored: a single key pair is produced.
    fn generate(&self, _n: usize, _t: usize) -> Result<(PublicKey, PrivateKeyList), HandlerError> {
        let key = rsa::RsaPrivateKey::new(&mut OsRng, self.bits)
            .map_err(|e| HandlerError::InvalidParameters(e.to_string()))?;
        debug!(scheme = self.scheme, "Key pair generated");
        let private = RsaPrivateKey(key);
        Ok((
            Box::new(private.public_key()),
            vec![Box::new(private) as PrivateKey].into(),
        ))
    }

    /// Signs the SHA-256 hash of `digest`.
    fn sign(&self, digest: &[u8], key: &dyn KeyMaterial) -> Result<Vec<u8>, HandlerError> {
        let key = downcast_key::<RsaPrivateKey>(key, &self.scheme)?;
        let signature = SigningKey::<Sha256>::new(key.0.clone())
            .try_sign_with_rng(&mut OsRng, digest)
            .map_err(|e| HandlerError::InvalidKey(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn verify(&self, signature: &[u8], msg: &[u8], key: &dyn KeyMaterial) -> Result<(), HandlerError> {
        let key = downcast_key::<RsaPublicKey>(key, &self.scheme)?;
        let signature = Signature::try_from(signature).map_err(|_| HandlerError::InvalidSignature)?;
        VerifyingKey::<Sha256>::new(key.0.clone())
            .verify(msg, &signature)
            .map_err(|_| HandlerError::InvalidSignature)
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
            scheme: self.scheme.clone(),
            operation: "aggregate",
        })
    }

    fn unmarshal_public(&self, bytes: &[u8]) -> Result<PublicKey, HandlerError> {
        Ok(Box::new(RsaPublicKey::from_bytes(bytes)?))
    }

    fn unmarshal_private(&self, bytes: &[u8]) -> Result<PrivateKey, HandlerError> {
        Ok(Box::new(RsaPrivateKey::from_bytes(bytes)?))
    }
}
