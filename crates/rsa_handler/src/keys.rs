use std::any::Any;

use crypto_handler::{HandlerError, KeyMaterial};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey(pub rsa::RsaPublicKey);

impl RsaPublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        rsa::RsaPublicKey::from_pkcs1_der(bytes)
            .map(Self)
            .map_err(|e| HandlerError::InvalidKey(e.to_string()))
    }
}

impl KeyMaterial for RsaPublicKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        let der = self
            .0
            .to_pkcs1_der()
            .map_err(|e| HandlerError::Serialization(e.to_string()))?;
        Ok(der.as_bytes().to_vec())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey(pub rsa::RsaPrivateKey);

impl RsaPrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        rsa::RsaPrivateKey::from_pkcs1_der(bytes)
            .map(Self)
            .map_err(|e| HandlerError::InvalidKey(e.to_string()))
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey(self.0.to_public_key())
    }
}

impl KeyMaterial for RsaPrivateKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        let der = self
            .0
            .to_pkcs1_der()
            .map_err(|e| HandlerError::Serialization(e.to_string()))?;
        Ok(der.as_bytes().to_vec())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_an_invalid_key() {
        assert!(matches!(
            RsaPublicKey::from_bytes(&[0x30, 0x01, 0x00]),
            Err(HandlerError::InvalidKey(_))
        ));
        assert!(matches!(RsaPrivateKey::from_bytes(&[]), Err(HandlerError::InvalidKey(_))));
    }
}
