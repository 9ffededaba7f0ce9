use std::any::Any;
use std::thread;
use std::time::Duration;

use crate::downcast_key;
use crate::error::HandlerError;
use crate::handler::SchemeHandler;
use crate::keys::{KeyMaterial, PrivateKey, PrivateKeyList, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockKey(pub Vec<u8>);

impl KeyMaterial for MockKey {
    fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
        Ok(self.0.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Deterministic handler for dispatch tests.
///
/// `sign` fails on an empty digest and otherwise returns `digest || key`; `verify` fails for an
/// empty public key; `aggregate` fails when `t > n` and otherwise echoes the digest.
#[derive(Debug, Clone)]
pub struct MockHandler {
    scheme: String,
    sign_delay: Option<Duration>,
    panic_on_sign: bool,
}

impl MockHandler {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            sign_delay: None,
            panic_on_sign: false,
        }
    }

    pub fn with_sign_delay(mut self, delay: Duration) -> Self {
        self.sign_delay = Some(delay);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_sign = true;
        self
    }
}

impl SchemeHandler for MockHandler {
    fn scheme_name(&self) -> &str {
        &self.scheme
    }

    fn generate(&self, n: usize, t: usize) -> Result<(PublicKey, PrivateKeyList), HandlerError> {
        if t == 0 || t > n {
            return Err(HandlerError::InvalidParameters(format!("t={t}, n={n}")));
        }
        let keys: Vec<PrivateKey> = (0..n).map(|_| Box::new(MockKey(b"1".to_vec())) as PrivateKey).collect();
        Ok((Box::new(MockKey(b"ok".to_vec())), keys.into()))
    }

    fn sign(&self, digest: &[u8], key: &dyn KeyMaterial) -> Result<Vec<u8>, HandlerError> {
        if self.panic_on_sign {
            panic!("mock handler asked to panic");
        }
        if let Some(delay) = self.sign_delay {
            thread::sleep(delay);
        }
        if digest.is_empty() {
            return Err(HandlerError::InvalidParameters("empty digest".to_string()));
        }
        let key = downcast_key::<MockKey>(key, &self.scheme)?;
        Ok([digest, key.0.as_slice()].concat())
    }

    fn verify(&self, _signature: &[u8], _msg: &[u8], key: &dyn KeyMaterial) -> Result<(), HandlerError> {
        if key.marshal_binary()?.is_empty() {
            return Err(HandlerError::InvalidSignature);
        }
        Ok(())
    }

    fn aggregate(
        &self,
        _shares: &[Vec<u8>],
        digest: &[u8],
        _key: &dyn KeyMaterial,
        t: usize,
        n: usize,
    ) -> Result<Vec<u8>, HandlerError> {
        if t > n {
            return Err(HandlerError::InvalidParameters(format!("t={t} exceeds n={n}")));
        }
        Ok(digest.to_vec())
    }

    fn unmarshal_public(&self, bytes: &[u8]) -> Result<PublicKey, HandlerError> {
        Ok(Box::new(MockKey(bytes.to_vec())))
    }

    fn unmarshal_private(&self, bytes: &[u8]) -> Result<PrivateKey, HandlerError> {
        Ok(Box::new(MockKey(bytes.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_sign_concatenates_digest_and_key() {
        let handler = MockHandler::new("Mock");
        let key = handler.unmarshal_private(b"k").unwrap();
        assert_eq!(handler.sign(b"msg", key.as_ref()).unwrap(), b"msgk".to_vec());
        assert!(handler.sign(b"", key.as_ref()).is_err());
    }

    #[test]
    fn mock_generate_returns_n_keys() {
        let handler = MockHandler::new("Mock");
        let (public, private) = handler.generate(5, 3).unwrap();
        assert_eq!(public.marshal_binary().unwrap(), b"ok".to_vec());
        assert_eq!(private.len(), 5);
        assert_eq!(private.marshal_binary().unwrap(), vec![b"1".to_vec(); 5]);
        assert!(handler.generate(2, 3).is_err());
    }

    #[test]
    fn foreign_key_is_a_mismatch() {
        #[derive(Debug)]
        struct OtherKey;
        impl KeyMaterial for OtherKey {
            fn marshal_binary(&self) -> Result<Vec<u8>, HandlerError> {
                Ok(vec![1])
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let handler = MockHandler::new("Mock");
        let err = handler.sign(b"msg", &OtherKey).unwrap_err();
        assert!(matches!(err, HandlerError::KeyMismatch(s) if s == "Mock"));
    }
}
