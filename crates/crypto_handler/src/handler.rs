use crate::error::HandlerError;
use crate::keys::{KeyMaterial, PrivateKey, PrivateKeyList, PublicKey};

/// One pluggable signature scheme, addressed by [`SchemeHandler::scheme_name`].
///
/// Operations are synchronous and CPU bound; callers run them off the async executor.
pub trait SchemeHandler: Send + Sync {
    fn scheme_name(&self) -> &str;

    /// Fresh key set: one public key and `n` private shares, any `t` of which can sign.
    fn generate(&self, n: usize, t: usize) -> Result<(PublicKey, PrivateKeyList), HandlerError>;

    fn sign(&self, digest: &[u8], key: &dyn KeyMaterial) -> Result<Vec<u8>, HandlerError>;

    fn verify(&self, signature: &[u8], msg: &[u8], key: &dyn KeyMaterial) -> Result<(), HandlerError>;

    fn aggregate(
        &self,
        shares: &[Vec<u8>],
        digest: &[u8],
        key: &dyn KeyMaterial,
        t: usize,
        n: usize,
    ) -> Result<Vec<u8>, HandlerError>;

    fn unmarshal_public(&self, bytes: &[u8]) -> Result<PublicKey, HandlerError>;

    fn unmarshal_private(&self, bytes: &[u8]) -> Result<PrivateKey, HandlerError>;
}
