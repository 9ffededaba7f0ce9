use crypto_handler::{
    HandlerError, KeyMaterial, PrivateKey, PrivateKeyList, PublicKey, SchemeHandler, downcast_key,
};
use quorum_recovery::{RecoveryPolicy, recover};
use threshold_crypto::{SIG_SIZE, SecretKeySet, Signature};
use tracing::{debug, instrument};

use crate::keys::{TblsPrivateKey, TblsPublicKey};
use crate::share::{EncodedSignatureShare, TblsCombiner};
use crate::{TBLS256, TBLS256_OPTIMISTIC, TBLS256_PESSIMISTIC};

pub(crate) fn signature_from_bytes(bytes: &[u8]) -> Result<Signature, HandlerError> {
    let bytes: &[u8; SIG_SIZE] = bytes
        .try_into()
        .map_err(|_| HandlerError::InvalidParameters(format!("signature must be {SIG_SIZE} bytes")))?;
    Signature::from_bytes(bytes).map_err(|_| HandlerError::InvalidSignature)
}

/// Threshold BLS; the three variants differ only in how shares are recovered.
#[derive(Debug, Clone)]
pub struct Tbls {
    scheme: &'static str,
    policy: RecoveryPolicy,
}

impl Tbls {
    pub fn normal() -> Self {
        Self {
            scheme: TBLS256,
            policy: RecoveryPolicy::Normal,
        }
    }

    pub fn optimistic() -> Self {
        Self {
            scheme: TBLS256_OPTIMISTIC,
            policy: RecoveryPolicy::Optimistic,
        }
    }

    pub fn pessimistic() -> Self {
        Self {
            scheme: TBLS256_PESSIMISTIC,
            policy: RecoveryPolicy::Pessimistic,
        }
    }

    pub fn policy(&self) -> RecoveryPolicy {
        self.policy
    }
}

impl SchemeHandler for Tbls {
    fn scheme_name(&self) -> &str {
        self.scheme
    }

    #[instrument(level = "debug", skip(self), fields(scheme = self.scheme))]
    fn generate(&self, n: usize, t: usize) -> Result<(PublicKey, PrivateKeyList), HandlerError> {
        if t == 0 || t > n {
            return Err(HandlerError::InvalidParameters(format!(
                "threshold {t} must be within 1..={n}"
            )));
        }
        let secret_set = SecretKeySet::random(t - 1, &mut rand::thread_rng());
        let private: Vec<PrivateKey> = (0..n as u64)
            .map(|index| {
                Box::new(TblsPrivateKey {
                    index,
                    share: secret_set.secret_key_share(index),
                }) as PrivateKey
            })
            .collect();
        debug!("Generated threshold key set");
        Ok((Box::new(TblsPublicKey(secret_set.public_keys())), private.into()))
    }

    fn sign(&self, digest: &[u8], key: &dyn KeyMaterial) -> Result<Vec<u8>, HandlerError> {
        let key = downcast_key::<TblsPrivateKey>(key, self.scheme)?;
        EncodedSignatureShare {
            index: key.index,
            share: key.share.sign(digest),
        }
        .to_bytes()
    }

    fn verify(&self, signature: &[u8], msg: &[u8], key: &dyn KeyMaterial) -> Result<(), HandlerError> {
        let key = downcast_key::<TblsPublicKey>(key, self.scheme)?;
        let signature = signature_from_bytes(signature)?;
        if key.0.public_key().verify(&signature, msg) {
            Ok(())
        } else {
            Err(HandlerError::InvalidSignature)
        }
    }

    #[instrument(level = "debug", skip(self, shares, digest, key), fields(scheme = self.scheme, shares = shares.len()))]
    fn aggregate(
        &self,
        shares: &[Vec<u8>],
        digest: &[u8],
        key: &dyn KeyMaterial,
        t: usize,
        n: usize,
    ) -> Result<Vec<u8>, HandlerError> {
        let key = downcast_key::<TblsPublicKey>(key, self.scheme)?;
        if key.required_shares() != t {
            return Err(HandlerError::InvalidParameters(format!(
                "key set requires {} shares, request says {t}",
                key.required_shares()
            )));
        }
        let decoded = TblsCombiner::decode_shares(shares);
        let combiner = TblsCombiner::new(&key.0, digest, n);
        let signature = recover(self.policy, &combiner, &decoded, t, n)?;
        Ok(signature.to_bytes().to_vec())
    }

    fn unmarshal_public(&self, bytes: &[u8]) -> Result<PublicKey, HandlerError> {
        Ok(Box::new(TblsPublicKey::from_bytes(bytes)?))
    }

    fn unmarshal_private(&self, bytes: &[u8]) -> Result<PrivateKey, HandlerError> {
        Ok(Box::new(TblsPrivateKey::from_bytes(bytes)?))
    }
}
