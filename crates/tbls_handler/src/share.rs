use crypto_handler::HandlerError;
use quorum_recovery::ShareCombiner;
use serde::{Deserialize, Serialize};
use threshold_crypto::{PublicKeySet, Signature, SignatureShare};

/// Signature share as it travels between signers and the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSignatureShare {
    pub index: u64,
    pub share: SignatureShare,
}

impl EncodedSignatureShare {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HandlerError> {
        bincode::serialize(self).map_err(|e| HandlerError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HandlerError> {
        bincode::deserialize(bytes).map_err(|e| HandlerError::Serialization(e.to_string()))
    }
}

/// Combines signature shares under one public key set and message.
///
/// Shares that failed to decode are kept as `None` so that recovery policies can skip them the
/// same way they skip forged shares.
pub struct TblsCombiner<'a> {
    public_keys: &'a PublicKeySet,
    message: &'a [u8],
    n: usize,
}

impl<'a> TblsCombiner<'a> {
    pub fn new(public_keys: &'a PublicKeySet, message: &'a [u8], n: usize) -> Self {
        Self {
            public_keys,
            message,
            n,
        }
    }

    pub fn decode_shares(shares: &[Vec<u8>]) -> Vec<Option<EncodedSignatureShare>> {
        shares
            .iter()
            .map(|bytes| EncodedSignatureShare::from_bytes(bytes).ok())
            .collect()
    }

    fn in_range(&self, share: &EncodedSignatureShare) -> bool {
        (share.index as usize) < self.n
    }
}

impl ShareCombiner for TblsCombiner<'_> {
    type Share = Option<EncodedSignatureShare>;
    type Signature = Signature;
    type Error = HandlerError;

    fn verify_share(&self, share: &Self::Share) -> bool {
        match share {
            Some(share) if self.in_range(share) => self
                .public_keys
                .public_key_share(share.index)
                .verify(&share.share, self.message),
            _ => false,
        }
    }

    fn combine(&self, shares: &[&Self::Share]) -> Result<Signature, HandlerError> {
        let mut decoded = Vec::with_capacity(shares.len());
        for share in shares {
            match share {
                Some(share) if self.in_range(share) => decoded.push((share.index, &share.share)),
                Some(share) => {
                    return Err(HandlerError::InvalidParameters(format!(
                        "share index {} outside of 0..{}",
                        share.index, self.n
                    )));
                }
                None => return Err(HandlerError::Serialization("undecodable signature share".to_string())),
            }
        }
        self.public_keys
            .combine_signatures(decoded)
            .map_err(|e| HandlerError::InvalidParameters(e.to_string()))
    }

    fn verify(&self, signature: &Signature) -> bool {
        self.public_keys.public_key().verify(signature, self.message)
    }
}
