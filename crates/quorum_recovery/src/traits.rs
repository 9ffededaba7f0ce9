use std::fmt::Display;

/// Scheme-specific primitives a recovery policy is built from.
///
/// A combiner is bound to one public key and one message, so `verify_share` and `verify`
/// need nothing beyond the value being checked.
pub trait ShareCombiner {
    type Share;
    type Signature;
    type Error: Display;

    fn verify_share(&self, share: &Self::Share) -> bool;

    fn combine(&self, shares: &[&Self::Share]) -> Result<Self::Signature, Self::Error>;

    fn verify(&self, signature: &Self::Signature) -> bool;
}
