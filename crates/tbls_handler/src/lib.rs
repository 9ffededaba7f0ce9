//! BLS handlers over BLS12-381: threshold BLS with a selectable share-recovery policy, and plain
//! single-key BLS.

pub mod bls;
pub mod keys;
pub mod share;
pub mod tbls;

pub use bls::Bls;
pub use keys::{BlsPrivateKey, BlsPublicKey, TblsPrivateKey, TblsPublicKey};
pub use share::{EncodedSignatureShare, TblsCombiner};
pub use tbls::Tbls;

use std::sync::Arc;

use crypto_handler::SchemeHandler;

pub const TBLS256: &str = "TBLS256";
pub const TBLS256_OPTIMISTIC: &str = "TBLS256Optimistic";
pub const TBLS256_PESSIMISTIC: &str = "TBLS256/Pessimistic";
pub const BLS256: &str = "BLS256";

/// Every handler this crate provides, in registration order.
pub fn all_handlers() -> Vec<Arc<dyn SchemeHandler>> {
    vec![
        Arc::new(Tbls::normal()),
        Arc::new(Tbls::optimistic()),
        Arc::new(Tbls::pessimistic()),
        Arc::new(Bls::new()),
    ]
}

/// Looks up one of this crate's handlers by scheme name.
pub fn handler_for(scheme: &str) -> Option<Arc<dyn SchemeHandler>> {
    all_handlers().into_iter().find(|h| h.scheme_name() == scheme)
}
