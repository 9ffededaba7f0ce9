//! Threshold share recovery: find a subset of signature shares that combines into a valid
//! aggregate, under one of three fault-tolerance policies.

pub mod combinations;
pub mod error;
pub mod policy;
pub mod traits;

pub use combinations::{Combinations, binomial};
pub use error::RecoveryError;
pub use policy::{RecoveryPolicy, recover, recover_normal, recover_optimistic, recover_pessimistic};
pub use traits::ShareCombiner;
