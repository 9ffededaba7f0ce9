//! Signer side of the crypto RPC.
//!
//! A [`SignerProcessor`] connects to the client's router, registers every handler it carries, and
//! then runs a dispatcher that feeds a fixed pool of workers through one bounded queue.

pub mod dispatcher;
pub mod error;
pub mod processor;
mod registration;
pub mod types;
pub mod worker;

pub use error::{OperationError, SignerProcessorError};
pub use processor::{SignerHandle, SignerProcessor};
pub use worker::execute;
