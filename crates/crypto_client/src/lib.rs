//! Client side of the crypto RPC: one shared router connection, many concurrent callers.
//!
//! Callers talk to a [`CryptoClient`] handle. All shared state (pending replies and the
//! scheme to peer bindings made by signer registration) lives in a single [`Multiplexer`] loop.

pub mod client;
pub mod error;
pub mod init;
mod io;
pub mod multiplexer;
pub mod types;

pub use client::CryptoClient;
pub use error::ClientError;
pub use init::create_multiplexer;
pub use multiplexer::Multiplexer;
