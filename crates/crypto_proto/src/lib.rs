//! Wire format shared by crypto clients and signer processes.
//!
//! Every frame on the transport is one protobuf-encoded [`Envelope`]; its `content` holds the
//! operation-specific message selected by [`MessageType`].

pub mod envelope;
pub mod error;
pub mod messages;

pub use envelope::{Envelope, MessageType, decode, encode};
pub use error::ProtoError;
pub use messages::*;
