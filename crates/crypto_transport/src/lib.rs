//! Peer-addressed frame transport.
//!
//! A [`RouterSocket`] binds and accepts any number of peers, tagging each inbound frame with the
//! [`PeerId`] of the connection it came from so replies can be routed back. A [`DealerSocket`]
//! holds a single upstream connection. Both speak length-delimited frames over any byte stream.

mod connection;
pub mod dealer;
pub mod error;
pub mod router;
pub mod traits;
pub mod types;

pub use dealer::{DealerSink, DealerSocket, DealerSource};
pub use error::TransportError;
pub use router::{MemoryConnector, RouterSink, RouterSocket, RouterSource};
pub use traits::{FrameSink, FrameSource};
pub use types::{Frame, PeerId};
