use std::fmt;

use bytes::Bytes;

/// Transport-assigned identity of the remote end of one logical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl PeerId {
    /// Label used by a dealer for frames arriving from its single upstream.
    pub const UPSTREAM: PeerId = PeerId(0);
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub peer: PeerId,
    pub payload: Bytes,
}
