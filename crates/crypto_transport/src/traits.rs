use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;
use crate::types::{Frame, PeerId};

#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send(&self, peer: PeerId, payload: Bytes) -> Result<(), TransportError>;
}

#[async_trait]
pub trait FrameSource: Send {
    /// Next inbound frame, `None` once the transport is gone.
    async fn recv(&mut self) -> Option<Frame>;
}
