use thiserror::Error;

use crate::types::PeerId;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No connection for {0}")]
    UnknownPeer(PeerId),
    #[error("Connection to {0} is closed")]
    PeerDisconnected(PeerId),
}
