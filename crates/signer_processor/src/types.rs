use std::sync::Arc;

use crypto_proto::Envelope;
use crypto_transport::PeerId;
use tokio::sync::{Mutex, mpsc};

/// Request taken off the upstream connection, with the peer its reply must go back to.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub peer: PeerId,
    pub envelope: Envelope,
}

#[derive(Debug, Clone)]
pub struct WorkerReply {
    pub peer: PeerId,
    pub envelope: Envelope,
}

/// Single queue shared by every worker; whoever holds the lock takes the next item.
pub type WorkQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;
