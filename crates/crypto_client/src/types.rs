use bytes::Bytes;
use crypto_proto::Envelope;
use crypto_transport::PeerId;
use tokio::sync::oneshot;

use crate::error::ClientError;

pub type OneshotReplySender = oneshot::Sender<Result<Envelope, ClientError>>;
pub type OneshotReplyReceiver = oneshot::Receiver<Result<Envelope, ClientError>>;

/// Requests from [`crate::CryptoClient`] handles to the multiplexer loop.
#[derive(Debug)]
pub enum Command {
    Dispatch {
        scheme: String,
        envelope: Envelope,
        reply: OneshotReplySender,
    },
    Abandon {
        correlation_id: String,
    },
    Schemes {
        reply: oneshot::Sender<Vec<String>>,
    },
    WaitScheme {
        scheme: String,
        reply: oneshot::Sender<()>,
    },
}

/// Frame queued for the send loop. `correlation_id` is set when a caller waits on the outcome.
#[derive(Debug)]
pub struct Outbound {
    pub peer: PeerId,
    pub payload: Bytes,
    pub correlation_id: Option<String>,
}

/// Send failure reported back to the multiplexer so the waiting caller is released.
#[derive(Debug)]
pub struct SendFailure {
    pub correlation_id: String,
    pub reason: String,
}
