use bytes::Bytes;
use crypto_proto::decode;
use crypto_transport::{FrameSink, FrameSource};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::SignerProcessorError;
use crate::types::{WorkItem, WorkerReply};

/// Bridges the upstream connection and the worker pool once registration is done.
///
/// Requests go onto the bounded work queue, so a full queue stops reading from upstream until a
/// worker frees a slot. Replies are written back to the peer each request came from.
pub struct Dispatcher<S, R> {
    sink: S,
    source: R,
    work: mpsc::Sender<WorkItem>,
    replies: mpsc::UnboundedReceiver<WorkerReply>,
    cancellation_token: CancellationToken,
}

impl<S, R> Dispatcher<S, R>
where
    S: FrameSink,
    R: FrameSource,
{
    pub fn new(
        sink: S,
        source: R,
        work: mpsc::Sender<WorkItem>,
        replies: mpsc::UnboundedReceiver<WorkerReply>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            sink,
            source,
            work,
            replies,
            cancellation_token,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn run(mut self) -> Result<(), SignerProcessorError> {
        info!("Dispatcher started");
        let result = loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("Shutting down dispatcher");
                    break Ok(());
                }
                frame = self.source.recv() => {
                    let Some(frame) = frame else {
                        break self.closed(SignerProcessorError::UpstreamClosed);
                    };
                    match decode(&frame.payload) {
                        Ok(envelope) => {
                            debug!(correlation_id = envelope.correlation_id, peer = %frame.peer, "Request queued");
                            if self.work.send(WorkItem { peer: frame.peer, envelope }).await.is_err() {
                                break self.closed(SignerProcessorError::WorkersStopped);
                            }
                        }
                        Err(e) => warn!(peer = %frame.peer, "Dropping malformed frame: {e}"),
                    }
                }
                reply = self.replies.recv() => {
                    let Some(reply) = reply else {
                        break self.closed(SignerProcessorError::WorkersStopped);
                    };
                    forward(&self.sink, reply).await;
                }
            }
        };
        self.cancellation_token.cancel();
        result
    }

    /// A channel closing after cancellation is part of a normal shutdown.
    fn closed(&self, error: SignerProcessorError) -> Result<(), SignerProcessorError> {
        if self.cancellation_token.is_cancelled() {
            info!("Shutting down dispatcher");
            return Ok(());
        }
        warn!("Dispatcher stopped: {error}");
        Err(error)
    }
}

async fn forward<S: FrameSink>(sink: &S, reply: WorkerReply) {
    let correlation_id = reply.envelope.correlation_id.clone();
    match sink.send(reply.peer, Bytes::from(reply.envelope.to_bytes())).await {
        Ok(()) => debug!(correlation_id, peer = %reply.peer, "Reply sent"),
        Err(e) => warn!(correlation_id, peer = %reply.peer, "Failed to send reply: {e}"),
    }
}
