use crypto_proto::{Envelope, decode};
use crypto_transport::{FrameSink, FrameSource, PeerId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::types::{Outbound, SendFailure};

/// Decodes inbound frames and hands them to the multiplexer. Malformed frames are dropped.
#[instrument(level = "debug", skip_all)]
pub(crate) async fn receive_loop<R: FrameSource>(
    mut source: R,
    inbound: mpsc::Sender<(PeerId, Envelope)>,
    cancellation_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                debug!("Receive loop cancelled");
                break;
            }
            frame = source.recv() => match frame {
                None => {
                    warn!("Transport closed, receive loop stopped");
                    break;
                }
                Some(frame) => match decode(&frame.payload) {
                    Ok(envelope) => {
                        if inbound.send((frame.peer, envelope)).await.is_err() {
                            debug!("Multiplexer gone, receive loop stopped");
                            break;
                        }
                    }
                    Err(e) => warn!(peer = %frame.peer, "Dropping malformed frame: {e}"),
                },
            },
        }
    }
}

/// Writes queued frames to the transport; failures of tracked requests are reported back.
#[instrument(level = "debug", skip_all)]
pub(crate) async fn send_loop<S: FrameSink>(
    sink: S,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    failures: mpsc::UnboundedSender<SendFailure>,
    cancellation_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                debug!("Send loop cancelled");
                break;
            }
            item = outbound.recv() => match item {
                None => {
                    debug!("Outbound queue closed, send loop stopped");
                    break;
                }
                Some(item) => {
                    if let Err(e) = sink.send(item.peer, item.payload).await {
                        warn!(peer = %item.peer, correlation_id = ?item.correlation_id, "Failed to send frame: {e}");
                        if let Some(correlation_id) = item.correlation_id {
                            let _ = failures.send(SendFailure {
                                correlation_id,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            },
        }
    }
}
