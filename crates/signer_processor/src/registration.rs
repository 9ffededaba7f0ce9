use bytes::Bytes;
use crypto_proto::{Envelope, MessageType, RegisterRequest, RegisterResponse, SchemeResponse, decode};
use crypto_transport::{FrameSink, FrameSource, PeerId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::SignerProcessorError;
use crate::types::{WorkItem, WorkerReply};

/// Registers each scheme in turn, waiting for its acknowledgement before the next one.
///
/// Traffic that is not the awaited acknowledgement is forwarded to the workers, and worker
/// replies are passed upstream, so schemes registered earlier are already served.
pub(crate) async fn register_schemes<S, R>(
    sink: &S,
    source: &mut R,
    schemes: &[String],
    work: &mpsc::Sender<WorkItem>,
    replies: &mut mpsc::UnboundedReceiver<WorkerReply>,
    cancellation_token: &CancellationToken,
) -> Result<(), SignerProcessorError>
where
    S: FrameSink,
    R: FrameSource,
{
    for scheme in schemes {
        register_scheme(sink, source, scheme, work, replies, cancellation_token).await?;
    }
    Ok(())
}

#[instrument(level = "info", skip(sink, source, work, replies, cancellation_token))]
async fn register_scheme<S, R>(
    sink: &S,
    source: &mut R,
    scheme: &str,
    work: &mpsc::Sender<WorkItem>,
    replies: &mut mpsc::UnboundedReceiver<WorkerReply>,
    cancellation_token: &CancellationToken,
) -> Result<(), SignerProcessorError>
where
    S: FrameSink,
    R: FrameSource,
{
    let request = Envelope::from_message(
        MessageType::RegisterRequest,
        &RegisterRequest {
            scheme: scheme.to_string(),
        },
    );
    sink.send(PeerId::UPSTREAM, Bytes::from(request.to_bytes())).await?;
    debug!(correlation_id = request.correlation_id, "Registration sent");

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => return Err(SignerProcessorError::Cancelled),
            frame = source.recv() => {
                let Some(frame) = frame else {
                    return Err(SignerProcessorError::UpstreamClosed);
                };
                let envelope = match decode(&frame.payload) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(peer = %frame.peer, "Dropping malformed frame: {e}");
                        continue;
                    }
                };
                if envelope.correlation_id != request.correlation_id {
                    work.send(WorkItem { peer: frame.peer, envelope })
                        .await
                        .map_err(|_| SignerProcessorError::WorkersStopped)?;
                    continue;
                }
                check_acknowledgement(scheme, &envelope)?;
                info!("Scheme registered");
                return Ok(());
            }
            Some(reply) = replies.recv() => {
                if let Err(e) = sink.send(reply.peer, Bytes::from(reply.envelope.to_bytes())).await {
                    warn!(peer = %reply.peer, correlation_id = reply.envelope.correlation_id, "Failed to forward reply: {e}");
                }
            }
        }
    }
}

fn check_acknowledgement(scheme: &str, envelope: &Envelope) -> Result<(), SignerProcessorError> {
    let failed = |reason: String| SignerProcessorError::RegistrationFailed {
        scheme: scheme.to_string(),
        reason,
    };
    if envelope.message_type != MessageType::RegisterResponse as i32 {
        return Err(failed(format!("unexpected reply type {}", envelope.message_type)));
    }
    let response: RegisterResponse = envelope
        .decode_content()
        .map_err(|e| failed(e.to_string()))?;
    if !response.is_ok() {
        return Err(failed("rejected by client".to_string()));
    }
    Ok(())
}
