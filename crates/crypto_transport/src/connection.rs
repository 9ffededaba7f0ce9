use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::types::{Frame, PeerId};

pub(crate) const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;
pub(crate) const OUTBOUND_CAPACITY: usize = 1024;
pub(crate) const INBOUND_CAPACITY: usize = 1024;

fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

/// Pumps frames between one byte stream and the socket's channels until either side closes.
pub(crate) async fn run_connection<S>(
    stream: S,
    peer: PeerId,
    inbound: mpsc::Sender<Frame>,
    mut outbound: mpsc::Receiver<Bytes>,
    cancellation_token: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (mut writer, mut reader) = Framed::new(stream, codec()).split();
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                debug!(%peer, "Connection cancelled");
                break;
            }
            frame = reader.next() => match frame {
                Some(Ok(bytes)) => {
                    trace!(%peer, len = bytes.len(), "Frame received");
                    if inbound.send(Frame { peer, payload: bytes.freeze() }).await.is_err() {
                        debug!(%peer, "Inbound channel closed");
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(%peer, "Failed to read frame: {e}");
                    break;
                }
                None => {
                    debug!(%peer, "Connection closed by remote");
                    break;
                }
            },
            payload = outbound.recv() => match payload {
                Some(payload) => {
                    if let Err(e) = writer.send(payload).await {
                        warn!(%peer, "Failed to write frame: {e}");
                        break;
                    }
                }
                None => {
                    debug!(%peer, "Outbound channel closed");
                    break;
                }
            },
        }
    }
}
