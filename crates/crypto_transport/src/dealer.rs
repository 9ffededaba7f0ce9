use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::connection::{INBOUND_CAPACITY, OUTBOUND_CAPACITY, run_connection};
use crate::error::TransportError;
use crate::traits::{FrameSink, FrameSource};
use crate::types::{Frame, PeerId};

/// Connecting side of the transport. All inbound frames are labelled [`PeerId::UPSTREAM`].
pub struct DealerSocket {
    sink: DealerSink,
    source: DealerSource,
}

impl DealerSocket {
    #[instrument(level = "debug", skip(cancellation_token))]
    pub async fn connect(addr: SocketAddr, cancellation_token: CancellationToken) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!(%addr, "Connected to router");
        Ok(Self::from_stream(stream, cancellation_token))
    }

    pub fn from_stream<S>(stream: S, cancellation_token: CancellationToken) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        tokio::spawn(run_connection(
            stream,
            PeerId::UPSTREAM,
            inbound_tx,
            outbound_rx,
            cancellation_token,
        ));
        Self {
            sink: DealerSink { outbound: outbound_tx },
            source: DealerSource { inbound: inbound_rx },
        }
    }

    pub fn into_split(self) -> (DealerSink, DealerSource) {
        (self.sink, self.source)
    }
}

#[derive(Clone)]
pub struct DealerSink {
    outbound: mpsc::Sender<Bytes>,
}

#[async_trait]
impl FrameSink for DealerSink {
    /// A dealer has exactly one upstream, so `peer` only labels errors.
    async fn send(&self, peer: PeerId, payload: Bytes) -> Result<(), TransportError> {
        self.outbound
            .send(payload)
            .await
            .map_err(|_| TransportError::PeerDisconnected(peer))
    }
}

pub struct DealerSource {
    inbound: mpsc::Receiver<Frame>,
}

#[async_trait]
impl FrameSource for DealerSource {
    async fn recv(&mut self) -> Option<Frame> {
        self.inbound.recv().await
    }
}
