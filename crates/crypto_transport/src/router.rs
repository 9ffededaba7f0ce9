use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::connection::{INBOUND_CAPACITY, OUTBOUND_CAPACITY, MAX_FRAME_LENGTH, run_connection};
use crate::dealer::DealerSocket;
use crate::error::TransportError;
use crate::traits::{FrameSink, FrameSource};
use crate::types::{Frame, PeerId};

struct RouterShared {
    peers: RwLock<HashMap<PeerId, mpsc::Sender<Bytes>>>,
    inbound: mpsc::Sender<Frame>,
    next_peer: AtomicU64,
    cancellation_token: CancellationToken,
    tracker: TaskTracker,
}

impl RouterShared {
    async fn attach<S>(self: &Arc<Self>, stream: S) -> PeerId
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let peer = PeerId(self.next_peer.fetch_add(1, Ordering::Relaxed));
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        self.peers.write().await.insert(peer, outbound_tx);

        let shared = self.clone();
        self.tracker.spawn(async move {
            run_connection(
                stream,
                peer,
                shared.inbound.clone(),
                outbound_rx,
                shared.cancellation_token.child_token(),
            )
            .await;
            shared.peers.write().await.remove(&peer);
            debug!(%peer, "Peer detached");
        });
        debug!(%peer, "Peer attached");
        peer
    }
}

/// Accepting side of the transport; every connected peer gets its own [`PeerId`].
pub struct RouterSocket {
    local_addr: Option<SocketAddr>,
    shared: Arc<RouterShared>,
    source: RouterSource,
}

impl RouterSocket {
    #[instrument(level = "debug", skip(cancellation_token))]
    pub async fn bind(addr: SocketAddr, cancellation_token: CancellationToken) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let mut socket = Self::in_memory(cancellation_token);
        socket.local_addr = Some(local_addr);

        let shared = socket.shared.clone();
        socket.shared.tracker.spawn(async move {
            loop {
                tokio::select! {
                    _ = shared.cancellation_token.cancelled() => {
                        debug!("Router accept loop stopped");
                        break;
                    }
                    accepted = listener.accept() => match accepted {
                        Ok((stream, remote)) => {
                            let peer = shared.attach(stream).await;
                            info!(%peer, %remote, "Accepted connection");
                        }
                        Err(e) => warn!("Failed to accept connection: {e}"),
                    }
                }
            }
        });
        info!(%local_addr, max_frame = MAX_FRAME_LENGTH, "Router bound");
        Ok(socket)
    }

    /// Router without a listener; peers join through [`RouterSocket::memory_connector`].
    pub fn in_memory(cancellation_token: CancellationToken) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        Self {
            local_addr: None,
            shared: Arc::new(RouterShared {
                peers: RwLock::new(HashMap::new()),
                inbound: inbound_tx,
                next_peer: AtomicU64::new(1),
                cancellation_token,
                tracker: TaskTracker::new(),
            }),
            source: RouterSource { inbound: inbound_rx },
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn memory_connector(&self) -> MemoryConnector {
        MemoryConnector {
            shared: self.shared.clone(),
        }
    }

    pub fn into_split(self) -> (RouterSink, RouterSource) {
        (RouterSink { shared: self.shared }, self.source)
    }
}

/// Connects in-process dealers to a router over a duplex pipe.
#[derive(Clone)]
pub struct MemoryConnector {
    shared: Arc<RouterShared>,
}

impl MemoryConnector {
    pub async fn connect(&self) -> DealerSocket {
        let (router_end, dealer_end) = tokio::io::duplex(MAX_FRAME_LENGTH);
        self.shared.attach(router_end).await;
        DealerSocket::from_stream(dealer_end, self.shared.cancellation_token.child_token())
    }
}

#[derive(Clone)]
pub struct RouterSink {
    shared: Arc<RouterShared>,
}

impl RouterSink {
    pub async fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self.shared.peers.read().await.keys().copied().collect();
        peers.sort();
        peers
    }
}

#[async_trait]
impl FrameSink for RouterSink {
    async fn send(&self, peer: PeerId, payload: Bytes) -> Result<(), TransportError> {
        let outbound = self
            .shared
            .peers
            .read()
            .await
            .get(&peer)
            .cloned()
            .ok_or(TransportError::UnknownPeer(peer))?;
        outbound
            .send(payload)
            .await
            .map_err(|_| TransportError::PeerDisconnected(peer))
    }
}

pub struct RouterSource {
    inbound: mpsc::Receiver<Frame>,
}

#[async_trait]
impl FrameSource for RouterSource {
    async fn recv(&mut self) -> Option<Frame> {
        self.inbound.recv().await
    }
}
