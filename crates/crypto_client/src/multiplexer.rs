use std::collections::HashMap;

use bytes::Bytes;
use crypto_proto::{Envelope, MessageType, RegisterRequest, RegisterResponse, SchemeResponse};
use crypto_transport::PeerId;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::types::{Command, OneshotReplySender, Outbound, SendFailure};

/// Owner of the pending request table and the scheme bindings.
///
/// Every mutation of either map happens inside [`Multiplexer::run`], fed by client handles,
/// the receive loop and the send loop.
pub struct Multiplexer {
    commands: mpsc::Receiver<Command>,
    inbound: mpsc::Receiver<(PeerId, Envelope)>,
    failures: mpsc::UnboundedReceiver<SendFailure>,
    outbound: mpsc::UnboundedSender<Outbound>,
    pending: HashMap<String, OneshotReplySender>,
    handlers: HashMap<String, PeerId>,
    scheme_waiters: HashMap<String, Vec<oneshot::Sender<()>>>,
    cancellation_token: CancellationToken,
}

pub struct MultiplexerInitArgs {
    pub commands: mpsc::Receiver<Command>,
    pub inbound: mpsc::Receiver<(PeerId, Envelope)>,
    pub failures: mpsc::UnboundedReceiver<SendFailure>,
    pub outbound: mpsc::UnboundedSender<Outbound>,
    pub cancellation_token: CancellationToken,
}

impl Multiplexer {
    pub fn new(args: MultiplexerInitArgs) -> Self {
        Self {
            commands: args.commands,
            inbound: args.inbound,
            failures: args.failures,
            outbound: args.outbound,
            pending: HashMap::new(),
            handlers: HashMap::new(),
            scheme_waiters: HashMap::new(),
            cancellation_token: args.cancellation_token,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("Shutting down multiplexer");
                    break;
                }
                command = self.commands.recv() => match command {
                    None => {
                        debug!("All client handles dropped");
                        break;
                    }
                    Some(command) => self.handle_command(command),
                },
                inbound = self.inbound.recv() => match inbound {
                    None => {
                        warn!("Receive loop stopped, no further replies can arrive");
                        break;
                    }
                    Some((peer, envelope)) => self.handle_inbound(peer, envelope),
                },
                Some(failure) = self.failures.recv() => self.handle_send_failure(failure),
            }
        }
        self.fail_pending();
        self.cancellation_token.cancel();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Dispatch {
                scheme,
                envelope,
                reply,
            } => self.dispatch(scheme, envelope, reply),
            Command::Abandon { correlation_id } => {
                if self.pending.remove(&correlation_id).is_some() {
                    debug!(correlation_id, "Pending request abandoned");
                }
            }
            Command::Schemes { reply } => {
                let mut schemes: Vec<String> = self.handlers.keys().cloned().collect();
                schemes.sort();
                let _ = reply.send(schemes);
            }
            Command::WaitScheme { scheme, reply } => {
                if self.handlers.contains_key(&scheme) {
                    let _ = reply.send(());
                } else {
                    let waiters = self.scheme_waiters.entry(scheme).or_default();
                    waiters.retain(|waiter| !waiter.is_closed());
                    waiters.push(reply);
                }
            }
        }
    }

    fn dispatch(&mut self, scheme: String, envelope: Envelope, reply: OneshotReplySender) {
        let correlation_id = envelope.correlation_id.clone();
        if self.pending.contains_key(&correlation_id) {
            let _ = reply.send(Err(ClientError::DuplicateCorrelationId(correlation_id)));
            return;
        }
        let Some(&peer) = self.handlers.get(&scheme) else {
            debug!(scheme, "Request for unregistered scheme");
            let _ = reply.send(Err(ClientError::SchemeNotRegistered(scheme)));
            return;
        };

        // the entry must exist before the frame leaves, a fast reply would be lost otherwise
        self.pending.insert(correlation_id.clone(), reply);
        let outbound = Outbound {
            peer,
            payload: Bytes::from(envelope.to_bytes()),
            correlation_id: Some(correlation_id.clone()),
        };
        if self.outbound.send(outbound).is_err() {
            if let Some(reply) = self.pending.remove(&correlation_id) {
                let _ = reply.send(Err(ClientError::Shutdown));
            }
            return;
        }
        debug!(correlation_id, scheme, %peer, "Request dispatched");
    }

    fn handle_inbound(&mut self, peer: PeerId, envelope: Envelope) {
        if envelope.message_type == MessageType::RegisterRequest as i32 {
            self.handle_register(peer, envelope);
            return;
        }
        match self.pending.remove(&envelope.correlation_id) {
            Some(reply) => {
                if reply.send(Ok(envelope)).is_err() {
                    debug!("Caller stopped waiting before its reply arrived");
                }
            }
            None => warn!(
                correlation_id = envelope.correlation_id,
                %peer,
                "Discarding reply with no pending request"
            ),
        }
    }

    fn handle_register(&mut self, peer: PeerId, envelope: Envelope) {
        let response = match envelope.decode_content::<RegisterRequest>() {
            Ok(request) => {
                match self.handlers.insert(request.scheme.clone(), peer) {
                    Some(previous) if previous != peer => {
                        info!(scheme = request.scheme, %previous, %peer, "Scheme rebound to new signer")
                    }
                    _ => info!(scheme = request.scheme, %peer, "Scheme registered"),
                }
                for waiter in self.scheme_waiters.remove(&request.scheme).unwrap_or_default() {
                    let _ = waiter.send(());
                }
                RegisterResponse::success()
            }
            Err(e) => {
                warn!(%peer, "Malformed registration request: {e}");
                RegisterResponse::failure()
            }
        };
        let reply = envelope.reply(MessageType::RegisterResponse, &response);
        let _ = self.outbound.send(Outbound {
            peer,
            payload: Bytes::from(reply.to_bytes()),
            correlation_id: None,
        });
    }

    fn handle_send_failure(&mut self, failure: SendFailure) {
        if let Some(reply) = self.pending.remove(&failure.correlation_id) {
            let _ = reply.send(Err(ClientError::SendFailed {
                correlation_id: failure.correlation_id,
                reason: failure.reason,
            }));
        }
    }

    fn fail_pending(&mut self) {
        for (_, reply) in self.pending.drain() {
            let _ = reply.send(Err(ClientError::Shutdown));
        }
    }
}
