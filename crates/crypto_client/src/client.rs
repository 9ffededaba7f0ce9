use std::net::SocketAddr;
use std::time::Duration;

use config_parser::config::ClientConfig;
use crypto_proto::{
    AggregateRequest, Envelope, GenerateRequest, SchemeRequest, SchemeResponse, SignRequest, VerifyRequest,
};
use crypto_transport::{FrameSink, FrameSource, RouterSocket};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::init::create_multiplexer;
use crate::types::Command;

/// Cloneable handle for issuing operations; every clone shares one connection.
#[derive(Clone)]
pub struct CryptoClient {
    commands: mpsc::Sender<Command>,
    request_timeout: Duration,
    cancellation_token: CancellationToken,
    local_addr: Option<SocketAddr>,
}

impl CryptoClient {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        request_timeout: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            commands,
            request_timeout,
            cancellation_token,
            local_addr: None,
        }
    }

    /// Binds the router socket from `config` and starts serving signer registrations.
    #[instrument(level = "debug")]
    pub async fn bind(config: &ClientConfig) -> Result<Self, ClientError> {
        let cancellation_token = CancellationToken::new();
        let router = RouterSocket::bind(config.router.socket_addr()?, cancellation_token.clone()).await?;
        let local_addr = router.local_addr();
        let (sink, source) = router.into_split();
        let mut client = Self::spawn(sink, source, config.request_timeout(), cancellation_token);
        client.local_addr = local_addr;
        Ok(client)
    }

    /// Runs a client over an already established transport.
    pub fn spawn<S, R>(sink: S, source: R, request_timeout: Duration, cancellation_token: CancellationToken) -> Self
    where
        S: FrameSink + 'static,
        R: FrameSource + 'static,
    {
        let (multiplexer, client) = create_multiplexer(sink, source, request_timeout, cancellation_token);
        tokio::spawn(multiplexer.run());
        client
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Sends `request` to the signer registered for its scheme and waits for the reply.
    ///
    /// A reply with `ERROR` status is returned as [`ClientError::OperationFailed`].
    #[instrument(level = "debug", skip(self, request), fields(scheme = request.scheme()))]
    pub async fn call<R: SchemeRequest>(&self, request: R) -> Result<R::Response, ClientError> {
        let scheme = request.scheme().to_string();
        let envelope = Envelope::from_message(R::REQUEST, &request);
        let correlation_id = envelope.correlation_id.clone();

        let (reply_sender, reply_receiver) = oneshot::channel();
        self.commands
            .send(Command::Dispatch {
                scheme: scheme.clone(),
                envelope,
                reply: reply_sender,
            })
            .await
            .map_err(|_| ClientError::Shutdown)?;
        let mut guard = PendingGuard {
            commands: &self.commands,
            correlation_id: Some(correlation_id.clone()),
        };

        let reply = match tokio::time::timeout(self.request_timeout, reply_receiver).await {
            Ok(Ok(reply)) => {
                guard.disarm();
                reply?
            }
            Ok(Err(_)) => {
                guard.disarm();
                return Err(ClientError::Shutdown);
            }
            Err(_) => {
                debug!(correlation_id, "Request timed out, abandoning");
                guard.disarm();
                let _ = self
                    .commands
                    .send(Command::Abandon {
                        correlation_id: correlation_id.clone(),
                    })
                    .await;
                return Err(ClientError::Timeout {
                    correlation_id,
                    timeout: self.request_timeout,
                });
            }
        };

        let expected = <R::Response as SchemeResponse>::RESPONSE;
        if reply.message_type != expected as i32 {
            return Err(ClientError::InvalidResponseType {
                expected,
                got: reply.message_type,
            });
        }
        let response: R::Response = reply.decode_content()?;
        if !response.is_ok() {
            return Err(ClientError::OperationFailed {
                operation: R::REQUEST,
                scheme,
            });
        }
        Ok(response)
    }

    pub async fn sign(&self, scheme: &str, digest: &[u8], private_key: &[u8]) -> Result<Vec<u8>, ClientError> {
        let response = self
            .call(SignRequest {
                scheme: scheme.to_string(),
                digest: digest.to_vec(),
                private_key: private_key.to_vec(),
            })
            .await?;
        Ok(response.signature)
    }

    pub async fn verify(
        &self,
        scheme: &str,
        signature: &[u8],
        msg: &[u8],
        public_key: &[u8],
    ) -> Result<(), ClientError> {
        self.call(VerifyRequest {
            scheme: scheme.to_string(),
            signature: signature.to_vec(),
            msg: msg.to_vec(),
            public_key: public_key.to_vec(),
        })
        .await?;
        Ok(())
    }

    pub async fn aggregate(
        &self,
        scheme: &str,
        shares: &[Vec<u8>],
        digest: &[u8],
        public_key: &[u8],
        t: u32,
        n: u32,
    ) -> Result<Vec<u8>, ClientError> {
        let response = self
            .call(AggregateRequest {
                scheme: scheme.to_string(),
                shares: shares.to_vec(),
                digest: digest.to_vec(),
                public_key: public_key.to_vec(),
                t,
                n,
            })
            .await?;
        Ok(response.signature)
    }

    /// Returns the public key and the `n` private key shares.
    pub async fn generate(&self, scheme: &str, n: u32, t: u32) -> Result<(Vec<u8>, Vec<Vec<u8>>), ClientError> {
        let response = self
            .call(GenerateRequest {
                scheme: scheme.to_string(),
                n,
                t,
            })
            .await?;
        Ok((response.public_key, response.private_keys))
    }

    pub async fn registered_schemes(&self) -> Result<Vec<String>, ClientError> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.commands
            .send(Command::Schemes { reply: reply_sender })
            .await
            .map_err(|_| ClientError::Shutdown)?;
        reply_receiver.await.map_err(|_| ClientError::Shutdown)
    }

    /// Resolves once some signer has registered `scheme`.
    pub async fn wait_for_scheme(&self, scheme: &str, timeout: Duration) -> Result<(), ClientError> {
        let (reply_sender, reply_receiver) = oneshot::channel();
        self.commands
            .send(Command::WaitScheme {
                scheme: scheme.to_string(),
                reply: reply_sender,
            })
            .await
            .map_err(|_| ClientError::Shutdown)?;
        match tokio::time::timeout(timeout, reply_receiver).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(ClientError::Shutdown),
            Err(_) => Err(ClientError::SchemeWaitTimeout {
                scheme: scheme.to_string(),
                timeout,
            }),
        }
    }

    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }
}

/// Abandons a dispatched request if the caller's future is dropped before the reply arrives.
struct PendingGuard<'a> {
    commands: &'a mpsc::Sender<Command>,
    correlation_id: Option<String>,
}

impl PendingGuard<'_> {
    fn disarm(&mut self) {
        self.correlation_id = None;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(correlation_id) = self.correlation_id.take() {
            debug!(correlation_id, "Caller dropped a pending request");
            if self.commands.try_send(Command::Abandon { correlation_id }).is_err() {
                warn!("Command queue unavailable, pending request left to expire");
            }
        }
    }
}
