use std::sync::Arc;

use crypto_handler::{HandlerError, HandlerRegistry, SchemeHandler};
use crypto_proto::{
    AggregateRequest, AggregateResponse, Envelope, GenerateRequest, GenerateResponse, MessageType, SchemeRequest,
    SchemeResponse, SignRequest, SignResponse, Status, VerifyRequest, VerifyResponse,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::error::OperationError;
use crate::types::{WorkItem, WorkQueue, WorkerReply};

pub(crate) struct Worker {
    pub id: usize,
    pub queue: WorkQueue,
    pub registry: Arc<HandlerRegistry>,
    pub replies: mpsc::UnboundedSender<WorkerReply>,
    pub cancellation_token: CancellationToken,
}

impl Worker {
    #[instrument(level = "debug", skip(self), fields(worker = self.id))]
    pub async fn run(self) {
        loop {
            let item = {
                let mut queue = self.queue.lock().await;
                tokio::select! {
                    _ = self.cancellation_token.cancelled() => None,
                    item = queue.recv() => item,
                }
            };
            let Some(item) = item else {
                debug!("Worker stopped");
                break;
            };
            if let Some(reply) = self.process(item).await
                && self.replies.send(reply).is_err()
            {
                debug!("Reply channel closed, worker stopped");
                break;
            }
        }
    }

    async fn process(&self, item: WorkItem) -> Option<WorkerReply> {
        let WorkItem { peer, envelope } = item;
        let kind = match envelope.kind() {
            Ok(kind) if kind.is_request() && kind != MessageType::RegisterRequest => kind,
            Ok(kind) => {
                warn!(correlation_id = envelope.correlation_id, %kind, "Ignoring non-request message");
                return None;
            }
            Err(e) => {
                warn!(correlation_id = envelope.correlation_id, "Ignoring message: {e}");
                return None;
            }
        };

        let registry = self.registry.clone();
        let request = envelope.clone();
        let reply = match tokio::task::spawn_blocking(move || execute(&registry, &request)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(correlation_id = envelope.correlation_id, %kind, "Operation aborted: {e}");
                failure_reply(&envelope, kind)?
            }
        };
        Some(WorkerReply { peer, envelope: reply })
    }
}

/// Runs one request envelope against the registry and builds its reply.
///
/// Every failure (undecodable payload, unknown scheme, handler error) yields a reply of the
/// matching response type with `ERROR` status and no payload. Returns a `DEFAULT` envelope with
/// the request's correlation id when `request` is not an operation request.
pub fn execute(registry: &HandlerRegistry, request: &Envelope) -> Envelope {
    match request.kind() {
        Ok(MessageType::SignRequest) => respond(registry, request, sign),
        Ok(MessageType::VerifyRequest) => respond(registry, request, verify),
        Ok(MessageType::AggregateRequest) => respond(registry, request, aggregate),
        Ok(MessageType::GenerateRequest) => respond(registry, request, generate),
        _ => Envelope::with_correlation_id(MessageType::Default, Vec::new(), request.correlation_id.clone()),
    }
}

fn respond<R: SchemeRequest>(
    registry: &HandlerRegistry,
    request: &Envelope,
    operation: fn(&dyn SchemeHandler, R) -> Result<R::Response, HandlerError>,
) -> Envelope {
    let outcome = request
        .decode_content::<R>()
        .map_err(OperationError::from)
        .and_then(|message| {
            let handler = registry.find(message.scheme())?;
            Ok(operation(handler.as_ref(), message)?)
        });
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            warn!(correlation_id = request.correlation_id, kind = %R::REQUEST, "Request failed: {e}");
            R::Response::failure()
        }
    };
    request.reply(R::Response::RESPONSE, &response)
}

fn failure_reply(request: &Envelope, kind: MessageType) -> Option<Envelope> {
    let reply = match kind {
        MessageType::SignRequest => request.reply(SignResponse::RESPONSE, &SignResponse::failure()),
        MessageType::VerifyRequest => request.reply(VerifyResponse::RESPONSE, &VerifyResponse::failure()),
        MessageType::AggregateRequest => request.reply(AggregateResponse::RESPONSE, &AggregateResponse::failure()),
        MessageType::GenerateRequest => request.reply(GenerateResponse::RESPONSE, &GenerateResponse::failure()),
        _ => return None,
    };
    Some(reply)
}

fn sign(handler: &dyn SchemeHandler, request: SignRequest) -> Result<SignResponse, HandlerError> {
    let key = handler.unmarshal_private(&request.private_key)?;
    let signature = handler.sign(&request.digest, key.as_ref())?;
    Ok(SignResponse {
        status: Status::Ok as i32,
        signature,
    })
}

fn verify(handler: &dyn SchemeHandler, request: VerifyRequest) -> Result<VerifyResponse, HandlerError> {
    let key = handler.unmarshal_public(&request.public_key)?;
    handler.verify(&request.signature, &request.msg, key.as_ref())?;
    Ok(VerifyResponse::success())
}

fn aggregate(handler: &dyn SchemeHandler, request: AggregateRequest) -> Result<AggregateResponse, HandlerError> {
    let key = handler.unmarshal_public(&request.public_key)?;
    let signature = handler.aggregate(
        &request.shares,
        &request.digest,
        key.as_ref(),
        request.t as usize,
        request.n as usize,
    )?;
    Ok(AggregateResponse {
        status: Status::Ok as i32,
        signature,
    })
}

fn generate(handler: &dyn SchemeHandler, request: GenerateRequest) -> Result<GenerateResponse, HandlerError> {
    let (public, private) = handler.generate(request.n as usize, request.t as usize)?;
    Ok(GenerateResponse {
        status: Status::Ok as i32,
        public_key: public.marshal_binary()?,
        private_keys: private.marshal_binary()?,
    })
}
