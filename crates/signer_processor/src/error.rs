use config_parser::error::ConfigParserError;
use crypto_handler::HandlerError;
use crypto_proto::ProtoError;
use crypto_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignerProcessorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigParserError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
    #[error("Failed to register scheme '{scheme}': {reason}")]
    RegistrationFailed { scheme: String, reason: String },
    #[error("Upstream connection closed")]
    UpstreamClosed,
    #[error("Worker pool stopped")]
    WorkersStopped,
    #[error("Signer processor cancelled")]
    Cancelled,
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Failure of a single request; always turned into an `ERROR` reply.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Failed to decode request: {0}")]
    Decode(#[from] ProtoError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
}
