use std::time::Duration;

use config_parser::error::ConfigParserError;
use crypto_proto::{MessageType, ProtoError};
use crypto_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigParserError),
    #[error("Failed to decode reply: {0}")]
    Decode(#[from] ProtoError),
    #[error("No signer has registered scheme '{0}'")]
    SchemeNotRegistered(String),
    #[error("Request {correlation_id} timed out after {timeout:?}")]
    Timeout { correlation_id: String, timeout: Duration },
    #[error("Timed out after {timeout:?} waiting for scheme '{scheme}'")]
    SchemeWaitTimeout { scheme: String, timeout: Duration },
    #[error("Invalid response type: expected {expected}, got {got}")]
    InvalidResponseType { expected: MessageType, got: i32 },
    #[error("{operation} for scheme '{scheme}' failed on the signer")]
    OperationFailed { operation: MessageType, scheme: String },
    #[error("Failed to send request {correlation_id}: {reason}")]
    SendFailed { correlation_id: String, reason: String },
    #[error("Correlation id {0} is already pending")]
    DuplicateCorrelationId(String),
    #[error("Client is shut down")]
    Shutdown,
}
