use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("Failed to decode message: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("Unknown message type: {0}")]
    UnknownMessageType(i32),
}
