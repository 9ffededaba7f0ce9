use global_utils::common_types::new_correlation_id;
use prost::Message;

use crate::error::ProtoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum MessageType {
    Default = 0,
    RegisterRequest = 1,
    RegisterResponse = 2,
    SignRequest = 100,
    SignResponse = 101,
    VerifyRequest = 200,
    VerifyResponse = 201,
    AggregateRequest = 300,
    AggregateResponse = 301,
    GenerateRequest = 400,
    GenerateResponse = 401,
}

impl MessageType {
    /// Reply type paired with a request type, `None` for anything that is not a request.
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            MessageType::RegisterRequest => Some(MessageType::RegisterResponse),
            MessageType::SignRequest => Some(MessageType::SignResponse),
            MessageType::VerifyRequest => Some(MessageType::VerifyResponse),
            MessageType::AggregateRequest => Some(MessageType::AggregateResponse),
            MessageType::GenerateRequest => Some(MessageType::GenerateResponse),
            _ => None,
        }
    }

    pub fn is_request(self) -> bool {
        self.response_type().is_some()
    }
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct Envelope {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub message_type: i32,
    #[prost(string, tag = "2")]
    pub correlation_id: String,
    #[prost(bytes = "vec", tag = "4")]
    pub content: Vec<u8>,
}

impl Envelope {
    /// Builds an envelope under a freshly generated correlation id.
    pub fn new(message_type: MessageType, content: Vec<u8>) -> Self {
        Self::with_correlation_id(message_type, content, new_correlation_id())
    }

    pub fn with_correlation_id(message_type: MessageType, content: Vec<u8>, correlation_id: impl Into<String>) -> Self {
        Self {
            message_type: message_type as i32,
            correlation_id: correlation_id.into(),
            content,
        }
    }

    pub fn from_message<M: Message>(message_type: MessageType, message: &M) -> Self {
        Self::new(message_type, message.encode_to_vec())
    }

    /// Builds the reply to `self`, carrying the same correlation id.
    pub fn reply<M: Message>(&self, message_type: MessageType, message: &M) -> Self {
        Self::with_correlation_id(message_type, message.encode_to_vec(), self.correlation_id.clone())
    }

    pub fn kind(&self) -> Result<MessageType, ProtoError> {
        MessageType::try_from(self.message_type).map_err(|_| ProtoError::UnknownMessageType(self.message_type))
    }

    pub fn decode_content<M: Message + Default>(&self) -> Result<M, ProtoError> {
        Ok(M::decode(self.content.as_slice())?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Decodes a frame, rejecting envelopes whose type tag is not a known [`MessageType`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        let envelope = <Self as Message>::decode(bytes)?;
        envelope.kind()?;
        Ok(envelope)
    }
}

pub fn encode(message_type: MessageType, correlation_id: &str, payload: &[u8]) -> Vec<u8> {
    Envelope::with_correlation_id(message_type, payload.to_vec(), correlation_id).to_bytes()
}

pub fn decode(bytes: &[u8]) -> Result<Envelope, ProtoError> {
    Envelope::from_bytes(bytes)
}
