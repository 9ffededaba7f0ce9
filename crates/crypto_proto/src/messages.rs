use prost::Message;

use crate::envelope::MessageType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    Error = 1,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct RegisterRequest {
    #[prost(string, tag = "1")]
    pub scheme: String,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct RegisterResponse {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct SignRequest {
    #[prost(string, tag = "1")]
    pub scheme: String,
    #[prost(bytes = "vec", tag = "2")]
    pub digest: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub private_key: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct SignResponse {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct VerifyRequest {
    #[prost(string, tag = "1")]
    pub scheme: String,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub msg: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub public_key: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct VerifyResponse {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct AggregateRequest {
    #[prost(string, tag = "1")]
    pub scheme: String,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub shares: Vec<Vec<u8>>,
    #[prost(bytes = "vec", tag = "3")]
    pub digest: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub public_key: Vec<u8>,
    #[prost(uint32, tag = "5")]
    pub t: u32,
    #[prost(uint32, tag = "6")]
    pub n: u32,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct AggregateResponse {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct GenerateRequest {
    #[prost(string, tag = "1")]
    pub scheme: String,
    #[prost(uint32, tag = "2")]
    pub n: u32,
    #[prost(uint32, tag = "3")]
    pub t: u32,
}

#[derive(Clone, PartialEq, Eq, Message)]
pub struct GenerateResponse {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub public_key: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub private_keys: Vec<Vec<u8>>,
}

/// A request addressed to a named scheme, paired with the response it expects.
pub trait SchemeRequest: Message + Default + Clone + Send + 'static {
    const REQUEST: MessageType;
    type Response: SchemeResponse;

    fn scheme(&self) -> &str;
}

pub trait SchemeResponse: Message + Default + Send + 'static {
    const RESPONSE: MessageType;

    /// Response carrying `Status::Error` and empty payload fields.
    fn failure() -> Self;

    fn success() -> Self;

    fn is_ok(&self) -> bool;
}

macro_rules! impl_scheme_pair {
    ($($request:ident => $response:ident),+ $(,)?) => {
        $(
            impl SchemeRequest for $request {
                const REQUEST: MessageType = MessageType::$request;
                type Response = $response;

                fn scheme(&self) -> &str {
                    &self.scheme
                }
            }

            impl SchemeResponse for $response {
                const RESPONSE: MessageType = MessageType::$response;

                fn failure() -> Self {
                    Self {
                        status: Status::Error as i32,
                        ..Default::default()
                    }
                }

                fn success() -> Self {
                    Self {
                        status: Status::Ok as i32,
                        ..Default::default()
                    }
                }

                fn is_ok(&self) -> bool {
                    self.status == Status::Ok as i32
                }
            }
        )+
    };
}

impl_scheme_pair! {
    RegisterRequest => RegisterResponse,
    SignRequest => SignResponse,
    VerifyRequest => VerifyResponse,
    AggregateRequest => AggregateResponse,
    GenerateRequest => GenerateResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_responses_carry_error_status() {
        let sign = SignResponse::failure();
        assert!(!sign.is_ok());
        assert_eq!(sign.status(), Status::Error);
        assert!(sign.signature.is_empty());

        let generate = GenerateResponse::failure();
        assert!(!generate.is_ok());
        assert!(generate.private_keys.is_empty());
    }

    #[test]
    fn default_status_is_ok() {
        // an empty response on the wire decodes to status OK
        let decoded = VerifyResponse::decode(&[][..]).unwrap();
        assert!(decoded.is_ok());
        assert_eq!(decoded, VerifyResponse::success());
    }

    #[test]
    fn request_types_line_up_with_envelope_types() {
        assert_eq!(SignRequest::REQUEST, MessageType::SignRequest);
        assert_eq!(<SignRequest as SchemeRequest>::Response::RESPONSE, MessageType::SignResponse);
        assert_eq!(
            AggregateRequest::REQUEST.response_type(),
            Some(AggregateResponse::RESPONSE)
        );
        assert_eq!(RegisterRequest::REQUEST.response_type(), Some(RegisterResponse::RESPONSE));
    }

    #[test]
    fn aggregate_request_keeps_share_order() {
        let request = AggregateRequest {
            scheme: "TBLS256".to_string(),
            shares: vec![vec![3], vec![], vec![1, 2]],
            digest: b"hello".to_vec(),
            public_key: vec![9; 4],
            t: 6,
            n: 10,
        };
        let decoded = AggregateRequest::decode(request.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.shares, request.shares);
        assert_eq!(decoded.scheme(), "TBLS256");
        assert_eq!((decoded.t, decoded.n), (6, 10));
    }
}
