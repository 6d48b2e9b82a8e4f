use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("failed to decode protobuf message: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("node has no content")]
    EmptyNode,
    #[error("expected {expected} content in node '{type_name}'")]
    UnexpectedContent {
        expected: &'static str,
        type_name: String,
    },
}

pub type Result<T> = std::result::Result<T, ProtoError>;
