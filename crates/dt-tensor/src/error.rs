use thiserror::Error;

use crate::kind::TensorKind;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("expected one of [{}] compatible type, got {}", .expected.join(", "), .got)]
    UnsupportedInputType {
        expected: [&'static str; 3],
        got: String,
    },
    #[error("{kind} expects {expected}, got shape {got:?}")]
    InvalidShape {
        kind: TensorKind,
        expected: &'static str,
        got: Vec<usize>,
    },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: String, got: String },
    #[error("unsupported dtype: {0}")]
    UnsupportedDType(String),
    #[error("index {index} is out of bounds for axis 0 with size {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("len() of a 0-d tensor")]
    Unsized,
    #[error("malformed tensor message: {0}")]
    MalformedProto(String),
    #[error("unknown tensor type '{0}'")]
    UnknownProtoType(String),
    #[error("proto error: {0}")]
    Proto(#[from] dt_proto::ProtoError),
    #[cfg(feature = "candle")]
    #[error("candle error: {0}")]
    Candle(#[from] candle_core::Error),
    #[error("{0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, TensorError>;
