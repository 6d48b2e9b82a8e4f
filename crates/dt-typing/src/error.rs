use std::path::PathBuf;

use dt_proto::ProtoError;
use dt_tensor::TensorError;
use dt_url::UrlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    Proto(#[from] ProtoError),
    #[error("{expected} expects a URL string, got {got}")]
    TypeMismatch { expected: &'static str, got: String },
    #[error("unknown proto type '{0}'")]
    UnknownProtoType(String),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
