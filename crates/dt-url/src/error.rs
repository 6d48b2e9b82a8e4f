use thiserror::Error;

#[derive(Error, Debug)]
pub enum UrlError {
    #[error("invalid scheme/host/port/user-info in '{url}': {reason}")]
    InvalidUrlGrammar { url: String, reason: String },
    #[error("file {url} {reason}")]
    UnsupportedFormat { url: String, reason: String },
    #[error("`{url}` is not a URL or a valid local path")]
    ResourceUnavailable { url: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed url message: {0}")]
    MalformedProto(String),
    #[error("proto error: {0}")]
    Proto(#[from] dt_proto::ProtoError),
}

pub type Result<T> = std::result::Result<T, UrlError>;
