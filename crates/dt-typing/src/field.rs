use std::fmt;

use dt_proto::NodeProto;
use dt_tensor::{coerce, NdArray, Tensor, TensorInput, TensorKind};
use dt_url::{AudioUrl, ImageUrl, TextUrl, UrlKind, VideoUrl};
use ndarray::ArrayD;
use tracing::debug;

use crate::config::TypingConfig;
use crate::error::{Result, ValidationError};
use crate::registry;

/// Media family of a URL field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlType {
    Image,
    Audio,
    Video,
    Text,
}

impl UrlType {
    pub const ALL: [UrlType; 4] = [UrlType::Image, UrlType::Audio, UrlType::Video, UrlType::Text];

    pub fn name(&self) -> &'static str {
        match self {
            UrlType::Image => dt_url::Image::NAME,
            UrlType::Audio => dt_url::Audio::NAME,
            UrlType::Video => dt_url::Video::NAME,
            UrlType::Text => dt_url::Text::NAME,
        }
    }

    pub fn proto_type_name(&self) -> &'static str {
        match self {
            UrlType::Image => dt_url::Image::PROTO_TYPE_NAME,
            UrlType::Audio => dt_url::Audio::PROTO_TYPE_NAME,
            UrlType::Video => dt_url::Video::PROTO_TYPE_NAME,
            UrlType::Text => dt_url::Text::PROTO_TYPE_NAME,
        }
    }
}

/// Declared type of a document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Tensor(TensorKind),
    Url(UrlType),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Tensor(kind) => write!(f, "{}", kind),
            FieldType::Url(url) => f.write_str(url.name()),
        }
    }
}

/// A raw value offered to a field.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Tensor(TensorInput),
    Text(String),
}

impl From<TensorInput> for FieldInput {
    fn from(input: TensorInput) -> Self {
        FieldInput::Tensor(input)
    }
}

impl From<Tensor> for FieldInput {
    fn from(tensor: Tensor) -> Self {
        FieldInput::Tensor(tensor.into())
    }
}

impl From<NdArray> for FieldInput {
    fn from(tensor: NdArray) -> Self {
        FieldInput::Tensor(tensor.into())
    }
}

impl From<ArrayD<f32>> for FieldInput {
    fn from(array: ArrayD<f32>) -> Self {
        FieldInput::Tensor(array.into())
    }
}

impl From<String> for FieldInput {
    fn from(text: String) -> Self {
        FieldInput::Text(text)
    }
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        FieldInput::Text(text.to_string())
    }
}

/// A validated field value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Tensor(Tensor),
    ImageUrl(ImageUrl),
    AudioUrl(AudioUrl),
    VideoUrl(VideoUrl),
    TextUrl(TextUrl),
}

/// Validate `input` against the declared `field` type.
///
/// # Errors
/// Tensor fields fail with the gate's errors, text included. URL fields
/// reject tensor input with `TypeMismatch` and otherwise fail with the URL
/// pipeline's errors.
pub fn validate_field(
    input: impl Into<FieldInput>,
    field: &FieldType,
    config: &TypingConfig,
) -> Result<FieldValue> {
    let input = input.into();
    match (field, input) {
        (FieldType::Tensor(kind), FieldInput::Tensor(input)) => {
            Ok(FieldValue::Tensor(coerce(input, *kind)?))
        }
        (FieldType::Tensor(kind), FieldInput::Text(_)) => {
            let input = TensorInput::Unsupported {
                type_name: "String".to_string(),
            };
            Ok(FieldValue::Tensor(coerce(input, *kind)?))
        }
        (FieldType::Url(url), FieldInput::Tensor(input)) => Err(ValidationError::TypeMismatch {
            expected: url.name(),
            got: input.type_name(),
        }),
        (FieldType::Url(url), FieldInput::Text(text)) => {
            let cfg = &config.url;
            Ok(match url {
                UrlType::Image => FieldValue::ImageUrl(ImageUrl::validate_with(&text, cfg)?),
                UrlType::Audio => FieldValue::AudioUrl(AudioUrl::validate_with(&text, cfg)?),
                UrlType::Video => FieldValue::VideoUrl(VideoUrl::validate_with(&text, cfg)?),
                UrlType::Text => FieldValue::TextUrl(TextUrl::validate_with(&text, cfg)?),
            })
        }
    }
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Tensor(t) => FieldType::Tensor(t.kind()),
            FieldValue::ImageUrl(_) => FieldType::Url(UrlType::Image),
            FieldValue::AudioUrl(_) => FieldType::Url(UrlType::Audio),
            FieldValue::VideoUrl(_) => FieldType::Url(UrlType::Video),
            FieldValue::TextUrl(_) => FieldType::Url(UrlType::Text),
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            FieldValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// String form of a URL value.
    pub fn as_url_str(&self) -> Option<&str> {
        match self {
            FieldValue::Tensor(_) => None,
            FieldValue::ImageUrl(u) => Some(u.as_str()),
            FieldValue::AudioUrl(u) => Some(u.as_str()),
            FieldValue::VideoUrl(u) => Some(u.as_str()),
            FieldValue::TextUrl(u) => Some(u.as_str()),
        }
    }

    pub fn to_node_proto(&self) -> Result<NodeProto> {
        Ok(match self {
            FieldValue::Tensor(t) => t.to_node_proto()?,
            FieldValue::ImageUrl(u) => u.to_node_proto(),
            FieldValue::AudioUrl(u) => u.to_node_proto(),
            FieldValue::VideoUrl(u) => u.to_node_proto(),
            FieldValue::TextUrl(u) => u.to_node_proto(),
        })
    }

    /// Decode a node, dispatching on its `type` discriminator. URL text is
    /// validated again under `config`.
    pub fn from_node_proto(node: &NodeProto, config: &TypingConfig) -> Result<Self> {
        let field = registry::lookup(node.type_name())
            .ok_or_else(|| ValidationError::UnknownProtoType(node.type_name().to_string()))?;
        debug!(type_name = node.type_name(), %field, "dispatching node");

        let cfg = &config.url;
        Ok(match field {
            FieldType::Tensor(_) => FieldValue::Tensor(Tensor::from_node_proto(node)?),
            FieldType::Url(UrlType::Image) => {
                FieldValue::ImageUrl(ImageUrl::from_node_proto(node, cfg)?)
            }
            FieldType::Url(UrlType::Audio) => {
                FieldValue::AudioUrl(AudioUrl::from_node_proto(node, cfg)?)
            }
            FieldType::Url(UrlType::Video) => {
                FieldValue::VideoUrl(VideoUrl::from_node_proto(node, cfg)?)
            }
            FieldType::Url(UrlType::Text) => {
                FieldValue::TextUrl(TextUrl::from_node_proto(node, cfg)?)
            }
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_node_proto()?.to_bytes())
    }

    pub fn decode(bytes: &[u8], config: &TypingConfig) -> Result<Self> {
        let node = NodeProto::from_bytes(bytes)?;
        Self::from_node_proto(&node, config)
    }
}
