use prost::Message;

use crate::error::{ProtoError, Result};

/// Raw tensor payload: little-endian, row-major element bytes.
#[derive(Clone, PartialEq, Message)]
pub struct DenseNdArrayProto {
    #[prost(bytes = "vec", tag = "1")]
    pub buffer: Vec<u8>,
    #[prost(uint32, repeated, tag = "2")]
    pub shape: Vec<u32>,
    /// Element type name, e.g. "float32".
    #[prost(string, tag = "3")]
    pub dtype: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct NdArrayProto {
    #[prost(message, optional, tag = "1")]
    pub dense: Option<DenseNdArrayProto>,
}

/// A single typed field value.
///
/// `type` is the discriminator used to pick the decoder on the way back in,
/// e.g. "video_ndarray" or "image_url".
#[derive(Clone, PartialEq, Message)]
pub struct NodeProto {
    #[prost(oneof = "node_proto::Content", tags = "1, 2, 3")]
    pub content: Option<node_proto::Content>,
    #[prost(string, tag = "10")]
    pub r#type: String,
}

pub mod node_proto {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Content {
        #[prost(bytes, tag = "1")]
        Blob(Vec<u8>),
        #[prost(message, tag = "2")]
        Ndarray(super::NdArrayProto),
        #[prost(string, tag = "3")]
        Text(String),
    }
}

impl NodeProto {
    /// Build a node carrying a tensor payload.
    pub fn ndarray(array: NdArrayProto, type_name: impl Into<String>) -> Self {
        NodeProto {
            content: Some(node_proto::Content::Ndarray(array)),
            r#type: type_name.into(),
        }
    }

    /// Build a node carrying a text payload.
    pub fn text(text: impl Into<String>, type_name: impl Into<String>) -> Self {
        NodeProto {
            content: Some(node_proto::Content::Text(text.into())),
            r#type: type_name.into(),
        }
    }

    /// Returns the discriminator of this node.
    pub fn type_name(&self) -> &str {
        &self.r#type
    }

    /// Returns the tensor payload, or an error if the node holds something else.
    pub fn as_ndarray(&self) -> Result<&NdArrayProto> {
        match &self.content {
            Some(node_proto::Content::Ndarray(array)) => Ok(array),
            Some(_) => Err(ProtoError::UnexpectedContent {
                expected: "ndarray",
                type_name: self.r#type.clone(),
            }),
            None => Err(ProtoError::EmptyNode),
        }
    }

    /// Returns the text payload, or an error if the node holds something else.
    pub fn as_text(&self) -> Result<&str> {
        match &self.content {
            Some(node_proto::Content::Text(text)) => Ok(text.as_str()),
            Some(_) => Err(ProtoError::UnexpectedContent {
                expected: "text",
                type_name: self.r#type.clone(),
            }),
            None => Err(ProtoError::EmptyNode),
        }
    }

    /// Serialize to the binary wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Parse from the binary wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(NodeProto::decode(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node_wire() {
        let node = NodeProto::text("/data/clip.mp4", "video_url");
        let bytes = node.to_bytes();
        let back = NodeProto::from_bytes(&bytes).unwrap();
        assert_eq!(back.type_name(), "video_url");
        assert_eq!(back.as_text().unwrap(), "/data/clip.mp4");
        assert!(back.as_ndarray().is_err());
    }

    #[test]
    fn test_ndarray_node_wire() {
        let array = NdArrayProto {
            dense: Some(DenseNdArrayProto {
                buffer: vec![0, 0, 128, 63],
                shape: vec![1],
                dtype: "float32".to_string(),
            }),
        };
        let node = NodeProto::ndarray(array.clone(), "ndarray");
        let back = NodeProto::from_bytes(&node.to_bytes()).unwrap();
        assert_eq!(back.as_ndarray().unwrap(), &array);
        assert!(matches!(
            back.as_text(),
            Err(ProtoError::UnexpectedContent { expected: "text", .. })
        ));
    }

    #[test]
    fn test_empty_node() {
        let node = NodeProto::default();
        assert!(matches!(node.as_text(), Err(ProtoError::EmptyNode)));
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(NodeProto::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
