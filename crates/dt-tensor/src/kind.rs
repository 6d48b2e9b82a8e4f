use std::fmt;

use crate::error::{Result, TensorError};

/// Semantic category a tensor field is declared with.
///
/// A kind has no storage of its own; it only fixes the shape rule applied by
/// the default backend and the prefix used in wire discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TensorKind {
    /// Any tensor, no shape constraint.
    #[default]
    Any,
    /// Frames x height x width x 3 channels.
    Video,
    /// Height x width, optionally with a channel axis.
    Image,
    /// Samples, optionally with a channel axis.
    Audio,
    /// A flat vector.
    Embedding,
}

impl TensorKind {
    pub const ALL: [TensorKind; 5] = [
        TensorKind::Any,
        TensorKind::Video,
        TensorKind::Image,
        TensorKind::Audio,
        TensorKind::Embedding,
    ];

    /// Prefix for wire discriminators, e.g. "video_" in "video_ndarray".
    pub fn proto_prefix(&self) -> &'static str {
        match self {
            TensorKind::Any => "",
            TensorKind::Video => "video_",
            TensorKind::Image => "image_",
            TensorKind::Audio => "audio_",
            TensorKind::Embedding => "embedding_",
        }
    }

    /// Split a discriminator such as "video_ndarray" into its kind and
    /// backend tag. The longest matching prefix wins, so "ndarray" alone maps
    /// to `Any`.
    pub fn split_proto_type(type_name: &str) -> (TensorKind, &str) {
        for kind in TensorKind::ALL.iter().skip(1) {
            if let Some(rest) = type_name.strip_prefix(kind.proto_prefix()) {
                return (*kind, rest);
            }
        }
        (TensorKind::Any, type_name)
    }

    /// Check a shape against this kind's rule.
    pub fn check_shape(&self, shape: &[usize]) -> Result<()> {
        let (ok, expected) = match self {
            TensorKind::Any => (true, ""),
            TensorKind::Video => (
                shape.len() == 4 && shape[3] == 3,
                "4 dimensions with the last dimension equal to 3",
            ),
            TensorKind::Image => (matches!(shape.len(), 2 | 3), "2 or 3 dimensions"),
            TensorKind::Audio => (matches!(shape.len(), 1 | 2), "1 or 2 dimensions"),
            TensorKind::Embedding => (shape.len() == 1, "1 dimension"),
        };
        if ok {
            Ok(())
        } else {
            Err(TensorError::InvalidShape {
                kind: *self,
                expected,
                got: shape.to_vec(),
            })
        }
    }
}

impl fmt::Display for TensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorKind::Any => write!(f, "AnyTensor"),
            TensorKind::Video => write!(f, "VideoTensor"),
            TensorKind::Image => write!(f, "ImageTensor"),
            TensorKind::Audio => write!(f, "AudioTensor"),
            TensorKind::Embedding => write!(f, "Embedding"),
        }
    }
}
