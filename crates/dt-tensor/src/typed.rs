//! Field-facing tensor types.
//!
//! Each of these is an uninhabited type: it only names a semantic kind and
//! offers `validate`, which always returns a concrete backend `Tensor`. A
//! value of the unspecialized kind cannot exist, so there is nothing to
//! index, iterate, or serialize on it.
//!
//! ```compile_fail
//! let video = dt_tensor::VideoTensor;
//! ```

use crate::error::Result;
use crate::gate::coerce;
use crate::kind::TensorKind;
use crate::tensor::{Tensor, TensorInput};

macro_rules! tensor_field_type {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {}

        impl $name {
            pub const KIND: TensorKind = $kind;

            /// Coerce `input` into a tensor of this kind.
            pub fn validate(input: impl Into<TensorInput>) -> Result<Tensor> {
                coerce(input, Self::KIND)
            }
        }
    };
}

tensor_field_type! {
    /// A tensor of any shape on any backend.
    AnyTensor => TensorKind::Any
}

tensor_field_type! {
    /// Video frames, shaped (frames, height, width, 3) on the ndarray backend.
    VideoTensor => TensorKind::Video
}

tensor_field_type! {
    /// An image, (height, width) or (height, width, channels).
    ImageTensor => TensorKind::Image
}

tensor_field_type! {
    /// Audio samples, (samples) or (channels, samples).
    AudioTensor => TensorKind::Audio
}

tensor_field_type! {
    /// A flat embedding vector.
    Embedding => TensorKind::Embedding
}
