use std::fmt;

use dt_proto::{DenseNdArrayProto, NdArrayProto, NodeProto};
use serde_json::Value;

use crate::backend::ArrayBackend;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::kind::TensorKind;
use crate::shape::Shape;
use crate::storage::{self, CpuStorage};

/// A native array of backend `B`, tagged with the semantic kind it was
/// validated as.
///
/// The backend is fixed by the type: a wrapper never changes backend, and
/// re-tagging it with another kind keeps the same native value.
pub struct BackendTensor<B: ArrayBackend> {
    native: B::Native,
    kind: TensorKind,
}

impl<B: ArrayBackend> BackendTensor<B> {
    /// Wrap a native array that is already known to be acceptable for `kind`.
    pub fn from_native(native: B::Native, kind: TensorKind) -> Self {
        BackendTensor { native, kind }
    }

    /// Returns a reference to the native array.
    pub fn native(&self) -> &B::Native {
        &self.native
    }

    /// Unwrap into the native array.
    pub fn into_native(self) -> B::Native {
        self.native
    }

    pub fn kind(&self) -> TensorKind {
        self.kind
    }

    /// Re-tag with another kind, keeping the native value.
    pub(crate) fn with_kind(mut self, kind: TensorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Backend name, e.g. "ndarray".
    pub fn backend_name(&self) -> &'static str {
        B::NAME
    }

    pub fn shape(&self) -> Shape {
        Shape::new(B::shape(&self.native))
    }

    pub fn dtype(&self) -> DType {
        B::dtype(&self.native)
    }

    /// Wire discriminator, e.g. "video_ndarray".
    pub fn proto_type_name(&self) -> String {
        format!("{}{}", self.kind.proto_prefix(), B::TAG)
    }

    /// Length of the first axis.
    ///
    /// # Errors
    /// Returns `TensorError::Unsized` for 0-d tensors.
    pub fn len(&self) -> Result<usize> {
        B::shape(&self.native)
            .first()
            .copied()
            .ok_or(TensorError::Unsized)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The `index`-th slice along the first axis, as an untyped tensor of the
    /// same backend.
    pub fn get(&self, index: usize) -> Result<Self> {
        let row = B::row(&self.native, index)?;
        Ok(BackendTensor::from_native(row, TensorKind::Any))
    }

    /// Replace the `index`-th slice along the first axis.
    pub fn set(&mut self, index: usize, value: &Self) -> Result<()> {
        B::set_row(&mut self.native, index, &value.native)
    }

    /// Iterate over slices along the first axis.
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<Self>> + '_> {
        let len = self.len()?;
        Ok((0..len).map(move |i| self.get(i)))
    }

    /// Serialize to a tensor message.
    pub fn to_protobuf(&self) -> Result<NdArrayProto> {
        let storage = B::to_storage(&self.native)?;
        Ok(NdArrayProto {
            dense: Some(DenseNdArrayProto {
                buffer: storage.to_le_bytes(),
                shape: self.shape().to_wire()?,
                dtype: storage.dtype().wire_name().to_string(),
            }),
        })
    }

    /// Serialize to a node tagged with this tensor's discriminator.
    pub fn to_node_proto(&self) -> Result<NodeProto> {
        Ok(NodeProto::ndarray(self.to_protobuf()?, self.proto_type_name()))
    }

    /// Rebuild a tensor of this backend from a tensor message.
    pub fn from_protobuf(msg: &NdArrayProto, kind: TensorKind) -> Result<Self> {
        let dense = msg
            .dense
            .as_ref()
            .ok_or_else(|| TensorError::MalformedProto("missing dense payload".to_string()))?;
        let dtype = DType::from_wire(&dense.dtype)
            .ok_or_else(|| TensorError::UnsupportedDType(dense.dtype.clone()))?;
        let shape = Shape::from_wire(&dense.shape);
        let numel = shape.try_numel().ok_or_else(|| {
            TensorError::MalformedProto(format!("shape {} overflows the element count", shape))
        })?;
        let storage = CpuStorage::from_le_bytes(dtype, &dense.buffer)?;
        if storage.len() != numel {
            return Err(TensorError::MalformedProto(format!(
                "{} elements do not fill shape {}",
                storage.len(),
                shape
            )));
        }
        let native = B::from_storage(storage, shape)?;
        Ok(BackendTensor::from_native(native, kind))
    }

    /// Nested JSON lists mirroring the tensor's shape.
    pub fn to_json(&self) -> Result<Value> {
        let storage = B::to_storage(&self.native)?;
        Ok(storage::nest_json(
            &storage.to_json_values(),
            &B::shape(&self.native),
        ))
    }
}

impl<B: ArrayBackend> Clone for BackendTensor<B> {
    fn clone(&self) -> Self {
        BackendTensor {
            native: self.native.clone(),
            kind: self.kind,
        }
    }
}

impl<B: ArrayBackend> fmt::Debug for BackendTensor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendTensor")
            .field("backend", &B::NAME)
            .field("kind", &self.kind)
            .field("native", &self.native)
            .finish()
    }
}
