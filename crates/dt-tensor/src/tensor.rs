use ::ndarray::ArrayD;
use dt_proto::{NdArrayProto, NodeProto};
use serde_json::Value;

#[cfg(feature = "candle")]
use crate::backends::CandleBackend;
#[cfg(feature = "dense")]
use crate::backends::DenseBackend;
use crate::backend::ArrayBackend;
use crate::backends::NdArrayBackend;
#[cfg(feature = "dense")]
use crate::dense::DenseArray;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::kind::TensorKind;
use crate::shape::Shape;
use crate::wrapper::BackendTensor;

/// Wrapper over `ndarray::ArrayD<f32>`.
pub type NdArray = BackendTensor<NdArrayBackend>;
/// Wrapper over `DenseArray`.
#[cfg(feature = "dense")]
pub type DenseTensor = BackendTensor<DenseBackend>;
/// Wrapper over `candle_core::Tensor`.
#[cfg(feature = "candle")]
pub type CandleTensor = BackendTensor<CandleBackend>;

/// A validated tensor field value.
///
/// Always one concrete backend wrapper; the semantic kind is carried by the
/// wrapper. There is no variant for an unspecialized tensor.
#[derive(Debug, Clone)]
pub enum Tensor {
    #[cfg(feature = "candle")]
    Candle(CandleTensor),
    #[cfg(feature = "dense")]
    Dense(DenseTensor),
    NdArray(NdArray),
}

/// Forward a method call to whichever wrapper a `Tensor` holds.
macro_rules! dispatch {
    ($tensor:expr, $t:ident => $body:expr) => {
        match $tensor {
            #[cfg(feature = "candle")]
            Tensor::Candle($t) => $body,
            #[cfg(feature = "dense")]
            Tensor::Dense($t) => $body,
            Tensor::NdArray($t) => $body,
        }
    };
}

impl Tensor {
    pub fn kind(&self) -> TensorKind {
        dispatch!(self, t => t.kind())
    }

    /// Backend name, e.g. "ndarray".
    pub fn backend_name(&self) -> &'static str {
        dispatch!(self, t => t.backend_name())
    }

    pub fn shape(&self) -> Shape {
        dispatch!(self, t => t.shape())
    }

    pub fn dtype(&self) -> DType {
        dispatch!(self, t => t.dtype())
    }

    /// Length of the first axis.
    pub fn len(&self) -> Result<usize> {
        dispatch!(self, t => t.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        dispatch!(self, t => t.is_empty())
    }

    /// The `index`-th slice along the first axis.
    pub fn get(&self, index: usize) -> Result<Tensor> {
        Ok(match self {
            #[cfg(feature = "candle")]
            Tensor::Candle(t) => Tensor::Candle(t.get(index)?),
            #[cfg(feature = "dense")]
            Tensor::Dense(t) => Tensor::Dense(t.get(index)?),
            Tensor::NdArray(t) => Tensor::NdArray(t.get(index)?),
        })
    }

    /// Replace the `index`-th slice along the first axis.
    ///
    /// # Errors
    /// `value` must live on the same backend as `self`.
    pub fn set(&mut self, index: usize, value: &Tensor) -> Result<()> {
        match (self, value) {
            #[cfg(feature = "candle")]
            (Tensor::Candle(t), Tensor::Candle(v)) => t.set(index, v),
            #[cfg(feature = "dense")]
            (Tensor::Dense(t), Tensor::Dense(v)) => t.set(index, v),
            (Tensor::NdArray(t), Tensor::NdArray(v)) => t.set(index, v),
            #[allow(unreachable_patterns)]
            (t, v) => Err(TensorError::Backend(format!(
                "cannot assign a {} tensor into a {} tensor",
                v.backend_name(),
                t.backend_name()
            ))),
        }
    }

    /// Wire discriminator, e.g. "video_ndarray".
    pub fn proto_type_name(&self) -> String {
        dispatch!(self, t => t.proto_type_name())
    }

    pub fn to_protobuf(&self) -> Result<NdArrayProto> {
        dispatch!(self, t => t.to_protobuf())
    }

    pub fn to_node_proto(&self) -> Result<NodeProto> {
        dispatch!(self, t => t.to_node_proto())
    }

    /// Rebuild a tensor from a node, picking backend and kind from its
    /// discriminator. Ndarray nodes must satisfy the kind's shape rule.
    pub fn from_node_proto(node: &NodeProto) -> Result<Tensor> {
        let (kind, tag) = TensorKind::split_proto_type(node.type_name());
        let msg = node.as_ndarray()?;
        tracing::debug!(type_name = node.type_name(), %kind, "decoding tensor node");

        #[cfg(feature = "candle")]
        if tag == CandleBackend::TAG {
            return Ok(Tensor::Candle(CandleTensor::from_protobuf(msg, kind)?));
        }
        #[cfg(feature = "dense")]
        if tag == DenseBackend::TAG {
            return Ok(Tensor::Dense(DenseTensor::from_protobuf(msg, kind)?));
        }
        if tag == NdArrayBackend::TAG {
            // same rule the default backend applies when coercing
            let tensor = NdArray::from_protobuf(msg, kind)?;
            kind.check_shape(tensor.native().shape())?;
            return Ok(Tensor::NdArray(tensor));
        }
        Err(TensorError::UnknownProtoType(node.type_name().to_string()))
    }

    /// Whether `tag` names a backend compiled into this build.
    pub fn is_backend_tag(tag: &str) -> bool {
        #[cfg(feature = "candle")]
        if tag == CandleBackend::TAG {
            return true;
        }
        #[cfg(feature = "dense")]
        if tag == DenseBackend::TAG {
            return true;
        }
        tag == NdArrayBackend::TAG
    }

    /// Nested JSON lists mirroring the tensor's shape.
    pub fn to_json(&self) -> Result<Value> {
        dispatch!(self, t => t.to_json())
    }

    pub fn as_ndarray(&self) -> Option<&NdArray> {
        match self {
            Tensor::NdArray(t) => Some(t),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    #[cfg(feature = "dense")]
    pub fn as_dense(&self) -> Option<&DenseTensor> {
        match self {
            Tensor::Dense(t) => Some(t),
            _ => None,
        }
    }

    #[cfg(feature = "candle")]
    pub fn as_candle(&self) -> Option<&CandleTensor> {
        match self {
            Tensor::Candle(t) => Some(t),
            _ => None,
        }
    }
}

/// A raw value offered to a tensor field.
///
/// Covers every wrapper and native array the compiled-in backends know, plus
/// a catch-all for anything else, which only records its type name.
#[derive(Debug, Clone)]
pub enum TensorInput {
    /// An already-wrapped tensor of any backend and kind.
    Tensor(Tensor),
    #[cfg(feature = "candle")]
    Candle(candle_core::Tensor),
    #[cfg(feature = "dense")]
    Dense(DenseArray),
    NdArray(ArrayD<f32>),
    Unsupported { type_name: String },
}

impl TensorInput {
    /// Describe a value of a type no backend accepts.
    pub fn unsupported<T: ?Sized>(_value: &T) -> Self {
        TensorInput::Unsupported {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// Name of the input's runtime type, for error messages.
    pub fn type_name(&self) -> String {
        match self {
            TensorInput::Tensor(t) => format!("{}<{}>", t.kind(), t.backend_name()),
            #[cfg(feature = "candle")]
            TensorInput::Candle(_) => CandleBackend::NATIVE_TYPE.to_string(),
            #[cfg(feature = "dense")]
            TensorInput::Dense(_) => DenseBackend::NATIVE_TYPE.to_string(),
            TensorInput::NdArray(_) => NdArrayBackend::NATIVE_TYPE.to_string(),
            TensorInput::Unsupported { type_name } => type_name.clone(),
        }
    }
}

impl From<Tensor> for TensorInput {
    fn from(tensor: Tensor) -> Self {
        TensorInput::Tensor(tensor)
    }
}

impl From<NdArray> for TensorInput {
    fn from(tensor: NdArray) -> Self {
        TensorInput::Tensor(Tensor::NdArray(tensor))
    }
}

impl From<ArrayD<f32>> for TensorInput {
    fn from(array: ArrayD<f32>) -> Self {
        TensorInput::NdArray(array)
    }
}

#[cfg(feature = "dense")]
impl From<DenseTensor> for TensorInput {
    fn from(tensor: DenseTensor) -> Self {
        TensorInput::Tensor(Tensor::Dense(tensor))
    }
}

#[cfg(feature = "dense")]
impl From<DenseArray> for TensorInput {
    fn from(array: DenseArray) -> Self {
        TensorInput::Dense(array)
    }
}

#[cfg(feature = "candle")]
impl From<CandleTensor> for TensorInput {
    fn from(tensor: CandleTensor) -> Self {
        TensorInput::Tensor(Tensor::Candle(tensor))
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Tensor> for TensorInput {
    fn from(tensor: candle_core::Tensor) -> Self {
        TensorInput::Candle(tensor)
    }
}
