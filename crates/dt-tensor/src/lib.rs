//! `dt-tensor` - backend-polymorphic tensor field types.
//!
//! This crate provides:
//! - Semantic tensor kinds (`VideoTensor`, `ImageTensor`, ...) that validate
//!   raw values into a concrete backend wrapper
//! - An `ArrayBackend` trait with ndarray, dense (feature `dense`) and candle
//!   (feature `candle`) implementations
//! - A process-wide backend availability probe
//! - Protobuf and JSON export for every backend wrapper

pub mod availability;
pub mod backend;
pub mod backends;
pub mod dense;
pub mod dtype;
pub mod error;
pub mod gate;
pub mod kind;
pub mod shape;
pub mod storage;
pub mod tensor;
pub mod typed;
pub mod wrapper;

// Re-export primary types at the crate root for convenience.
pub use availability::{availability, BackendAvailability};
pub use backend::ArrayBackend;
pub use dense::DenseArray;
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use gate::coerce;
pub use kind::TensorKind;
pub use shape::Shape;
pub use storage::CpuStorage;
#[cfg(feature = "candle")]
pub use tensor::CandleTensor;
#[cfg(feature = "dense")]
pub use tensor::DenseTensor;
pub use tensor::{NdArray, Tensor, TensorInput};
pub use typed::{AnyTensor, AudioTensor, Embedding, ImageTensor, VideoTensor};
pub use wrapper::BackendTensor;
