use std::fmt::Debug;

use crate::dtype::DType;
use crate::error::Result;
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// Trait for array backends (ndarray, dense, candle).
///
/// A backend names one native array type and the handful of primitives the
/// wrapper needs: shape and dtype inspection, first-axis access, and
/// conversion to and from row-major CPU storage. Everything else (length,
/// iteration, protobuf, JSON) is built on top of these in `BackendTensor`.
pub trait ArrayBackend: Debug + 'static {
    /// The native array type owned by wrappers of this backend.
    type Native: Clone + Debug;

    /// Backend name, as used by `DT_DISABLED_BACKENDS`.
    const NAME: &'static str;

    /// Backend tag used in wire discriminators, e.g. "ndarray".
    const TAG: &'static str;

    /// Name of the native type, used in error messages.
    const NATIVE_TYPE: &'static str;

    /// Dimension sizes of `native`.
    fn shape(native: &Self::Native) -> Vec<usize>;

    /// Element type of `native`.
    fn dtype(native: &Self::Native) -> DType;

    /// Copy out the `index`-th slice along the first axis.
    fn row(native: &Self::Native, index: usize) -> Result<Self::Native>;

    /// Overwrite the `index`-th slice along the first axis with `value`.
    fn set_row(native: &mut Self::Native, index: usize, value: &Self::Native) -> Result<()>;

    /// Elements in row-major order.
    fn to_storage(native: &Self::Native) -> Result<CpuStorage>;

    /// Build a native array from row-major storage.
    ///
    /// `storage.len()` has already been checked against `shape.numel()`.
    fn from_storage(storage: CpuStorage, shape: Shape) -> Result<Self::Native>;
}
