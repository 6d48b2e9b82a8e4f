use crate::backend::ArrayBackend;
use crate::dense::DenseArray;
use crate::dtype::DType;
use crate::error::Result;
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// Backend over the in-crate `DenseArray`.
#[derive(Debug, Clone, Copy)]
pub struct DenseBackend;

impl ArrayBackend for DenseBackend {
    type Native = DenseArray;

    const NAME: &'static str = "dense";
    const TAG: &'static str = "dense_tensor";
    const NATIVE_TYPE: &'static str = "DenseArray";

    fn shape(native: &DenseArray) -> Vec<usize> {
        native.shape().dims().to_vec()
    }

    fn dtype(native: &DenseArray) -> DType {
        native.dtype()
    }

    fn row(native: &DenseArray, index: usize) -> Result<DenseArray> {
        native.row(index)
    }

    fn set_row(native: &mut DenseArray, index: usize, value: &DenseArray) -> Result<()> {
        native.set_row(index, value)
    }

    fn to_storage(native: &DenseArray) -> Result<CpuStorage> {
        Ok(native.storage().clone())
    }

    fn from_storage(storage: CpuStorage, shape: Shape) -> Result<DenseArray> {
        DenseArray::new(storage, shape)
    }
}
