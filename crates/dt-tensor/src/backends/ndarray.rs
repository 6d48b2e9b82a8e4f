use ::ndarray::{ArrayD, Axis, IxDyn};

use crate::backend::ArrayBackend;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// Default backend over `ndarray::ArrayD<f32>`.
#[derive(Debug, Clone, Copy)]
pub struct NdArrayBackend;

fn first_axis_len(native: &ArrayD<f32>) -> Result<usize> {
    if native.ndim() == 0 {
        return Err(TensorError::Unsized);
    }
    Ok(native.len_of(Axis(0)))
}

impl ArrayBackend for NdArrayBackend {
    type Native = ArrayD<f32>;

    const NAME: &'static str = "ndarray";
    const TAG: &'static str = "ndarray";
    const NATIVE_TYPE: &'static str = "ndarray::ArrayD<f32>";

    fn shape(native: &ArrayD<f32>) -> Vec<usize> {
        native.shape().to_vec()
    }

    fn dtype(_native: &ArrayD<f32>) -> DType {
        DType::F32
    }

    fn row(native: &ArrayD<f32>, index: usize) -> Result<ArrayD<f32>> {
        let len = first_axis_len(native)?;
        if index >= len {
            return Err(TensorError::IndexOutOfBounds { index, len });
        }
        Ok(native.index_axis(Axis(0), index).to_owned())
    }

    fn set_row(native: &mut ArrayD<f32>, index: usize, value: &ArrayD<f32>) -> Result<()> {
        let len = first_axis_len(native)?;
        if index >= len {
            return Err(TensorError::IndexOutOfBounds { index, len });
        }
        let mut row = native.index_axis_mut(Axis(0), index);
        if row.shape() != value.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: row.shape().to_vec(),
                got: value.shape().to_vec(),
            });
        }
        row.assign(value);
        Ok(())
    }

    fn to_storage(native: &ArrayD<f32>) -> Result<CpuStorage> {
        // `iter` walks in logical row-major order regardless of memory layout.
        Ok(CpuStorage::F32(native.iter().copied().collect()))
    }

    fn from_storage(storage: CpuStorage, shape: Shape) -> Result<ArrayD<f32>> {
        match storage {
            CpuStorage::F32(data) => ArrayD::from_shape_vec(IxDyn(shape.dims()), data)
                .map_err(|e| TensorError::Backend(e.to_string())),
            other => Err(TensorError::UnsupportedDType(format!(
                "the ndarray backend stores float32, got {}",
                other.dtype()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::ndarray::arr2;

    #[test]
    fn test_row_and_set_row() {
        let mut a = arr2(&[[1.0f32, 2.0], [3.0, 4.0]]).into_dyn();
        let r = NdArrayBackend::row(&a, 1).unwrap();
        assert_eq!(r.as_slice().unwrap(), &[3.0, 4.0]);

        let v = ArrayD::from_elem(IxDyn(&[2]), 7.0f32);
        NdArrayBackend::set_row(&mut a, 0, &v).unwrap();
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![7.0, 7.0, 3.0, 4.0]);

        let wrong = ArrayD::from_elem(IxDyn(&[3]), 0.0f32);
        assert!(NdArrayBackend::set_row(&mut a, 0, &wrong).is_err());
        assert!(NdArrayBackend::row(&a, 2).is_err());
    }

    #[test]
    fn test_storage_follows_logical_order() {
        let a = arr2(&[[1.0f32, 2.0], [3.0, 4.0]]).reversed_axes().into_dyn();
        let storage = NdArrayBackend::to_storage(&a).unwrap();
        assert_eq!(storage.as_f32_slice().unwrap(), &[1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_from_storage_rejects_other_dtypes() {
        let err = NdArrayBackend::from_storage(CpuStorage::F64(vec![1.0]), Shape::new(vec![1]))
            .unwrap_err();
        assert!(matches!(err, TensorError::UnsupportedDType(_)));
    }
}
