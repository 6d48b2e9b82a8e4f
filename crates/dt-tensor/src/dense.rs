use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A dense, contiguous, row-major CPU array.
///
/// This is the native value of the `dense` backend: storage plus shape, with
/// the dtype carried by the storage variant.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray {
    storage: CpuStorage,
    shape: Shape,
}

impl DenseArray {
    /// Create a new array from storage and a shape.
    ///
    /// # Errors
    /// Returns an error if the element count does not match the shape.
    pub fn new(storage: CpuStorage, shape: Shape) -> Result<Self> {
        if shape.try_numel() != Some(storage.len()) {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: vec![storage.len()],
            });
        }
        Ok(DenseArray { storage, shape })
    }

    /// Create an f32 array from data and a shape.
    pub fn from_f32(data: Vec<f32>, shape: Shape) -> Result<Self> {
        DenseArray::new(CpuStorage::F32(data), shape)
    }

    /// Create a zero-filled array with the given dtype and shape.
    pub fn zeros(dtype: DType, shape: Shape) -> Self {
        DenseArray {
            storage: CpuStorage::zeros(dtype, shape.numel()),
            shape,
        }
    }

    /// Returns a reference to the array's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the array's data type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Returns the underlying storage reference.
    pub fn storage(&self) -> &CpuStorage {
        &self.storage
    }

    /// Reshape the array, keeping the same data.
    ///
    /// The total number of elements must remain the same.
    pub fn reshape(&self, new_shape: Shape) -> Result<DenseArray> {
        if self.shape.numel() != new_shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: new_shape.dims().to_vec(),
            });
        }
        Ok(DenseArray {
            storage: self.storage.clone(),
            shape: new_shape,
        })
    }

    /// Length of the first axis.
    pub fn len(&self) -> Result<usize> {
        self.shape.dim(0).ok_or(TensorError::Unsized)
    }

    /// Returns true if the first axis is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy out the `index`-th slice along the first axis.
    pub fn row(&self, index: usize) -> Result<DenseArray> {
        let len = self.len()?;
        if index >= len {
            return Err(TensorError::IndexOutOfBounds { index, len });
        }
        let row_shape = self.shape.row_shape()?;
        let stride = row_shape.numel();
        Ok(DenseArray {
            storage: self.storage.slice(index * stride, (index + 1) * stride),
            shape: row_shape,
        })
    }

    /// Overwrite the `index`-th slice along the first axis.
    pub fn set_row(&mut self, index: usize, value: &DenseArray) -> Result<()> {
        let len = self.len()?;
        if index >= len {
            return Err(TensorError::IndexOutOfBounds { index, len });
        }
        let row_shape = self.shape.row_shape()?;
        if value.shape != row_shape {
            return Err(TensorError::ShapeMismatch {
                expected: row_shape.dims().to_vec(),
                got: value.shape.dims().to_vec(),
            });
        }
        self.storage
            .write_at(index * row_shape.numel(), &value.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DenseArray {
        DenseArray::from_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::new(vec![3, 2])).unwrap()
    }

    #[test]
    fn test_new_array() {
        let a = sample();
        assert_eq!(a.shape().dims(), &[3, 2]);
        assert_eq!(a.dtype(), DType::F32);
        assert_eq!(a.len().unwrap(), 3);
    }

    #[test]
    fn test_new_shape_mismatch() {
        assert!(DenseArray::from_f32(vec![1.0, 2.0], Shape::new(vec![3])).is_err());
    }

    #[test]
    fn test_reshape() {
        let r = sample().reshape(Shape::new(vec![2, 3])).unwrap();
        assert_eq!(r.shape().dims(), &[2, 3]);
        assert!(sample().reshape(Shape::new(vec![4])).is_err());
    }

    #[test]
    fn test_row() {
        let a = sample();
        let r = a.row(1).unwrap();
        assert_eq!(r.shape().dims(), &[2]);
        assert_eq!(r.storage().as_f32_slice().unwrap(), &[3.0, 4.0]);
        assert!(matches!(
            a.row(3),
            Err(TensorError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_set_row() {
        let mut a = sample();
        let v = DenseArray::from_f32(vec![9.0, 8.0], Shape::new(vec![2])).unwrap();
        a.set_row(2, &v).unwrap();
        assert_eq!(
            a.storage().as_f32_slice().unwrap(),
            &[1.0, 2.0, 3.0, 4.0, 9.0, 8.0]
        );
        let wrong = DenseArray::from_f32(vec![1.0], Shape::new(vec![1])).unwrap();
        assert!(a.set_row(0, &wrong).is_err());
    }

    #[test]
    fn test_scalar_has_no_len() {
        let s = DenseArray::zeros(DType::U8, Shape::new(vec![]));
        assert!(matches!(s.len(), Err(TensorError::Unsized)));
    }
}
