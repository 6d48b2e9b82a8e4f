use std::ops::Range;

use candle_core::{DType as CandleDType, Device, Tensor};

use crate::backend::ArrayBackend;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// Backend over `candle_core::Tensor`.
///
/// Decoded tensors are placed on the CPU device.
#[derive(Debug, Clone, Copy)]
pub struct CandleBackend;

fn first_axis_len(native: &Tensor) -> Result<usize> {
    match native.dims().first() {
        Some(&len) => Ok(len),
        None => Err(TensorError::Unsized),
    }
}

impl ArrayBackend for CandleBackend {
    type Native = Tensor;

    const NAME: &'static str = "candle";
    const TAG: &'static str = "candle_tensor";
    const NATIVE_TYPE: &'static str = "candle_core::Tensor";

    fn shape(native: &Tensor) -> Vec<usize> {
        native.dims().to_vec()
    }

    fn dtype(native: &Tensor) -> DType {
        match native.dtype() {
            CandleDType::U8 => DType::U8,
            CandleDType::U32 => DType::U32,
            CandleDType::I64 => DType::I64,
            CandleDType::F16 => DType::F16,
            CandleDType::BF16 => DType::BF16,
            CandleDType::F32 => DType::F32,
            CandleDType::F64 => DType::F64,
        }
    }

    fn row(native: &Tensor, index: usize) -> Result<Tensor> {
        let len = first_axis_len(native)?;
        if index >= len {
            return Err(TensorError::IndexOutOfBounds { index, len });
        }
        Ok(native.get(index)?)
    }

    fn set_row(native: &mut Tensor, index: usize, value: &Tensor) -> Result<()> {
        let len = first_axis_len(native)?;
        if index >= len {
            return Err(TensorError::IndexOutOfBounds { index, len });
        }
        let dims = native.dims().to_vec();
        if value.dims() != &dims[1..] {
            return Err(TensorError::ShapeMismatch {
                expected: dims[1..].to_vec(),
                got: value.dims().to_vec(),
            });
        }
        // Candle tensors are immutable; swap in the assigned copy.
        let ranges: Vec<Range<usize>> = std::iter::once(index..index + 1)
            .chain(dims[1..].iter().map(|&d| 0..d))
            .collect();
        *native = native.slice_assign(&ranges, &value.unsqueeze(0)?)?;
        Ok(())
    }

    fn to_storage(native: &Tensor) -> Result<CpuStorage> {
        let flat = native.flatten_all()?;
        Ok(match native.dtype() {
            CandleDType::U8 => CpuStorage::U8(flat.to_vec1::<u8>()?),
            CandleDType::U32 => CpuStorage::U32(flat.to_vec1::<u32>()?),
            CandleDType::I64 => CpuStorage::I64(flat.to_vec1::<i64>()?),
            CandleDType::F16 => CpuStorage::F16(flat.to_vec1::<half::f16>()?),
            CandleDType::BF16 => CpuStorage::BF16(flat.to_vec1::<half::bf16>()?),
            CandleDType::F32 => CpuStorage::F32(flat.to_vec1::<f32>()?),
            CandleDType::F64 => CpuStorage::F64(flat.to_vec1::<f64>()?),
        })
    }

    fn from_storage(storage: CpuStorage, shape: Shape) -> Result<Tensor> {
        let dims = shape.dims();
        let device = Device::Cpu;
        Ok(match storage {
            CpuStorage::U8(v) => Tensor::from_vec(v, dims, &device)?,
            CpuStorage::U32(v) => Tensor::from_vec(v, dims, &device)?,
            CpuStorage::I64(v) => Tensor::from_vec(v, dims, &device)?,
            CpuStorage::F16(v) => Tensor::from_vec(v, dims, &device)?,
            CpuStorage::BF16(v) => Tensor::from_vec(v, dims, &device)?,
            CpuStorage::F32(v) => Tensor::from_vec(v, dims, &device)?,
            CpuStorage::F64(v) => Tensor::from_vec(v, dims, &device)?,
        })
    }
}
