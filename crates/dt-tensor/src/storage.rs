use half::{bf16, f16};
use serde_json::Value;

use crate::dtype::DType;
use crate::error::{Result, TensorError};

/// CPU-side tensor storage, one variant per wire dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuStorage {
    U8(Vec<u8>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    F16(Vec<f16>),
    BF16(Vec<bf16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Run the same expression against whichever vector a storage holds.
macro_rules! each_variant {
    ($storage:expr, $v:ident => $body:expr) => {
        match $storage {
            CpuStorage::U8($v) => $body,
            CpuStorage::U32($v) => $body,
            CpuStorage::I64($v) => $body,
            CpuStorage::F16($v) => $body,
            CpuStorage::BF16($v) => $body,
            CpuStorage::F32($v) => $body,
            CpuStorage::F64($v) => $body,
        }
    };
}

/// Same as `each_variant!`, but rebuilds a storage of the matching variant.
macro_rules! map_variant {
    ($storage:expr, $v:ident => $body:expr) => {
        match $storage {
            CpuStorage::U8($v) => CpuStorage::U8($body),
            CpuStorage::U32($v) => CpuStorage::U32($body),
            CpuStorage::I64($v) => CpuStorage::I64($body),
            CpuStorage::F16($v) => CpuStorage::F16($body),
            CpuStorage::BF16($v) => CpuStorage::BF16($body),
            CpuStorage::F32($v) => CpuStorage::F32($body),
            CpuStorage::F64($v) => CpuStorage::F64($body),
        }
    };
}

fn encode<T: Copy, const N: usize>(values: &[T], to_bytes: fn(T) -> [u8; N]) -> Vec<u8> {
    values.iter().flat_map(|&v| to_bytes(v)).collect()
}

fn decode<T, const N: usize>(bytes: &[u8], from_bytes: fn([u8; N]) -> T) -> Vec<T> {
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            from_bytes(buf)
        })
        .collect()
}

impl CpuStorage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        each_variant!(self, v => v.len())
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            CpuStorage::U8(_) => DType::U8,
            CpuStorage::U32(_) => DType::U32,
            CpuStorage::I64(_) => DType::I64,
            CpuStorage::F16(_) => DType::F16,
            CpuStorage::BF16(_) => DType::BF16,
            CpuStorage::F32(_) => DType::F32,
            CpuStorage::F64(_) => DType::F64,
        }
    }

    /// Create zero-filled storage for the given dtype and element count.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::U8 => CpuStorage::U8(vec![0; n]),
            DType::U32 => CpuStorage::U32(vec![0; n]),
            DType::I64 => CpuStorage::I64(vec![0; n]),
            DType::F16 => CpuStorage::F16(vec![f16::ZERO; n]),
            DType::BF16 => CpuStorage::BF16(vec![bf16::ZERO; n]),
            DType::F32 => CpuStorage::F32(vec![0.0; n]),
            DType::F64 => CpuStorage::F64(vec![0.0; n]),
        }
    }

    /// Returns the data as an f32 slice.
    ///
    /// # Errors
    /// Returns an error if the storage is not F32.
    pub fn as_f32_slice(&self) -> Result<&[f32]> {
        match self {
            CpuStorage::F32(v) => Ok(v.as_slice()),
            other => Err(TensorError::DTypeMismatch {
                expected: DType::F32.to_string(),
                got: other.dtype().to_string(),
            }),
        }
    }

    /// Copy out the elements in `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> CpuStorage {
        map_variant!(self, v => v[start..end].to_vec())
    }

    /// Overwrite the elements starting at `offset` with the contents of `src`.
    ///
    /// # Errors
    /// Returns an error if the dtypes differ or `src` does not fit.
    pub fn write_at(&mut self, offset: usize, src: &CpuStorage) -> Result<()> {
        if offset + src.len() > self.len() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![self.len() - offset.min(self.len())],
                got: vec![src.len()],
            });
        }
        let end = offset + src.len();
        match (self, src) {
            (CpuStorage::U8(d), CpuStorage::U8(s)) => d[offset..end].copy_from_slice(s),
            (CpuStorage::U32(d), CpuStorage::U32(s)) => d[offset..end].copy_from_slice(s),
            (CpuStorage::I64(d), CpuStorage::I64(s)) => d[offset..end].copy_from_slice(s),
            (CpuStorage::F16(d), CpuStorage::F16(s)) => d[offset..end].copy_from_slice(s),
            (CpuStorage::BF16(d), CpuStorage::BF16(s)) => d[offset..end].copy_from_slice(s),
            (CpuStorage::F32(d), CpuStorage::F32(s)) => d[offset..end].copy_from_slice(s),
            (CpuStorage::F64(d), CpuStorage::F64(s)) => d[offset..end].copy_from_slice(s),
            (dst, src) => {
                return Err(TensorError::DTypeMismatch {
                    expected: dst.dtype().to_string(),
                    got: src.dtype().to_string(),
                })
            }
        }
        Ok(())
    }

    /// Little-endian element bytes, in storage order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            CpuStorage::U8(v) => v.clone(),
            CpuStorage::U32(v) => encode(v, u32::to_le_bytes),
            CpuStorage::I64(v) => encode(v, i64::to_le_bytes),
            CpuStorage::F16(v) => encode(v, f16::to_le_bytes),
            CpuStorage::BF16(v) => encode(v, bf16::to_le_bytes),
            CpuStorage::F32(v) => encode(v, f32::to_le_bytes),
            CpuStorage::F64(v) => encode(v, f64::to_le_bytes),
        }
    }

    /// Rebuild storage from little-endian element bytes.
    ///
    /// # Errors
    /// Returns an error if `bytes` is not a whole number of elements.
    pub fn from_le_bytes(dtype: DType, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % dtype.size_in_bytes() != 0 {
            return Err(TensorError::MalformedProto(format!(
                "{} bytes is not a multiple of the {} element size",
                bytes.len(),
                dtype
            )));
        }
        Ok(match dtype {
            DType::U8 => CpuStorage::U8(bytes.to_vec()),
            DType::U32 => CpuStorage::U32(decode(bytes, u32::from_le_bytes)),
            DType::I64 => CpuStorage::I64(decode(bytes, i64::from_le_bytes)),
            DType::F16 => CpuStorage::F16(decode(bytes, f16::from_le_bytes)),
            DType::BF16 => CpuStorage::BF16(decode(bytes, bf16::from_le_bytes)),
            DType::F32 => CpuStorage::F32(decode(bytes, f32::from_le_bytes)),
            DType::F64 => CpuStorage::F64(decode(bytes, f64::from_le_bytes)),
        })
    }

    /// Elements as JSON numbers. Non-finite floats become `null`.
    pub fn to_json_values(&self) -> Vec<Value> {
        match self {
            CpuStorage::U8(v) => v.iter().map(|&x| Value::from(x)).collect(),
            CpuStorage::U32(v) => v.iter().map(|&x| Value::from(x)).collect(),
            CpuStorage::I64(v) => v.iter().map(|&x| Value::from(x)).collect(),
            CpuStorage::F16(v) => v.iter().map(|x| Value::from(x.to_f64())).collect(),
            CpuStorage::BF16(v) => v.iter().map(|x| Value::from(x.to_f64())).collect(),
            CpuStorage::F32(v) => v.iter().map(|&x| Value::from(x as f64)).collect(),
            CpuStorage::F64(v) => v.iter().map(|&x| Value::from(x)).collect(),
        }
    }
}

impl From<Vec<f32>> for CpuStorage {
    fn from(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }
}

impl From<Vec<f64>> for CpuStorage {
    fn from(data: Vec<f64>) -> Self {
        CpuStorage::F64(data)
    }
}

impl From<Vec<u8>> for CpuStorage {
    fn from(data: Vec<u8>) -> Self {
        CpuStorage::U8(data)
    }
}

impl From<Vec<i64>> for CpuStorage {
    fn from(data: Vec<i64>) -> Self {
        CpuStorage::I64(data)
    }
}

/// Fold a flat row-major list of values into nested JSON arrays.
pub(crate) fn nest_json(values: &[Value], dims: &[usize]) -> Value {
    match dims.split_first() {
        None => values.first().cloned().unwrap_or(Value::Null),
        Some((_, [])) => Value::Array(values.to_vec()),
        Some((_, rest)) => {
            let row: usize = rest.iter().product();
            if row == 0 {
                return Value::Array(
                    (0..dims[0])
                        .map(|_| nest_json(&[], rest))
                        .collect(),
                );
            }
            Value::Array(
                values
                    .chunks(row)
                    .map(|chunk| nest_json(chunk, rest))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_f32_vec() {
        let s = CpuStorage::from(vec![1.0f32, 2.0, 3.0]);
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.dtype(), DType::F32);
        assert_eq!(s.as_f32_slice().unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zeros() {
        let s = CpuStorage::zeros(DType::I64, 5);
        assert_eq!(s, CpuStorage::I64(vec![0; 5]));
        assert!(CpuStorage::zeros(DType::F16, 2).as_f32_slice().is_err());
    }

    #[test]
    fn test_le_bytes_f32() {
        let s = CpuStorage::from(vec![1.0f32, -2.5]);
        let bytes = s.to_le_bytes();
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(CpuStorage::from_le_bytes(DType::F32, &bytes).unwrap(), s);
    }

    #[test]
    fn test_le_bytes_f16_preserves_bits() {
        let s = CpuStorage::F16(vec![f16::from_f32(0.1), f16::NAN, f16::NEG_INFINITY]);
        let back = CpuStorage::from_le_bytes(DType::F16, &s.to_le_bytes()).unwrap();
        match (&s, &back) {
            (CpuStorage::F16(a), CpuStorage::F16(b)) => {
                let a: Vec<u16> = a.iter().map(|x| x.to_bits()).collect();
                let b: Vec<u16> = b.iter().map(|x| x.to_bits()).collect();
                assert_eq!(a, b);
            }
            _ => panic!("dtype changed"),
        }
    }

    #[test]
    fn test_from_le_bytes_truncated() {
        assert!(CpuStorage::from_le_bytes(DType::F64, &[0u8; 12]).is_err());
    }

    #[test]
    fn test_slice_and_write() {
        let mut s = CpuStorage::from(vec![0i64, 1, 2, 3, 4, 5]);
        assert_eq!(s.slice(2, 4), CpuStorage::I64(vec![2, 3]));
        s.write_at(4, &CpuStorage::I64(vec![40, 50])).unwrap();
        assert_eq!(s, CpuStorage::I64(vec![0, 1, 2, 3, 40, 50]));
        assert!(s.write_at(5, &CpuStorage::I64(vec![1, 2])).is_err());
        assert!(s.write_at(0, &CpuStorage::F32(vec![1.0])).is_err());
    }

    #[test]
    fn test_json_values() {
        let s = CpuStorage::BF16(vec![bf16::from_f32(1.5)]);
        let v = s.to_json_values();
        assert_relative_eq!(v[0].as_f64().unwrap(), 1.5);
        let s = CpuStorage::F32(vec![f32::NAN]);
        assert!(s.to_json_values()[0].is_null());
    }

    #[test]
    fn test_nest_json() {
        let values: Vec<Value> = (0..6).map(Value::from).collect();
        assert_eq!(
            nest_json(&values, &[2, 3]),
            serde_json::json!([[0, 1, 2], [3, 4, 5]])
        );
        assert_eq!(nest_json(&values[..1], &[]), serde_json::json!(0));
        assert_eq!(nest_json(&[], &[2, 0]), serde_json::json!([[], []]));
    }
}
