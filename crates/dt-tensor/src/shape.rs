use std::fmt;

use crate::error::{Result, TensorError};

/// Dimension sizes of a tensor, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Widen the `repeated uint32` shape of a wire message.
    pub fn from_wire(dims: &[u32]) -> Self {
        dims.iter().map(|&d| d as usize).collect()
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Element count; 1 for a 0-d shape.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Element count, or `None` if the product overflows `usize`.
    pub fn try_numel(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Size of axis `axis`, or `None` past the last axis.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Shape left after indexing the first axis: `[n, h, w]` gives `[h, w]`.
    pub fn row_shape(&self) -> Result<Shape> {
        match self.dims.split_first() {
            Some((_, rest)) => Ok(Shape::from(rest)),
            None => Err(TensorError::Unsized),
        }
    }

    /// Narrow to wire dimensions.
    ///
    /// # Errors
    /// `TensorError::MalformedProto` if an axis is longer than `u32::MAX`.
    pub fn to_wire(&self) -> Result<Vec<u32>> {
        let mut wire = Vec::with_capacity(self.dims.len());
        for &d in &self.dims {
            let d = u32::try_from(d).map_err(|_| {
                TensorError::MalformedProto(format!("axis of length {} exceeds u32", d))
            })?;
            wire.push(d);
        }
        Ok(wire)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "({})", dims.join(", "))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Shape::new(iter.into_iter().collect())
    }
}
