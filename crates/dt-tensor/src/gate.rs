//! The coercion gate: turns whatever a tensor field receives into the
//! matching backend wrapper.
//!
//! Backends are tried in a fixed order, candle, then dense, then ndarray. Each
//! optional backend is only consulted when it is available in this process.

use ::ndarray::ArrayD;
use tracing::trace;

use crate::availability::{availability, BackendAvailability};
#[cfg(feature = "candle")]
use crate::tensor::CandleTensor;
#[cfg(feature = "dense")]
use crate::tensor::DenseTensor;
use crate::error::{Result, TensorError};
use crate::kind::TensorKind;
use crate::tensor::{NdArray, Tensor, TensorInput};

/// Native families named in the unsupported-input error, in priority order.
pub const EXPECTED_FAMILIES: [&str; 3] = ["candle_core::Tensor", "DenseArray", "ndarray::ArrayD<f32>"];

/// Coerce `input` into a tensor of `kind`.
///
/// # Errors
/// `TensorError::UnsupportedInputType` when no available backend accepts the
/// input, or the default backend's validation error (e.g.
/// `TensorError::InvalidShape`).
pub fn coerce(input: impl Into<TensorInput>, kind: TensorKind) -> Result<Tensor> {
    coerce_with(input.into(), kind, availability())
}

#[cfg_attr(
    not(any(feature = "candle", feature = "dense")),
    allow(unused_variables)
)]
pub(crate) fn coerce_with(
    input: TensorInput,
    kind: TensorKind,
    backends: &BackendAvailability,
) -> Result<Tensor> {
    #[cfg(feature = "candle")]
    let input = match input {
        TensorInput::Tensor(Tensor::Candle(t)) if backends.candle => {
            trace!(%kind, "passing candle tensor through");
            return Ok(Tensor::Candle(t.with_kind(kind)));
        }
        TensorInput::Candle(native) if backends.candle => {
            trace!(%kind, "wrapping native candle tensor");
            return Ok(Tensor::Candle(CandleTensor::from_native(native, kind)));
        }
        other => other,
    };

    #[cfg(feature = "dense")]
    let input = match input {
        TensorInput::Tensor(Tensor::Dense(t)) if backends.dense => {
            trace!(%kind, "passing dense tensor through");
            return Ok(Tensor::Dense(t.with_kind(kind)));
        }
        TensorInput::Dense(native) if backends.dense => {
            trace!(%kind, "wrapping native dense array");
            return Ok(Tensor::Dense(DenseTensor::from_native(native, kind)));
        }
        other => other,
    };

    match input {
        TensorInput::Tensor(Tensor::NdArray(t)) if t.kind() == kind => {
            trace!(%kind, "passing ndarray through");
            Ok(Tensor::NdArray(t))
        }
        TensorInput::Tensor(Tensor::NdArray(t)) => validate_ndarray(t.into_native(), kind),
        TensorInput::NdArray(native) => validate_ndarray(native, kind),
        other => {
            let got = other.type_name();
            trace!(%kind, got = %got, "rejecting unsupported tensor input");
            Err(TensorError::UnsupportedInputType {
                expected: EXPECTED_FAMILIES,
                got,
            })
        }
    }
}

/// The default backend's own validation: apply the kind's shape rule.
fn validate_ndarray(native: ArrayD<f32>, kind: TensorKind) -> Result<Tensor> {
    kind.check_shape(native.shape())?;
    trace!(%kind, shape = ?native.shape(), "wrapping ndarray");
    Ok(Tensor::NdArray(NdArray::from_native(native, kind)))
}
