#[cfg(feature = "candle")]
pub mod candle;
#[cfg(feature = "dense")]
pub mod dense;
pub mod ndarray;

#[cfg(feature = "candle")]
pub use self::candle::CandleBackend;
#[cfg(feature = "dense")]
pub use self::dense::DenseBackend;
pub use self::ndarray::NdArrayBackend;
