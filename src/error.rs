use thiserror::Error;

/// Every fallible operation in this crate returns this alias.
pub type ReactorResult<T> = Result<T, ReactorError>;

/// Tagged failure kinds surfaced to the caller. None are retried
/// internally; the engine never silently swallows a NaN or a shape
/// mismatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReactorError {
    #[error("invalid grid: {msg}")]
    InvalidGrid { msg: String },

    #[error("invalid stencil: {msg}")]
    InvalidStencil { msg: String },

    #[error("invalid geometry: {msg}")]
    InvalidGeometry { msg: String },

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("unknown option: {name}")]
    UnknownOption { name: String },

    #[error("charge imbalance: {imbalance} exceeds tolerance {tolerance}")]
    ChargeImbalance { imbalance: f64, tolerance: f64 },

    #[error("numeric overflow: {msg}")]
    NumericOverflow { msg: String },
}

impl ReactorError {
    pub(crate) fn invalid_grid(msg: impl Into<String>) -> Self {
        ReactorError::InvalidGrid { msg: msg.into() }
    }

    pub(crate) fn invalid_stencil(msg: impl Into<String>) -> Self {
        ReactorError::InvalidStencil { msg: msg.into() }
    }

    pub(crate) fn invalid_geometry(msg: impl Into<String>) -> Self {
        ReactorError::InvalidGeometry { msg: msg.into() }
    }

    pub(crate) fn shape_mismatch(expected: usize, got: usize) -> Self {
        ReactorError::ShapeMismatch { expected, got }
    }

    pub(crate) fn numeric_overflow(msg: impl Into<String>) -> Self {
        ReactorError::NumericOverflow { msg: msg.into() }
    }
}
