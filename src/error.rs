//! Error taxonomy of the matrix layer and the filter built on it.

use thiserror::Error;

/// Row and column count of a matrix.
pub type Shape = (usize, usize);

/// Failures of matrix construction, algebra and inversion.
///
/// Every failure is local and synchronous; the filter surfaces them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible for the requested operation.
    #[error("{op}: incompatible dimensions, {detail}")]
    Dimension {
        /// The operation that was refused.
        op: &'static str,
        /// What did not conform.
        detail: String,
    },

    /// Identity or inverse requested of a non-square matrix.
    #[error("{op}: matrix of shape {shape:?} is not square")]
    NotSquare {
        /// The operation that was refused.
        op: &'static str,
        /// Shape of the offending matrix.
        shape: Shape,
    },

    /// A pivot is numerically zero during Gauss-Jordan elimination.
    #[error("inverse: singular matrix, pivot of row {row} is numerically zero")]
    Singular {
        /// Row (0-based) whose diagonal pivot vanished.
        row: usize,
    },
}

impl MatrixError {
    pub(crate) fn dimension(op: &'static str, detail: impl Into<String>) -> Self {
        MatrixError::Dimension {
            op,
            detail: detail.into(),
        }
    }

    /// Shapes of two operands that do not match.
    pub(crate) fn mismatch(op: &'static str, lhs: Shape, rhs: Shape) -> Self {
        Self::dimension(
            op,
            format!("{}x{} and {}x{}", lhs.0, lhs.1, rhs.0, rhs.1),
        )
    }
}

/// Failures configuring a measurement source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementError {
    /// Noise standard deviation must be finite and non-negative.
    #[error("invalid measurement noise standard deviation {0}")]
    InvalidNoise(f64),

    /// A replayed source needs at least one recorded value.
    #[error("replay source has no recorded measurements")]
    EmptyReplay,
}
