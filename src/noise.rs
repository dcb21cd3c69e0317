#![allow(non_snake_case)]

//! Bayesian estimation noise models.
//!
//! Linear additive noise models are represented as structs.

use na::RealField;
use nalgebra as na;

use crate::error::MatrixError;
use crate::linalg::Matrix;

/// Additive noise.
///
/// Noise represented as a the noise variance vector.
#[derive(PartialEq, Clone, Debug)]
pub struct UncorrelatedNoise<N: RealField + Copy = f64> {
    /// Noise variance, k x 1
    pub q: Matrix<N>,
}

/// Additive noise.
///
/// Noise represented as a the noise covariance matrix.
#[derive(PartialEq, Clone, Debug)]
pub struct CorrelatedNoise<N: RealField + Copy = f64> {
    /// Noise covariance, k x k
    pub Q: Matrix<N>,
}

impl<N: RealField + Copy> CorrelatedNoise<N> {
    /// Noise with covariance `Q`, which must be square.
    pub fn new(Q: Matrix<N>) -> Result<Self, MatrixError> {
        if !Q.is_square() {
            return Err(MatrixError::NotSquare {
                op: "noise",
                shape: Q.shape(),
            });
        }
        Ok(CorrelatedNoise { Q })
    }

    /// Creates a CorrelatedNoise from an UncorrelatedNoise.
    pub fn from_uncorrelated(uncorrelated: &UncorrelatedNoise<N>) -> Result<Self, MatrixError> {
        if uncorrelated.q.ncols() != 1 {
            return Err(MatrixError::dimension(
                "noise",
                format!("variance is {}x{}, expected a column", uncorrelated.q.nrows(), uncorrelated.q.ncols()),
            ));
        }
        Ok(CorrelatedNoise {
            Q: Matrix::from_diagonal(uncorrelated.q.as_slice())?,
        })
    }

    /// Noise dimension.
    pub fn dim(&self) -> usize {
        self.Q.nrows()
    }

    /// Checks Q is d x d.
    pub fn check(&self, op: &'static str, d: usize) -> Result<(), MatrixError> {
        if self.Q.shape() != (d, d) {
            return Err(MatrixError::mismatch(op, (d, d), self.Q.shape()));
        }
        Ok(())
    }
}
