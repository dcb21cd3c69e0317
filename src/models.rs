#![allow(non_snake_case)]

//! Bayesian estimation models.
//!
//! State representations and the linear prediction and observation models are structs.
//! Common estimation operations are defined as traits.

use na::RealField;
use nalgebra as na;

use crate::error::MatrixError;
use crate::linalg::Matrix;

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone, Debug)]
pub struct KalmanState<N: RealField + Copy = f64> {
    /// State vector, n x 1
    pub x: Matrix<N>,
    /// State covariance matrix, n x n
    pub X: Matrix<N>,
}

impl<N: RealField + Copy> KalmanState<N> {
    /// A state and covariance pair with conformant dimensions.
    pub fn new(x: Matrix<N>, X: Matrix<N>) -> Result<Self, MatrixError> {
        let state = KalmanState { x, X };
        state.check()?;
        Ok(state)
    }

    /// Zero state and covariance of dimension `n`. Fails if `n` is 0.
    pub fn new_zero(n: usize) -> Result<Self, MatrixError> {
        Ok(KalmanState {
            x: Matrix::zeros(n, 1)?,
            X: Matrix::zeros(n, n)?,
        })
    }

    /// State dimension.
    pub fn dim(&self) -> usize {
        self.x.nrows()
    }

    /// Checks x is a column and X is square of the same dimension.
    pub fn check(&self) -> Result<(), MatrixError> {
        let n = self.x.nrows();
        if self.x.ncols() != 1 {
            return Err(MatrixError::dimension(
                "state",
                format!("x is {}x{}, expected a column", n, self.x.ncols()),
            ));
        }
        if self.X.shape() != (n, n) {
            return Err(MatrixError::mismatch("state", (n, n), self.X.shape()));
        }
        Ok(())
    }
}

/// A state estimator.
pub trait Estimator<N: RealField + Copy> {
    /// The estimator's estimate of the system's state.
    fn state(&self) -> &Matrix<N>;
}

/// A Kalman filter (estimator).
///
/// The linear Kalman state representation x,X is used to represent the system.
pub trait KalmanEstimator<N: RealField + Copy>: Estimator<N> {
    /// Initialise the estimator with a KalmanState.
    fn init(&mut self, state: &KalmanState<N>) -> Result<(), MatrixError>;

    /// The estimator's estimate of the system's KalmanState.
    fn kalman_state(&self) -> KalmanState<N>;
}

/// Linear prediction model.
///
/// Prediction is represented by a state transition matrix and a control matrix:
/// x' = Fx.x + Fu.u
#[derive(PartialEq, Clone, Debug)]
pub struct LinearPredictModel<N: RealField + Copy = f64> {
    /// State transition matrix (A), n x n
    pub Fx: Matrix<N>,
    /// Control matrix (B), n x m
    pub Fu: Matrix<N>,
}

impl<N: RealField + Copy> LinearPredictModel<N> {
    /// Checks Fx is n x n and Fu has n rows.
    pub fn check(&self, n: usize) -> Result<(), MatrixError> {
        if self.Fx.shape() != (n, n) {
            return Err(MatrixError::mismatch("predict model", (n, n), self.Fx.shape()));
        }
        if self.Fu.nrows() != n {
            return Err(MatrixError::dimension(
                "predict model",
                format!("control matrix has {} rows, expected {}", self.Fu.nrows(), n),
            ));
        }
        Ok(())
    }
}

/// Linear observation model.
///
/// Observation is represented by an observation matrix: z = Hx.x
#[derive(PartialEq, Clone, Debug)]
pub struct LinearObserveModel<N: RealField + Copy = f64> {
    /// Observation matrix (H), k x n
    pub Hx: Matrix<N>,
}

impl<N: RealField + Copy> LinearObserveModel<N> {
    /// Observation dimension k.
    pub fn dim(&self) -> usize {
        self.Hx.nrows()
    }

    /// Checks Hx has n columns.
    pub fn check(&self, n: usize) -> Result<(), MatrixError> {
        if self.Hx.ncols() != n {
            return Err(MatrixError::dimension(
                "observe model",
                format!("observation matrix has {} columns, expected {}", self.Hx.ncols(), n),
            ));
        }
        Ok(())
    }
}
