#![allow(non_snake_case)]

//! Covariance state estimation.
//!
//! A discrete Kalman filter that uses a Kalman state representation [`KalmanState`] of the system.
//! The Kalman state is simply the x,X pair, the dimensions of both are the dimensions of the system.
//!
//! Every step predicts with the linear model and then observes one measurement:
//! ```text
//! x' = A.x + B.u
//! X' = A.X.A' + Q
//! y  = z - H.x'
//! S  = H.X'.H' + R
//! K  = X'.H'.inv(S)
//! x  = x' + K.y
//! X  = (I - K.H).X'
//! ```
//! All of it is computed with [`Matrix`] operations so any conformant dimensions work.
//! The state is committed only once every sub computation has succeeded.
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use log::{debug, warn};
use na::RealField;
use nalgebra as na;

use crate::error::MatrixError;
use crate::linalg::Matrix;
use crate::models::{Estimator, KalmanEstimator, KalmanState, LinearObserveModel, LinearPredictModel};
use crate::noise::CorrelatedNoise;

/// Intermediate results of a committed step.
#[derive(PartialEq, Clone, Debug)]
pub struct Innovation<N: RealField + Copy = f64> {
    /// Innovation, z - H.x', k x 1
    pub y: Matrix<N>,
    /// Innovation covariance, k x k
    pub S: Matrix<N>,
    /// Kalman gain, n x k
    pub K: Matrix<N>,
}

/// Linear Kalman filter.
///
/// Not synchronised; a filter must be stepped by one owner at a time.
#[derive(Clone, Debug)]
pub struct KalmanFilter<N: RealField + Copy = f64> {
    predict: LinearPredictModel<N>,
    process_noise: CorrelatedNoise<N>,
    observe: LinearObserveModel<N>,
    observe_noise: CorrelatedNoise<N>,
    state: KalmanState<N>,
}

impl<N: RealField + Copy> KalmanFilter<N> {
    /// Constructs a filter from its models and initial state.
    ///
    /// Fails with [`MatrixError::Dimension`] unless A is n x n, B has n rows, H has n columns,
    /// R matches H's row count, Q is n x n, x is n x 1 and X is n x n.
    pub fn new(
        predict: LinearPredictModel<N>,
        process_noise: CorrelatedNoise<N>,
        observe: LinearObserveModel<N>,
        observe_noise: CorrelatedNoise<N>,
        state: KalmanState<N>,
    ) -> Result<Self, MatrixError> {
        state.check()?;
        let n = state.dim();
        predict.check(n)?;
        process_noise.check("process noise", n)?;
        observe.check(n)?;
        observe_noise.check("observe noise", observe.dim())?;

        Ok(KalmanFilter {
            predict,
            process_noise,
            observe,
            observe_noise,
            state,
        })
    }

    /// Constructs a filter from the seven model matrices.
    pub fn from_matrices(
        A: Matrix<N>,
        B: Matrix<N>,
        H: Matrix<N>,
        R: Matrix<N>,
        Q: Matrix<N>,
        x: Matrix<N>,
        X: Matrix<N>,
    ) -> Result<Self, MatrixError> {
        Self::new(
            LinearPredictModel { Fx: A, Fu: B },
            CorrelatedNoise { Q },
            LinearObserveModel { Hx: H },
            CorrelatedNoise { Q: R },
            KalmanState { x, X },
        )
    }

    /// Current state covariance X.
    pub fn covariance(&self) -> &Matrix<N> {
        &self.state.X
    }

    pub fn predict_model(&self) -> &LinearPredictModel<N> {
        &self.predict
    }

    pub fn observe_model(&self) -> &LinearObserveModel<N> {
        &self.observe
    }

    /// Predict and observe a scalar measurement `z` with control input `u`.
    ///
    /// Requires a single row observation model.
    pub fn step(&mut self, z: N, u: &Matrix<N>) -> Result<Innovation<N>, MatrixError> {
        if self.observe.dim() != 1 {
            return Err(MatrixError::dimension(
                "step",
                format!("scalar measurement with a {} row observation model", self.observe.dim()),
            ));
        }
        self.step_vector(&Matrix::scalar(z), u)
    }

    /// Predict and observe a k x 1 measurement `z` with control input `u`.
    ///
    /// On error the state is left unchanged.
    pub fn step_vector(&mut self, z: &Matrix<N>, u: &Matrix<N>) -> Result<Innovation<N>, MatrixError> {
        let A = &self.predict.Fx;
        let H = &self.observe.Hx;
        let x = &self.state.x;
        let X = &self.state.X;

        // Predict
        let x_pred = A.mul_matrix(x)?.add(&self.predict.Fu.mul_matrix(u)?)?;
        let X_pred = A.mul_matrix(X)?.mul_matrix(&A.transpose())?.add(&self.process_noise.Q)?;

        // Observe
        let y = z.sub(&H.mul_matrix(&x_pred)?)?;
        let XHt = X_pred.mul_matrix(&H.transpose())?;
        let S = H.mul_matrix(&XHt)?.add(&self.observe_noise.Q)?;
        let SI = S.inverse().map_err(|e| {
            warn!("step rejected, innovation covariance {} is singular", S);
            e
        })?;
        let K = XHt.mul_matrix(&SI)?;

        // Update
        let x_new = x_pred.add(&K.mul_matrix(&y)?)?;
        let X_new = X_pred.identity()?.sub(&K.mul_matrix(H)?)?.mul_matrix(&X_pred)?;

        debug!("step z {} innovation {} gain {} state {}", z, y, K, x_new);
        self.state = KalmanState { x: x_new, X: X_new };

        Ok(Innovation { y, S, K })
    }
}

impl<N: RealField + Copy> Estimator<N> for KalmanFilter<N> {
    fn state(&self) -> &Matrix<N> {
        &self.state.x
    }
}

impl<N: RealField + Copy> KalmanEstimator<N> for KalmanFilter<N> {
    fn init(&mut self, state: &KalmanState<N>) -> Result<(), MatrixError> {
        state.check()?;
        if state.dim() != self.state.dim() {
            return Err(MatrixError::mismatch(
                "init",
                self.state.x.shape(),
                state.x.shape(),
            ));
        }
        self.state = state.clone();
        Ok(())
    }

    fn kalman_state(&self) -> KalmanState<N> {
        self.state.clone()
    }
}
