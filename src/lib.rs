//! One dimensional Kalman filtering from first principles.
//!
//! The crate carries its own small dense matrix layer, [`linalg::Matrix`], with the usual algebra,
//! transpose, identity and an exact Gauss-Jordan inverse. A discrete linear Kalman filter,
//! [`estimators::KalmanFilter`], is built on nothing but those matrix operations, so although the
//! motivating example is a single scalar state observed by a noisy voltmeter, any conformant
//! dimensions work.
//!
//! Each filter step predicts the state with a linear model and control input, then fuses one
//! measurement. Shape errors and singular innovation covariances are returned as
//! [`MatrixError`] values and leave the filter's estimate untouched.
//!
//! Measurement sources and the simulation loop in [`measurement`] and [`simulation`] drive the filter
//! in the demonstration program.
//!
//! # Licensing
//!
//! The source code is available under the conditions of the MIT license.

pub mod error;
pub mod estimators;
pub mod linalg;
pub mod measurement;
pub mod models;
pub mod noise;
pub mod simulation;

pub use error::{MatrixError, MeasurementError};
pub use estimators::{Innovation, KalmanFilter};
pub use linalg::Matrix;
