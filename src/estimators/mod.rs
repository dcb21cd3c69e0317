//! Bayesian state estimators.

pub mod covariance;

pub use covariance::{Innovation, KalmanFilter};
