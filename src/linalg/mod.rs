//! Small dense linear algebra.
//!
//! [`Matrix`] value type, its arithmetic and Gauss-Jordan inversion.

pub mod gauss_jordan;
pub mod matrix;
pub mod rcond;

pub use matrix::{Matrix, DEFAULT_ROUND_DECIMALS, DEFAULT_ROUND_EPSILON};
