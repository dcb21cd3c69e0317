//! Numerical comparison of pivots and reciprocal condition numbers.
//!
//! Used by the Gauss-Jordan inversion to decide when a pivot is numerically zero.

use na::RealField;
use nalgebra as na;

use crate::error::MatrixError;

/// Relative pivot limit. A pivot no larger than `PIVOT_LIMIT * scale` is treated as zero, where
/// `scale` is the largest absolute element of the matrix being inverted.
/// 1e3 * epsilon leaves roughly 12 decimal digits of headroom for f64.
pub const PIVOT_LIMIT: f64 = f64::EPSILON * 1e3;

/// Absolute pivot threshold for a matrix whose largest absolute element is `scale`.
pub fn pivot_threshold<N: RealField + Copy>(scale: N) -> N {
    scale * na::convert::<f64, N>(PIVOT_LIMIT)
}

/// Checks the pivot of `row` exceeds `threshold` in magnitude.
///
/// IEC 559 NaN values are never greater, so a NaN pivot is singular too.
pub fn check_pivot<N: RealField + Copy>(pivot: N, threshold: N, row: usize) -> Result<N, MatrixError> {
    if pivot.abs() > threshold {
        Ok(pivot)
    } else {
        Err(MatrixError::Singular { row })
    }
}

/// Estimate the reciprocal condition number of the diagonal `d` of a triangular factor.
///
/// Choose max |d| as the norm of the original matrix and min |d| as the norm of its inverse,
/// therefore rcond = min/max.
///
/// Note:
///  Defined to be 0 for an empty diagonal and for a zero or infinite max
///  Defined to be < 0 with any NaN element
///  By definition rcond <= 1 as min <= max
pub fn rcond_diagonal<N: RealField + Copy>(d: &[N]) -> N {
    let mut iter = d.iter().copied();
    let first = match iter.next() {
        Some(first) => first.abs(),
        None => return N::zero(),
    };

    let mut mind = first;
    let mut maxd = first;
    for v in iter.map(|v| v.abs()) {
        if v != v {
            // NaN
            return -N::one();
        }
        if v < mind {
            mind = v;
        }
        if v > maxd {
            maxd = v;
        }
    }
    if first != first {
        return -N::one();
    }

    let rcond = mind / maxd;
    if rcond != rcond {
        // NaN, singular due to (mind == maxd) == (zero or infinity)
        N::zero()
    } else {
        rcond
    }
}
