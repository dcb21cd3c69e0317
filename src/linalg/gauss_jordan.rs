//! Gauss-Jordan matrix inversion.
//!
//! The matrix is reduced to the identity by elementary row operations while the same operations
//! are applied to a companion matrix that starts as the identity. When the reduction finishes the
//! companion holds the inverse. Three passes are made:
//!  1. forward elimination to upper triangular form,
//!  2. scaling of each row so its diagonal is one,
//!  3. backward elimination of the entries above the diagonal.
//!
//! No rows are exchanged. A pivot that is numerically zero (see [`rcond::check_pivot`]) makes the
//! inversion fail with [`MatrixError::Singular`] even where a row permutation would succeed.

use log::trace;
use na::RealField;
use nalgebra as na;

use super::matrix::{Matrix, DEFAULT_ROUND_DECIMALS, DEFAULT_ROUND_EPSILON};
use super::rcond;
use crate::error::MatrixError;

/// Working matrix and its companion, both n x n row-major.
struct Augmented<N> {
    n: usize,
    work: Vec<N>,
    comp: Vec<N>,
    threshold: N,
}

impl<N: RealField + Copy> Augmented<N> {
    fn at(&self, i: usize, j: usize) -> N {
        self.work[i * self.n + j]
    }

    fn pivot(&self, row: usize) -> Result<N, MatrixError> {
        rcond::check_pivot(self.at(row, row), self.threshold, row)
    }

    /// row[dst] -= factor * row[src], on both matrices.
    fn subtract_row(&mut self, dst: usize, src: usize, factor: N) {
        let n = self.n;
        for k in 0..n {
            let w = self.work[src * n + k];
            self.work[dst * n + k] -= factor * w;
            let c = self.comp[src * n + k];
            self.comp[dst * n + k] -= factor * c;
        }
    }

    fn scale_row(&mut self, row: usize, factor: N) {
        let n = self.n;
        for k in row * n..(row + 1) * n {
            self.work[k] *= factor;
            self.comp[k] *= factor;
        }
    }

    /// Zero every entry below the diagonal, column by column.
    fn eliminate_forward(&mut self) -> Result<(), MatrixError> {
        for row in 1..self.n {
            let p = row - 1;
            for j in row..self.n {
                let entry = self.at(j, p);
                if !entry.is_zero() {
                    let pivot = self.pivot(p)?;
                    self.subtract_row(j, p, entry / pivot);
                }
            }
        }
        Ok(())
    }

    /// Divide each row by its diagonal entry. Returns the diagonal before scaling.
    fn scale_diagonal(&mut self) -> Result<Vec<N>, MatrixError> {
        let mut diagonal = Vec::with_capacity(self.n);
        for row in 0..self.n {
            let lead = self.pivot(row)?;
            diagonal.push(lead);
            if lead != N::one() {
                self.scale_row(row, N::one() / lead);
            }
        }
        Ok(diagonal)
    }

    /// Zero every entry above the unit diagonal, from the bottom row up.
    fn eliminate_backward(&mut self) {
        for row in (0..self.n.saturating_sub(1)).rev() {
            for j in (row + 1..self.n).rev() {
                let entry = self.at(row, j);
                if !entry.is_zero() {
                    self.subtract_row(row, j, entry);
                }
            }
        }
    }
}

impl<N: RealField + Copy> Matrix<N> {
    /// Inverse by Gauss-Jordan elimination.
    ///
    /// Fails with [`MatrixError::NotSquare`] unless square and [`MatrixError::Singular`] if a
    /// pivot is numerically zero. The result is not rounded; see [`Matrix::inverse_rounded`].
    pub fn inverse(&self) -> Result<Self, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                op: "inverse",
                shape: self.shape(),
            });
        }

        let threshold = rcond::pivot_threshold(self.max_abs());
        let comp = self.identity()?.into_parts().2;
        let (n, _, work) = self.clone().into_parts();
        let mut aug = Augmented {
            n,
            work,
            comp,
            threshold,
        };

        aug.eliminate_forward()?;
        let diagonal = aug.scale_diagonal()?;
        aug.eliminate_backward();
        trace!("inverse {}x{} rcond {}", n, n, rcond::rcond_diagonal(&diagonal));

        Ok(Matrix::from_parts(n, n, aug.comp))
    }

    /// Inverse followed by [`Matrix::epsilon_round`] with the default presentation constants.
    pub fn inverse_rounded(&self) -> Result<Self, MatrixError> {
        Ok(self
            .inverse()?
            .epsilon_round(DEFAULT_ROUND_DECIMALS, na::convert(DEFAULT_ROUND_EPSILON)))
    }
}
