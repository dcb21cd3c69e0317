//! Dense matrix value type.
//!
//! A [`Matrix`] is an immutable row-major block of `rows x cols` scalars. Every operation returns a
//! new matrix; nothing mutates the receiver. Shape errors are reported as [`MatrixError`] values
//! rather than panics, so a misconfigured model surfaces at the call that misused it.
//!
//! Scalar and matrix products are separate operations: [`Matrix::mul_scalar`] and
//! [`Matrix::mul_matrix`].

use std::fmt;
use std::ops::{Add, Index, Mul, Sub};

use approx::{AbsDiffEq, RelativeEq};
use na::{DMatrix, RealField};
use nalgebra as na;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Shape};

/// Decimal places kept by [`Matrix::epsilon_round`] in the presentation defaults.
pub const DEFAULT_ROUND_DECIMALS: u32 = 5;
/// Offset subtracted before rounding, smaller than the kept decimals.
pub const DEFAULT_ROUND_EPSILON: f64 = 1e-7;

/// Dense matrix of `N` stored in row-major order.
///
/// Invariant: `rows >= 1`, `cols >= 1` and `data.len() == rows * cols`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<N>>",
    into = "Vec<Vec<N>>",
    bound(serialize = "N: Serialize", deserialize = "N: Deserialize<'de>")
)]
pub struct Matrix<N: RealField + Copy = f64> {
    rows: usize,
    cols: usize,
    data: Vec<N>,
}

impl<N: RealField + Copy> Matrix<N> {
    /// Constructs a matrix from a rectangular sequence of rows.
    ///
    /// The column count is the length of the first row. Fails if there are no rows, the rows are
    /// empty or they differ in length.
    pub fn new(rows: Vec<Vec<N>>) -> Result<Self, MatrixError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if nrows == 0 || ncols == 0 {
            return Err(MatrixError::dimension(
                "new",
                format!("a {}x{} matrix has no elements", nrows, ncols),
            ));
        }

        let mut data = Vec::with_capacity(nrows * ncols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(MatrixError::dimension(
                    "new",
                    format!("row {} has {} columns, expected {}", i, row.len(), ncols),
                ));
            }
            data.extend(row);
        }

        Ok(Matrix {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Constructs a `rows x cols` matrix from row-major elements.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[N]) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(MatrixError::dimension(
                "from_row_slice",
                format!("{} elements cannot fill a {}x{} matrix", data.len(), rows, cols),
            ));
        }
        Ok(Matrix {
            rows,
            cols,
            data: data.to_vec(),
        })
    }

    /// A 1x1 matrix holding `value`.
    pub fn scalar(value: N) -> Self {
        Matrix {
            rows: 1,
            cols: 1,
            data: vec![value],
        }
    }

    /// Zero matrix of the given shape. Fails if either dimension is 0.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::dimension(
                "zeros",
                format!("empty shape {}x{}", rows, cols),
            ));
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![N::zero(); rows * cols],
        })
    }

    /// Identity matrix of size `n`. Fails if `n` is 0.
    pub fn identity_of(n: usize) -> Result<Self, MatrixError> {
        if n == 0 {
            return Err(MatrixError::dimension("identity_of", "empty shape 0x0"));
        }
        Ok(Self::diagonal_unchecked(&vec![N::one(); n]))
    }

    fn diagonal_unchecked(diagonal: &[N]) -> Self {
        let n = diagonal.len();
        let mut data = vec![N::zero(); n * n];
        for (i, v) in diagonal.iter().enumerate() {
            data[i * n + i] = *v;
        }
        Matrix::from_parts(n, n, data)
    }

    /// Square diagonal matrix with the given diagonal.
    pub fn from_diagonal(diagonal: &[N]) -> Result<Self, MatrixError> {
        if diagonal.is_empty() {
            return Err(MatrixError::dimension("from_diagonal", "empty diagonal"));
        }
        Ok(Self::diagonal_unchecked(diagonal))
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at row `i`, column `j`, if in range.
    pub fn get(&self, i: usize, j: usize) -> Option<N> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    /// If `i` is out of range.
    pub fn row(&self, i: usize) -> &[N] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.data.iter()
    }

    /// Row-major element storage.
    pub fn as_slice(&self) -> &[N] {
        &self.data
    }

    /// Copy of the rows as nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<N>> {
        self.data.chunks(self.cols).map(<[N]>::to_vec).collect()
    }

    /// Applies `f` to every element.
    pub fn map(&self, f: impl Fn(N) -> N) -> Self {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }

    fn zip_with(
        &self,
        op: &'static str,
        other: &Self,
        f: impl Fn(N, N) -> N,
    ) -> Result<Self, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::mismatch(op, self.shape(), other.shape()));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    /// Elementwise sum. Shapes must be equal.
    pub fn add(&self, other: &Self) -> Result<Self, MatrixError> {
        self.zip_with("add", other, |a, b| a + b)
    }

    /// Elementwise difference. Shapes must be equal.
    pub fn sub(&self, other: &Self) -> Result<Self, MatrixError> {
        self.zip_with("sub", other, |a, b| a - b)
    }

    /// Every element scaled by `k`.
    pub fn mul_scalar(&self, k: N) -> Self {
        self.map(|v| k * v)
    }

    /// Matrix product `self . other`, a `self.nrows() x other.ncols()` matrix.
    ///
    /// Requires `self.ncols() == other.nrows()`.
    pub fn mul_matrix(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::mismatch(
                "mul_matrix",
                self.shape(),
                other.shape(),
            ));
        }

        let mut product = Vec::with_capacity(self.rows * other.cols);
        for i in 0..self.rows {
            let lhs = self.row(i);
            for j in 0..other.cols {
                let mut cell = N::zero();
                for (k, a) in lhs.iter().enumerate() {
                    cell += *a * other.data[k * other.cols + j];
                }
                product.push(cell);
            }
        }

        Ok(Matrix {
            rows: self.rows,
            cols: other.cols,
            data: product,
        })
    }

    /// The `cols x rows` matrix with `[i][j] = self[j][i]`.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j]);
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Identity matrix of the same size as this square matrix.
    pub fn identity(&self) -> Result<Self, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                op: "identity",
                shape: self.shape(),
            });
        }
        Self::identity_of(self.rows)
    }

    /// Copy with `epsilon` subtracted from every element, then rounded to `decimals` places.
    ///
    /// Suppresses floating point residue such as `-0.00000001` being shown as `-0.0`. This is a
    /// presentation step and is never applied implicitly.
    pub fn epsilon_round(&self, decimals: u32, epsilon: N) -> Self {
        let scale: N = na::convert(10f64.powi(decimals as i32));
        // Adding +0 turns a rounded -0 into 0
        self.map(|v| ((v - epsilon) * scale).round() / scale + N::zero())
    }

    /// [`epsilon_round`](Self::epsilon_round) with [`DEFAULT_ROUND_DECIMALS`] and
    /// [`DEFAULT_ROUND_EPSILON`].
    pub fn epsilon_rounded(&self) -> Self {
        self.epsilon_round(DEFAULT_ROUND_DECIMALS, na::convert(DEFAULT_ROUND_EPSILON))
    }

    /// Largest absolute element.
    pub fn max_abs(&self) -> N {
        self.data
            .iter()
            .copied()
            .map(|v| v.abs())
            .fold(N::zero(), |m, a| if a > m { a } else { m })
    }

    /// True if every element is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(Zero::is_zero)
    }

    pub(crate) fn into_parts(self) -> (usize, usize, Vec<N>) {
        (self.rows, self.cols, self.data)
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<N>) -> Self {
        debug_assert!(rows >= 1 && cols >= 1 && data.len() == rows * cols);
        Matrix { rows, cols, data }
    }
}

impl<N: RealField + Copy> TryFrom<Vec<Vec<N>>> for Matrix<N> {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<N>>) -> Result<Self, Self::Error> {
        Matrix::new(rows)
    }
}

impl<N: RealField + Copy> From<Matrix<N>> for Vec<Vec<N>> {
    fn from(m: Matrix<N>) -> Self {
        m.to_rows()
    }
}

impl<N: RealField + Copy> TryFrom<&DMatrix<N>> for Matrix<N> {
    type Error = MatrixError;

    /// Copies a nalgebra matrix. Fails if it has no rows or no columns.
    fn try_from(m: &DMatrix<N>) -> Result<Self, Self::Error> {
        let mut out = Matrix::zeros(m.nrows(), m.ncols())?;
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                out.data[i * out.cols + j] = m[(i, j)];
            }
        }
        Ok(out)
    }
}

impl<N: RealField + Copy> From<&Matrix<N>> for DMatrix<N> {
    fn from(m: &Matrix<N>) -> Self {
        DMatrix::from_row_slice(m.rows, m.cols, &m.data)
    }
}

impl<N: RealField + Copy> Index<(usize, usize)> for Matrix<N> {
    type Output = N;

    fn index(&self, (i, j): (usize, usize)) -> &N {
        assert!(
            i < self.rows && j < self.cols,
            "index ({}, {}) out of range for a {}x{} matrix",
            i,
            j,
            self.rows,
            self.cols
        );
        &self.data[i * self.cols + j]
    }
}

impl<'a, N: RealField + Copy> Add<&'a Matrix<N>> for &'a Matrix<N> {
    type Output = Result<Matrix<N>, MatrixError>;

    fn add(self, rhs: &'a Matrix<N>) -> Self::Output {
        Matrix::add(self, rhs)
    }
}

impl<'a, N: RealField + Copy> Sub<&'a Matrix<N>> for &'a Matrix<N> {
    type Output = Result<Matrix<N>, MatrixError>;

    fn sub(self, rhs: &'a Matrix<N>) -> Self::Output {
        Matrix::sub(self, rhs)
    }
}

impl<N: RealField + Copy> Mul<N> for &Matrix<N> {
    type Output = Matrix<N>;

    fn mul(self, k: N) -> Matrix<N> {
        self.mul_scalar(k)
    }
}

impl<N: RealField + Copy> fmt::Display for Matrix<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                match f.precision() {
                    Some(p) => write!(f, "{:.*}", p, v)?,
                    None => write!(f, "{}", v)?,
                }
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl<N: RealField + Copy> AbsDiffEq for Matrix<N> {
    type Epsilon = N;

    fn default_epsilon() -> N {
        <N as AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: N) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<N: RealField + Copy> RelativeEq for Matrix<N> {
    fn default_max_relative() -> N {
        <N as RelativeEq>::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: N, max_relative: N) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
