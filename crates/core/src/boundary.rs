//! Dense blocks holding boundary-function contributions at the sample
//! points.
//!
//! Blocks are stored row-major as flat `Vec<Complex64>` with one row per
//! sample and one column per boundary function.

use num_complex::Complex64;

use serde::{Deserialize, Serialize};

/// Which edge of the reconstruction interval a boundary block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Row-major dense complex matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBlock {
    rows: usize,
    cols: usize,
    data: Vec<Complex64>,
}

impl DenseBlock {
    pub fn new(rows: usize, cols: usize, data: Vec<Complex64>) -> Self {
        assert_eq!(data.len(), rows * cols, "block data must fill rows x cols");
        Self { rows, cols, data }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Complex64::ZERO; rows * cols],
        }
    }

    /// Builds a block entry-wise from `f(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> Complex64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.cols + col]
    }

    /// y += A x
    pub fn matvec_acc(&self, x: &[Complex64], y: &mut [Complex64]) {
        assert_eq!(x.len(), self.cols, "matvec input must match column count");
        assert_eq!(y.len(), self.rows, "matvec output must match row count");
        for (row, out) in y.iter_mut().enumerate() {
            let offset = row * self.cols;
            let mut acc = Complex64::ZERO;
            for (col, &value) in x.iter().enumerate() {
                acc += self.data[offset + col] * value;
            }
            *out += acc;
        }
    }

    /// out = A^H v
    pub fn adjoint_matvec(&self, v: &[Complex64], out: &mut [Complex64]) {
        assert_eq!(v.len(), self.rows, "adjoint input must match row count");
        assert_eq!(out.len(), self.cols, "adjoint output must match column count");
        out.fill(Complex64::ZERO);
        for (row, &value) in v.iter().enumerate() {
            let offset = row * self.cols;
            for (col, slot) in out.iter_mut().enumerate() {
                *slot += self.data[offset + col].conj() * value;
            }
        }
    }

    /// y[m] += A[m, col] * t[m]
    pub fn col_mul_acc(&self, col: usize, t: &[Complex64], y: &mut [Complex64]) {
        assert!(col < self.cols, "column index out of range");
        assert_eq!(t.len(), self.rows, "factor length must match row count");
        assert_eq!(y.len(), self.rows, "output length must match row count");
        for (row, (out, &factor)) in y.iter_mut().zip(t).enumerate() {
            *out += self.data[row * self.cols + col] * factor;
        }
    }

    /// out[m] = conj(A[m, col]) * v[m]
    pub fn conj_col_mul(&self, col: usize, v: &[Complex64], out: &mut [Complex64]) {
        assert!(col < self.cols, "column index out of range");
        assert_eq!(v.len(), self.rows, "input length must match row count");
        assert_eq!(out.len(), self.rows, "output length must match row count");
        for (row, (slot, &value)) in out.iter_mut().zip(v).enumerate() {
            *slot = self.data[row * self.cols + col].conj() * value;
        }
    }
}
