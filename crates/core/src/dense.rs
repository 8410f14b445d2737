//! Explicit dense materialization of the operator, used for verification.

use num_complex::Complex64;

use crate::{
    nufft::NufftBackend,
    operator::{Freq2Wave, Kernel},
};

/// Row-major M x N complex matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Complex64>,
}

impl DenseMatrix {
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

    /// y = A x
    pub fn matvec(&self, x: &[Complex64]) -> Vec<Complex64> {
        assert_eq!(x.len(), self.cols, "matvec input must match column count");
        let mut y = vec![Complex64::ZERO; self.rows];
        for (row, out) in y.iter_mut().enumerate() {
            let offset = row * self.cols;
            let mut acc = Complex64::ZERO;
            for (col, &value) in x.iter().enumerate() {
                acc += self.data[offset + col] * value;
            }
            *out = acc;
        }
        y
    }

    pub fn column(&self, col: usize) -> Vec<Complex64> {
        assert!(col < self.cols, "column index out of range");
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }
}

impl<B: NufftBackend> Freq2Wave<B> {
    /// Builds the explicit matrix column by column from the stored nodes,
    /// phases and boundary blocks.
    ///
    /// This evaluates the same per-column formula the implicit apply uses,
    /// without routing through `apply`, so agreement between the two is a
    /// meaningful check.
    pub fn to_dense_matrix(&self) -> DenseMatrix {
        let rows = self.num_samples();
        let cols = self.num_coeffs();
        let mut data = vec![Complex64::ZERO; rows * cols];
        match &self.kernel {
            Kernel::Dim1 { tables, .. } => {
                for row in 0..rows {
                    for col in 0..cols {
                        data[row * cols + col] = tables.column_value(row, col);
                    }
                }
            }
            Kernel::Dim1Boundary(axis) => {
                for row in 0..rows {
                    for col in 0..cols {
                        data[row * cols + col] = axis.column_value(row, col);
                    }
                }
            }
            Kernel::Dim2 { x, y, .. } => {
                let nx = x.extent;
                for row in 0..rows {
                    for col in 0..cols {
                        data[row * cols + col] =
                            x.column_value(row, col % nx) * y.column_value(row, col / nx);
                    }
                }
            }
            Kernel::Dim2Boundary { x, y, .. } => {
                let nx = x.extent;
                for row in 0..rows {
                    for col in 0..cols {
                        data[row * cols + col] =
                            x.column_value(row, col % nx) * y.column_value(row, col / nx);
                    }
                }
            }
        }
        for row in 0..rows {
            let factor = self.weighting.factor(row);
            if factor != 1.0 {
                for value in &mut data[row * cols..(row + 1) * cols] {
                    *value *= factor;
                }
            }
        }
        DenseMatrix { rows, cols, data }
    }
}
