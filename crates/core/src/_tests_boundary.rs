#![cfg(test)]

use num_complex::Complex64;

use super::boundary::DenseBlock;

fn test_block(rows: usize, cols: usize) -> DenseBlock {
    DenseBlock::from_fn(rows, cols, |r, c| {
        let t = (r * cols + c) as f64 + 1.0;
        Complex64::new((0.43 * t).sin(), (0.29 * t).cos())
    })
}

fn deterministic_vector(len: usize, seed: u64) -> Vec<Complex64> {
    (0..len)
        .map(|idx| {
            let t = (idx as f64 + 1.0) * (seed as f64 + 0.5);
            Complex64::new((0.37 * t).sin(), (0.61 * t).cos())
        })
        .collect()
}

fn inner_product(a: &[Complex64], b: &[Complex64]) -> Complex64 {
    a.iter().zip(b).map(|(lhs, rhs)| lhs.conj() * rhs).sum()
}

#[test]
fn matvec_accumulates_into_the_output() {
    let block = test_block(4, 2);
    let x = deterministic_vector(2, 1);
    let mut y = deterministic_vector(4, 2);
    let before = y.clone();
    block.matvec_acc(&x, &mut y);
    for row in 0..4 {
        let expected = before[row] + block.get(row, 0) * x[0] + block.get(row, 1) * x[1];
        assert!((y[row] - expected).norm() < 1e-12);
    }
}

#[test]
fn adjoint_matvec_satisfies_the_inner_product_identity() {
    let block = test_block(5, 3);
    let x = deterministic_vector(3, 4);
    let v = deterministic_vector(5, 7);

    let mut ax = vec![Complex64::ZERO; 5];
    block.matvec_acc(&x, &mut ax);
    let mut ahv = vec![Complex64::ZERO; 3];
    block.adjoint_matvec(&v, &mut ahv);

    let lhs = inner_product(&ax, &v);
    let rhs = inner_product(&x, &ahv);
    assert!((lhs - rhs).norm() < 1e-12, "adjoint identity violated: {lhs} vs {rhs}");
}

#[test]
fn column_products_match_explicit_entries() {
    let block = test_block(4, 3);
    let t = deterministic_vector(4, 3);
    let mut acc = vec![Complex64::ZERO; 4];
    block.col_mul_acc(1, &t, &mut acc);
    for row in 0..4 {
        assert!((acc[row] - block.get(row, 1) * t[row]).norm() < 1e-12);
    }

    let mut conj = vec![Complex64::ZERO; 4];
    block.conj_col_mul(2, &t, &mut conj);
    for row in 0..4 {
        assert!((conj[row] - block.get(row, 2).conj() * t[row]).norm() < 1e-12);
    }
}

#[test]
#[should_panic(expected = "matvec input must match column count")]
fn matvec_rejects_wrong_input_length() {
    let block = test_block(3, 2);
    let x = deterministic_vector(3, 1);
    let mut y = vec![Complex64::ZERO; 3];
    block.matvec_acc(&x, &mut y);
}
