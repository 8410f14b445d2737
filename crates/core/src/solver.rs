//! Conjugate gradient on the normal equations (CGNR).
//!
//! The solver needs nothing from the operator beyond
//! [`LinearMap`](crate::operator::LinearMap), so it is agnostic to
//! dimension and boundary mode.

use std::time::Instant;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    metrics::{MetricsEvent, MetricsRecorder},
    operator::LinearMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub max_iter: usize,
    /// Relative residual target: stop once ||b - A x|| <= tol * ||b||.
    pub tol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol: 1e-6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub coefficients: Vec<Complex64>,
    pub relative_residual: f64,
    pub iterations: usize,
}

pub fn solve<A: LinearMap + ?Sized>(
    op: &mut A,
    b: &[Complex64],
    opts: &SolverOptions,
) -> Result<SolveOutcome, Error> {
    solve_with_metrics(op, b, opts, None)
}

/// Runs CGNR from the zero estimate.
///
/// Returns early when the normal-equations gradient vanishes (the
/// least-squares optimum is reached even if the residual target is not).
/// Exhausting the iteration cap is an error carrying the best estimate and
/// the achieved residual, never a silent truncation.
pub fn solve_with_metrics<A: LinearMap + ?Sized>(
    op: &mut A,
    b: &[Complex64],
    opts: &SolverOptions,
    metrics: Option<&MetricsRecorder>,
) -> Result<SolveOutcome, Error> {
    let m = op.rows();
    let n = op.cols();
    if b.len() != m {
        return Err(Error::DimensionMismatch {
            expected: m,
            got: b.len(),
        });
    }
    if let Some(recorder) = metrics {
        recorder.emit(MetricsEvent::SolveStart {
            samples: m,
            coefficients: n,
            max_iter: opts.max_iter,
            tol: opts.tol,
        });
    }
    let start = Instant::now();

    let b_norm = norm(b);
    let mut x = vec![Complex64::ZERO; n];
    if b_norm == 0.0 {
        let outcome = SolveOutcome {
            coefficients: x,
            relative_residual: 0.0,
            iterations: 0,
        };
        emit_done(metrics, &outcome, true, start);
        return Ok(outcome);
    }

    let mut r = b.to_vec();
    let mut z = vec![Complex64::ZERO; n];
    op.apply_adjoint(&r, &mut z)?;
    let mut p = z.clone();
    let mut gamma = norm_sq(&z);
    let mut q = vec![Complex64::ZERO; m];
    let mut relative = 1.0;

    for iter in 1..=opts.max_iter {
        if gamma == 0.0 {
            // A^H r = 0: already at the least-squares optimum.
            let outcome = SolveOutcome {
                coefficients: x,
                relative_residual: relative,
                iterations: iter - 1,
            };
            emit_done(metrics, &outcome, true, start);
            return Ok(outcome);
        }
        op.apply(&p, &mut q)?;
        let q_norm_sq = norm_sq(&q);
        if q_norm_sq == 0.0 {
            break;
        }
        let alpha = gamma / q_norm_sq;
        axpy(alpha, &p, &mut x);
        axpy(-alpha, &q, &mut r);
        op.apply_adjoint(&r, &mut z)?;
        let gamma_next = norm_sq(&z);
        relative = norm(&r) / b_norm;
        if let Some(recorder) = metrics {
            recorder.emit(MetricsEvent::SolverIteration {
                iteration: iter,
                relative_residual: relative,
            });
        }
        if relative <= opts.tol {
            let outcome = SolveOutcome {
                coefficients: x,
                relative_residual: relative,
                iterations: iter,
            };
            emit_done(metrics, &outcome, true, start);
            return Ok(outcome);
        }
        let beta = gamma_next / gamma;
        for (direction, &grad) in p.iter_mut().zip(&z) {
            *direction = grad + beta * *direction;
        }
        gamma = gamma_next;
    }

    if let Some(recorder) = metrics {
        recorder.emit(MetricsEvent::SolveDone {
            iterations: opts.max_iter,
            relative_residual: relative,
            converged: false,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        });
    }
    Err(Error::SolverNonConvergence {
        residual: relative,
        iterations: opts.max_iter,
        estimate: x,
    })
}

fn emit_done(
    metrics: Option<&MetricsRecorder>,
    outcome: &SolveOutcome,
    converged: bool,
    start: Instant,
) {
    if let Some(recorder) = metrics {
        recorder.emit(MetricsEvent::SolveDone {
            iterations: outcome.iterations,
            relative_residual: outcome.relative_residual,
            converged,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        });
    }
}

fn norm_sq(v: &[Complex64]) -> f64 {
    v.iter().map(|value| value.norm_sqr()).sum()
}

fn norm(v: &[Complex64]) -> f64 {
    norm_sq(v).sqrt()
}

fn axpy(alpha: f64, x: &[Complex64], y: &mut [Complex64]) {
    for (out, &value) in y.iter_mut().zip(x) {
        *out += alpha * value;
    }
}
