//! 1-D Gaussian profile fitting.
//!
//! Levenberg-Marquardt least squares with an analytic Jacobian, fitting the
//! three free parameters of `f(x) = a * exp(-(x - x0)^2 / w^2)` where `w` is
//! the 1/e intensity radius. All internal computation is in f64.
//!
//! Any failure of the optimizer (too few samples, singular normal equations,
//! non-finite intermediate values, or running out of iterations) degrades to
//! the sentinel result `(a=0, x0=0, w=1)` with a flat curve; it is never
//! surfaced as an error. Callers must treat amplitude 0 / width 1 as "no
//! usable signal", not a physical measurement.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FitConfig;

/// Number of free parameters: amplitude, center, width.
const PARAM_COUNT: usize = 3;

/// Initial Levenberg-Marquardt damping factor.
const INITIAL_LAMBDA: f64 = 1e-3;

/// Seed parameters for the optimizer.
#[derive(Clone, Copy, Debug)]
pub struct FitGuess {
    /// Guessed peak amplitude (typically the profile maximum).
    pub amplitude: f64,
    /// Guessed center, as an index into the profile.
    pub center: f64,
    /// Guessed 1/e intensity radius in pixels.
    pub width: f64,
}

/// Converged (or sentinel) Gaussian parameters plus the curve evaluated at
/// every input position.
#[derive(Clone, Debug, Serialize)]
pub struct FitResult {
    pub amplitude: f64,
    pub center: f64,
    pub width: f64,
    /// `gaussian(positions[i], amplitude, center, width)` for each input
    /// position.
    pub curve: Vec<f64>,
    /// False when the sentinel fallback was returned.
    pub converged: bool,
}

impl FitResult {
    /// True when this is the `(0, 0, 1)` no-signal sentinel.
    pub fn is_fallback(&self) -> bool {
        !self.converged
    }
}

/// Gaussian profile with 1/e intensity radius `width`.
pub fn gaussian(x: f64, amplitude: f64, center: f64, width: f64) -> f64 {
    let d = x - center;
    amplitude * (-d * d / (width * width)).exp()
}

/// Evaluate the profile at every position.
pub fn evaluate_curve(positions: &[f64], amplitude: f64, center: f64, width: f64) -> Vec<f64> {
    positions
        .iter()
        .map(|&x| gaussian(x, amplitude, center, width))
        .collect()
}

/// Fit a Gaussian profile to `(positions, values)` starting from `guess`.
///
/// The parameters are unconstrained; in particular the optimizer is free to
/// wander into negative amplitude or width. The only sanity guard is the
/// fallback on failure.
pub fn fit_gaussian(
    positions: &[f64],
    values: &[f64],
    guess: &FitGuess,
    config: &FitConfig,
) -> FitResult {
    if positions.len() != values.len() || positions.len() < PARAM_COUNT {
        warn!(
            samples = positions.len(),
            "too few samples for a 3-parameter fit, returning sentinel"
        );
        return fallback(positions);
    }

    let mut params = [guess.amplitude, guess.center, guess.width];
    if lm_solve(positions, values, &mut params, config) {
        debug!(
            amplitude = params[0],
            center = params[1],
            width = params[2],
            "gaussian fit converged"
        );
        FitResult {
            amplitude: params[0],
            center: params[1],
            width: params[2],
            curve: evaluate_curve(positions, params[0], params[1], params[2]),
            converged: true,
        }
    } else {
        warn!(
            samples = positions.len(),
            "gaussian fit did not converge, returning sentinel"
        );
        fallback(positions)
    }
}

/// The documented `(0, 0, 1)` sentinel with its (all-zero) curve.
fn fallback(positions: &[f64]) -> FitResult {
    FitResult {
        amplitude: 0.0,
        center: 0.0,
        width: 1.0,
        curve: evaluate_curve(positions, 0.0, 0.0, 1.0),
        converged: false,
    }
}

/// Levenberg-Marquardt solver for the 3-parameter Gaussian.
///
/// Damped normal equations solved by Cholesky, with Nielsen's gain-ratio
/// lambda adaptation. Returns true on convergence; `params` holds the final
/// iterate either way.
fn lm_solve(positions: &[f64], values: &[f64], params: &mut [f64; 3], config: &FitConfig) -> bool {
    let mut lambda = INITIAL_LAMBDA;
    let mut nu = 2.0f64;
    let mut best_cost = residual_cost(positions, values, params);

    if !best_cost.is_finite() {
        return false;
    }

    let mut jtj = [0.0f64; PARAM_COUNT * PARAM_COUNT];
    let mut jtr = [0.0f64; PARAM_COUNT];
    let mut damped = [0.0f64; PARAM_COUNT * PARAM_COUNT];

    for _ in 0..config.max_iterations {
        jtj.fill(0.0);
        jtr.fill(0.0);

        let (a, x0, w) = (params[0], params[1], params[2]);
        let inv_w2 = 1.0 / (w * w);

        for (&x, &y) in positions.iter().zip(values) {
            let d = x - x0;
            let e = (-d * d * inv_w2).exp();
            let r = y - a * e;

            let j = [
                e,                            // dF/da
                a * e * 2.0 * d * inv_w2,     // dF/dx0
                a * e * 2.0 * d * d * inv_w2 / w, // dF/dw
            ];

            for p in 0..PARAM_COUNT {
                jtr[p] += j[p] * r;
                for q in p..PARAM_COUNT {
                    jtj[p * PARAM_COUNT + q] += j[p] * j[q];
                }
            }
        }

        // Mirror the upper triangle.
        for p in 0..PARAM_COUNT {
            for q in 0..p {
                jtj[p * PARAM_COUNT + q] = jtj[q * PARAM_COUNT + p];
            }
        }

        if jtj.iter().any(|v| !v.is_finite()) || jtr.iter().any(|v| !v.is_finite()) {
            return false;
        }

        damped.copy_from_slice(&jtj);
        for p in 0..PARAM_COUNT {
            damped[p * PARAM_COUNT + p] += lambda * jtj[p * PARAM_COUNT + p].max(1e-12);
        }

        let delta = match cholesky_solve(&damped, &jtr) {
            Some(d) => d,
            None => {
                // Singular even after damping; push lambda up and retry.
                lambda *= nu;
                nu *= 2.0;
                if !lambda.is_finite() {
                    return false;
                }
                continue;
            }
        };

        let trial = [
            params[0] + delta[0],
            params[1] + delta[1],
            params[2] + delta[2],
        ];
        let trial_cost = residual_cost(positions, values, &trial);

        // Nielsen gain ratio: actual vs. predicted cost reduction.
        let predicted: f64 = delta
            .iter()
            .enumerate()
            .map(|(i, d)| d * (lambda * jtj[i * PARAM_COUNT + i].max(1e-12) * d + jtr[i]))
            .sum();

        if trial_cost.is_finite() && predicted > 0.0 && trial_cost < best_cost {
            let rho = (best_cost - trial_cost) / predicted;
            *params = trial;
            best_cost = trial_cost;
            lambda *= (1.0f64 / 3.0).max(1.0 - (2.0 * rho - 1.0).powi(3));
            nu = 2.0;
        } else {
            lambda *= nu;
            nu *= 2.0;
            if !lambda.is_finite() {
                return false;
            }
        }

        // Tested whether or not the step was accepted: once the damped step
        // collapses below the tolerance there is nothing left to gain.
        let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
        let delta_norm = delta.iter().map(|d| d * d).sum::<f64>().sqrt();
        if delta_norm / param_norm.max(1e-12) < config.tolerance || best_cost < 1e-30 {
            return true;
        }
    }

    false
}

/// Sum of squared residuals for the current parameters.
fn residual_cost(positions: &[f64], values: &[f64], params: &[f64; 3]) -> f64 {
    positions
        .iter()
        .zip(values)
        .map(|(&x, &y)| {
            let r = y - gaussian(x, params[0], params[1], params[2]);
            r * r
        })
        .sum()
}

/// Solve the symmetric positive-definite 3x3 system `mat * x = rhs` by
/// Cholesky decomposition. Returns None when the matrix is not positive
/// definite.
fn cholesky_solve(mat: &[f64; 9], rhs: &[f64; 3]) -> Option<[f64; 3]> {
    let n = PARAM_COUNT;
    let mut l = [0.0f64; 9];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i * n + k] * l[j * n + k];
            }
            if i == j {
                let diag = mat[i * n + i] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[i * n + j] = diag.sqrt();
            } else {
                l[i * n + j] = (mat[i * n + j] - sum) / l[j * n + j];
            }
        }
    }

    // Forward substitution: L * y = rhs
    let mut y = [0.0f64; 3];
    for i in 0..n {
        let mut sum = rhs[i];
        for k in 0..i {
            sum -= l[i * n + k] * y[k];
        }
        y[i] = sum / l[i * n + i];
    }

    // Back substitution: L^T * x = y
    let mut x = [0.0f64; 3];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in i + 1..n {
            sum -= l[k * n + i] * x[k];
        }
        x[i] = sum / l[i * n + i];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}
