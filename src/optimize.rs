//! BFGS quasi-Newton method for unconstrained minimization.

#![allow(clippy::needless_range_loop)]

use log::{debug, warn};
use thiserror::Error;

/// Numerical threshold below which the curvature `yᵀs` is treated as zero.
pub const SINGULAR_THRESHOLD: f64 = 1e-14;

/// Errors that can occur during optimization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// Invalid input array size or dimensions.
    #[error("invalid input: {context}")]
    InvalidInput { context: String },
}

pub type OptimizeResult<T> = std::result::Result<T, OptimizeError>;

/// Options for multivariate minimization.
#[derive(Debug, Clone)]
pub struct MinimizeOptions {
    /// Maximum number of iterations (0 means `200 * n`)
    pub max_iter: usize,
    /// Tolerance for convergence (function value change)
    pub f_tol: f64,
    /// Tolerance for convergence (argument change)
    pub x_tol: f64,
    /// Tolerance for the gradient's infinity norm
    pub g_tol: f64,
    /// Step size for finite difference gradient approximation
    pub eps: f64,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iter: 0,
            f_tol: 1e-14,
            x_tol: 1e-12,
            g_tol: 1e-5,
            eps: f64::EPSILON.sqrt(),
        }
    }
}

/// Result of a multivariate minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeResult {
    /// Final iterate.
    pub x: Vec<f64>,
    /// Function value at `x`.
    pub fun: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Function evaluations, including those spent on gradients.
    pub nfev: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
}

/// L2 norm.
#[inline]
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Infinity norm (max absolute value).
#[inline]
pub fn norm_inf(v: &[f64]) -> f64 {
    v.iter().map(|x| x.abs()).fold(0.0, f64::max)
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Forward-difference gradient of `f` at `x`, given `fx = f(x)`.
pub fn finite_difference_gradient_forward<F>(f: &F, x: &[f64], fx: f64, eps: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut x_step = x.to_vec();
    (0..x.len())
        .map(|i| {
            let h = eps * x[i].abs().max(1.0);
            x_step[i] = x[i] + h;
            let g = (f(&x_step) - fx) / h;
            x_step[i] = x[i];
            g
        })
        .collect()
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = 1.0;
            row
        })
        .collect()
}

/// BFGS quasi-Newton method for minimization.
///
/// # Arguments
/// * `f` - Function f: R^n -> R to minimize
/// * `x0` - Initial guess
/// * `options` - Solver options
///
/// # Note
/// Maintains an approximation of the inverse Hessian built from gradient
/// differences. Gradients are estimated by forward finite differences.
/// Running out of iterations or a failed line search is reported through
/// `converged = false`, not as an error.
pub fn bfgs<F>(f: F, x0: &[f64], options: &MinimizeOptions) -> OptimizeResult<MinimizeResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(OptimizeError::InvalidInput {
            context: "bfgs: empty initial guess".to_string(),
        });
    }
    let max_iter = if options.max_iter == 0 {
        200 * n
    } else {
        options.max_iter
    };

    let mut x = x0.to_vec();
    let mut fx = f(&x);
    let mut nfev = 1;

    let mut grad = finite_difference_gradient_forward(&f, &x, fx, options.eps);
    nfev += n;

    let mut h_inv = identity(n);

    for iter in 0..max_iter {
        if norm_inf(&grad) < options.g_tol {
            debug!("bfgs: gradient converged after {iter} iterations");
            return Ok(MinimizeResult {
                x,
                fun: fx,
                iterations: iter,
                nfev,
                converged: true,
            });
        }

        // p = -H_inv * grad
        let mut p = vec![0.0; n];
        for i in 0..n {
            for j in 0..n {
                p[i] -= h_inv[i][j] * grad[j];
            }
        }
        // Fall back to steepest descent if H_inv lost positive definiteness
        if dot(&grad, &p) >= 0.0 {
            h_inv = identity(n);
            p = grad.iter().map(|g| -g).collect();
        }

        let Some((x_new, fx_new, evals)) = backtracking_line_search(&f, &x, &p, fx, &grad) else {
            warn!("bfgs: line search failed at iteration {iter}");
            return Ok(MinimizeResult {
                x,
                fun: fx,
                iterations: iter + 1,
                nfev: nfev + LINE_SEARCH_MAX_STEPS,
                converged: false,
            });
        };
        nfev += evals;

        let s: Vec<f64> = x_new.iter().zip(x.iter()).map(|(a, b)| a - b).collect();
        if norm(&s) < options.x_tol || (fx - fx_new).abs() < options.f_tol {
            debug!("bfgs: step converged after {} iterations", iter + 1);
            return Ok(MinimizeResult {
                x: x_new,
                fun: fx_new,
                iterations: iter + 1,
                nfev,
                converged: true,
            });
        }

        let grad_new = finite_difference_gradient_forward(&f, &x_new, fx_new, options.eps);
        nfev += n;

        let y: Vec<f64> = grad_new.iter().zip(grad.iter()).map(|(a, b)| a - b).collect();

        // H_new = (I - rho*s*y^T) * H * (I - rho*y*s^T) + rho*s*s^T
        let ys = dot(&y, &s);
        if ys > SINGULAR_THRESHOLD {
            let rho = 1.0 / ys;

            let mut h_y = vec![0.0; n];
            for i in 0..n {
                for j in 0..n {
                    h_y[i] += h_inv[i][j] * y[j];
                }
            }
            let yhy = dot(&y, &h_y);

            for i in 0..n {
                for j in 0..n {
                    h_inv[i][j] += rho * (1.0 + rho * yhy) * s[i] * s[j]
                        - rho * (s[i] * h_y[j] + h_y[i] * s[j]);
                }
            }
        }

        x = x_new;
        fx = fx_new;
        grad = grad_new;
    }

    warn!("bfgs: no convergence within {max_iter} iterations");
    Ok(MinimizeResult {
        x,
        fun: fx,
        iterations: max_iter,
        nfev,
        converged: false,
    })
}

const LINE_SEARCH_MAX_STEPS: usize = 50;

/// Backtracking line search with the Armijo condition.
/// Returns `(new_x, new_fx, num_evaluations)`, or `None` if no step
/// decreased the function enough.
fn backtracking_line_search<F>(
    f: &F,
    x: &[f64],
    p: &[f64],
    fx: f64,
    grad: &[f64],
) -> Option<(Vec<f64>, f64, usize)>
where
    F: Fn(&[f64]) -> f64,
{
    let c = 1e-4; // Armijo constant
    let shrink = 0.5;

    let grad_dot_p = dot(grad, p);
    let mut alpha = 1.0;

    for step in 1..=LINE_SEARCH_MAX_STEPS {
        let x_new: Vec<f64> = x.iter().zip(p.iter()).map(|(a, d)| a + alpha * d).collect();
        let fx_new = f(&x_new);

        if fx_new <= fx + c * alpha * grad_dot_p {
            return Some((x_new, fx_new, step));
        }

        alpha *= shrink;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|xi| xi * xi).sum()
    }

    fn shifted_bowl(x: &[f64]) -> f64 {
        x[0] * x[0] + 2.0 * x[1] * x[1] - 4.0 * x[0] - 4.0 * x[1]
    }

    fn rosenbrock(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2)
    }

    #[test]
    fn test_bfgs_sphere() {
        let result = bfgs(sphere, &[1.0, 1.0], &MinimizeOptions::default()).expect("bfgs failed");

        assert!(result.converged);
        assert!(result.x.iter().all(|xi| xi.abs() < 1e-5));
        assert!(result.fun.abs() < 1e-10);
    }

    #[test]
    fn test_bfgs_shifted_bowl() {
        let result =
            bfgs(shifted_bowl, &[1.0, 1.0], &MinimizeOptions::default()).expect("bfgs failed");

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-5);
        assert!((result.x[1] - 1.0).abs() < 1e-5);
        assert!((result.fun + 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_bfgs_rosenbrock() {
        let opts = MinimizeOptions {
            max_iter: 2000,
            ..Default::default()
        };

        let result = bfgs(rosenbrock, &[0.0, 0.0], &opts).expect("bfgs failed");

        assert!((result.x[0] - 1.0).abs() < 0.01);
        assert!((result.x[1] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_bfgs_higher_dimension() {
        let result =
            bfgs(sphere, &[3.0, -2.0, 0.5, 4.0], &MinimizeOptions::default()).expect("bfgs failed");

        assert!(result.converged);
        assert!(result.fun < 1e-8);
    }

    #[test]
    fn test_bfgs_empty_guess() {
        assert!(matches!(
            bfgs(sphere, &[], &MinimizeOptions::default()),
            Err(OptimizeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_bfgs_iteration_cap_reports_failure() {
        let opts = MinimizeOptions {
            max_iter: 1,
            ..Default::default()
        };
        let result = bfgs(rosenbrock, &[-1.2, 1.0], &opts).expect("bfgs failed");

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_unbounded_objective_is_not_converged() {
        // Decreases without bound; the line search keeps succeeding until
        // the iteration cap is hit.
        let opts = MinimizeOptions {
            max_iter: 20,
            ..Default::default()
        };
        let result = bfgs(|x: &[f64]| -x[0], &[0.0], &opts).expect("bfgs failed");
        assert!(!result.converged);
    }

    #[test]
    fn test_gradient_of_quadratic() {
        let g = finite_difference_gradient_forward(&sphere, &[1.0, -2.0], 5.0, 1e-7);
        assert!((g[0] - 2.0).abs() < 1e-5);
        assert!((g[1] + 4.0).abs() < 1e-5);
    }
}
