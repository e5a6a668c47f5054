//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Brent's method root finder.
///
/// Combines bisection, secant, and inverse quadratic interpolation for
/// robust root finding without requiring derivatives. Used to refine the
/// brackets produced by [`GridScanner`](super::GridScanner) when an excess
/// demand function has no closed-form root.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`)
///
/// # Example
///
/// ```
/// use market_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
///
/// // Excess demand (100 - 2p) - (20 + 3p) vanishes at p = 16
/// let excess = |p: f64| (100.0 - 2.0 * p) - (20.0 + 3.0 * p);
///
/// let price = solver.find_root(excess, 0.0, 50.0).unwrap();
/// assert!((price - 16.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Create a new Brent solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Find a root of `f` in the bracket `[a, b]`.
    ///
    /// Requires that `f(a)` and `f(b)` have opposite signs (a valid bracket).
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root where `|f(x)| < tolerance` or the bracket has shrunk
    ///   below tolerance
    /// * `Err(SolverError::NonFiniteValue)` - `f` returned NaN or infinity
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let eval = |x: T| -> Result<T, SolverError> {
            let y = f(x);
            if y.is_finite() {
                Ok(y)
            } else {
                Err(SolverError::NonFiniteValue {
                    x: x.to_f64().unwrap_or(f64::NAN),
                })
            }
        };

        let (mut a, mut b) = (a, b);
        let (mut fa, mut fb) = (eval(a)?, eval(b)?);
        if fa * fb > T::zero() {
            return Err(SolverError::NoBracket {
                a: a.to_f64().unwrap_or(f64::NAN),
                b: b.to_f64().unwrap_or(f64::NAN),
            });
        }

        // b is the best estimate, c the contrapoint, a the previous iterate
        let (mut c, mut fc) = (b, fb);
        let mut step = b - a;
        let mut previous_step = step;

        let tol = self.config.tolerance;
        let two = T::one() + T::one();
        let three = two + T::one();

        for _ in 0..self.config.max_iterations {
            if (fb > T::zero() && fc > T::zero()) || (fb < T::zero() && fc < T::zero()) {
                c = a;
                fc = fa;
                step = b - a;
                previous_step = step;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol1 = two * T::epsilon() * b.abs() + tol / two;
            let midpoint = (c - b) / two;
            if fb.abs() < tol || midpoint.abs() <= tol1 {
                return Ok(b);
            }

            if previous_step.abs() >= tol1 && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (p, q) = if a == c {
                    // Secant
                    (two * midpoint * s, T::one() - s)
                } else {
                    // Inverse quadratic interpolation
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (two * midpoint * q * (q - r) - (b - a) * (r - T::one())),
                        (q - T::one()) * (r - T::one()) * (s - T::one()),
                    )
                };
                // Keep p non-negative so the step is p / q
                let q = if p > T::zero() { -q } else { q };
                let p = p.abs();

                let interpolation_limit = three * midpoint * q - (tol1 * q).abs();
                let step_limit = (previous_step * q).abs();
                if two * p < interpolation_limit.min(step_limit) {
                    previous_step = step;
                    step = p / q;
                } else {
                    step = midpoint;
                    previous_step = step;
                }
            } else {
                step = midpoint;
                previous_step = step;
            }

            a = b;
            fa = fb;
            b = if step.abs() > tol1 {
                b + step
            } else if midpoint > T::zero() {
                b + tol1
            } else {
                b - tol1
            };
            fb = eval(b)?;
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_market_clearing_price() {
        let solver = BrentSolver::new(SolverConfig::default());
        let excess = |p: f64| (100.0 - 2.0 * p) - (20.0 + 3.0 * p);

        let price = solver.find_root(excess, 0.0, 50.0).unwrap();
        assert!((price - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_power_market_clearing_price() {
        let solver = BrentSolver::new(SolverConfig::default());
        // 100 p^-0.5 = p^1.5 at p = 10
        let excess = |p: f64| 100.0 / p.sqrt() - p.powf(1.5);

        let price = solver.find_root(excess, 1.0, 50.0).unwrap();
        assert!((price - 10.0).abs() < 1e-9, "got {}", price);
    }

    #[test]
    fn test_steep_side_bracket_stays_inside() {
        // Interpolation from the steep end of ln would step below the bracket
        let solver = BrentSolver::new(SolverConfig::default());

        let root = solver.find_root(|x: f64| x.ln(), 0.5, 50.0).unwrap();
        assert!((root - 1.0).abs() < 1e-9, "got {}", root);

        let root = solver.find_root(|x: f64| -x.ln(), 50.0, 0.5).unwrap();
        assert!((root - 1.0).abs() < 1e-9, "got {}", root);
    }

    #[test]
    fn test_every_iterate_in_bracket() {
        use std::cell::Cell;

        let solver = BrentSolver::new(SolverConfig::default());
        let outside = Cell::new(0);
        let excess = |p: f64| {
            if !(1.0..=50.0).contains(&p) {
                outside.set(outside.get() + 1);
            }
            100.0 / p.sqrt() - p.powf(1.5)
        };

        let price = solver.find_root(excess, 1.0, 50.0).unwrap();
        assert!((price - 10.0).abs() < 1e-9);
        assert_eq!(outside.get(), 0);
    }

    #[test]
    fn test_exponential_market_clearing_price() {
        let solver = BrentSolver::new(SolverConfig::default());
        // exp(4.6 - 0.05p) = exp(0.05p) at p = 46
        let excess = |p: f64| (4.6 - 0.05 * p).exp() - (0.05 * p).exp();

        let price = solver.find_root(excess, 0.0, 200.0).unwrap();
        assert!((price - 46.0).abs() < 1e-8, "got {}", price);
    }

    #[test]
    fn test_choke_price_of_quadratic_demand() {
        let solver = BrentSolver::new(SolverConfig::default());
        let demand = |p: f64| 100.0 - 0.04 * p * p;

        let choke = solver.find_root(demand, 0.0, 100.0).unwrap();
        assert!((choke - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bracket_reversed() {
        let solver = BrentSolver::new(SolverConfig::default());
        let excess = |p: f64| 80.0 - 5.0 * p;

        let price = solver.find_root(excess, 50.0, 0.0).unwrap();
        assert!((price - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_root_at_bracket_endpoint() {
        let solver = BrentSolver::new(SolverConfig::default());
        let f = |x: f64| x - 1.0;

        let root = solver.find_root(f, 0.0, 1.0).unwrap();
        assert!((root - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_bracket() {
        let solver = BrentSolver::new(SolverConfig::default());
        // Demand above supply everywhere on the bracket
        let excess = |p: f64| 10.0 + p * p;

        match solver.find_root(excess, 1.0, 2.0) {
            Err(SolverError::NoBracket { a, b }) => {
                assert_eq!(a, 1.0);
                assert_eq!(b, 2.0);
            }
            other => panic!("Expected NoBracket error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_value() {
        let solver = BrentSolver::new(SolverConfig::default());
        let f = |x: f64| x.ln();

        let result = solver.find_root(f, 0.0, 2.0);
        assert!(matches!(result, Err(SolverError::NonFiniteValue { .. })));
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let solver = BrentSolver::new(SolverConfig {
            tolerance: 1e-100,
            max_iterations: 3,
        });
        let f = |x: f64| x * x - 2.0;

        match solver.find_root(f, 0.0, 2.0) {
            Err(SolverError::MaxIterationsExceeded { iterations }) => assert_eq!(iterations, 3),
            other => panic!("Expected MaxIterationsExceeded error, got {:?}", other),
        }
    }

    #[test]
    fn test_achieves_tolerance() {
        let tol = 1e-12;
        let solver = BrentSolver::new(SolverConfig {
            tolerance: tol,
            max_iterations: 100,
        });
        let f = |x: f64| x * x - 2.0;

        let root = solver.find_root(f, 0.0, 2.0).unwrap();
        assert!(f(root).abs() < tol);
    }

    #[test]
    fn test_with_defaults_and_config_accessor() {
        let solver: BrentSolver<f64> = BrentSolver::with_defaults();
        assert_eq!(solver.config().max_iterations, 100);
        assert_eq!(solver.clone().config(), solver.config());
    }
}
