//! Solver configuration types.

use num_traits::Float;

/// Configuration for root-finding algorithms.
///
/// Shared by [`BrentSolver`](super::BrentSolver) and
/// [`GridScanner`](super::GridScanner).
///
/// # Type Parameters
///
/// * `T` - Floating-point type for tolerance (e.g., `f64`)
///
/// # Example
///
/// ```
/// use market_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert!(config.max_iterations >= 50);
///
/// let custom = SolverConfig {
///     tolerance: 1e-12,
///     max_iterations: 200,
/// };
/// assert!(custom.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance: the solver stops when `|f(x)| < tolerance`
    /// or the bracket is narrower than it.
    pub tolerance: T,

    /// Maximum number of iterations before giving up with
    /// `SolverError::MaxIterationsExceeded`.
    pub max_iterations: usize,
}

fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::epsilon)
}

impl<T: Float> Default for SolverConfig<T> {
    /// Default values:
    /// - `tolerance`: 1e-10
    /// - `max_iterations`: 100
    fn default() -> Self {
        Self {
            tolerance: constant(1e-10),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Returns true if the tolerance is positive and finite and at least one
    /// iteration is allowed.
    ///
    /// Configurations are plain data and may come from files, so callers
    /// check them with this before solving.
    pub fn is_valid(&self) -> bool {
        self.tolerance > T::zero() && self.tolerance.is_finite() && self.max_iterations > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: SolverConfig<f64> = SolverConfig::default();
        assert!((config.tolerance - 1e-10).abs() < 1e-15);
        assert_eq!(config.max_iterations, 100);
        assert!(config.is_valid());
    }

    #[test]
    fn test_invalid_literal_config() {
        let config = SolverConfig {
            tolerance: f64::NAN,
            max_iterations: 10,
        };
        assert!(!config.is_valid());
        let config = SolverConfig {
            tolerance: 1e-8,
            max_iterations: 0,
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_config_with_f32() {
        let config: SolverConfig<f32> = SolverConfig::default();
        assert!(config.tolerance > 0.0);
        assert_eq!(config.max_iterations, 100);
    }
}
