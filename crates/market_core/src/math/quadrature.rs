//! Adaptive Simpson quadrature.
//!
//! Used for surplus integrals whose integrand has no closed-form
//! antiderivative but is fully numeric.

use crate::types::SolverError;

/// Quadrature configuration.
///
/// # Example
///
/// ```
/// use market_core::math::quadrature::QuadratureConfig;
///
/// let config = QuadratureConfig::default();
/// assert!(config.tolerance <= 1e-9);
/// assert!(config.max_depth >= 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadratureConfig {
    /// Absolute error target for the whole interval.
    pub tolerance: f64,
    /// Maximum bisection depth of any sub-interval.
    pub max_depth: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_depth: 40,
        }
    }
}

impl QuadratureConfig {
    /// Returns true if the tolerance is positive and finite and the depth is
    /// non-zero.
    pub fn is_valid(&self) -> bool {
        self.tolerance > 0.0 && self.tolerance.is_finite() && self.max_depth > 0
    }
}

/// Adaptive Simpson integrator.
///
/// Each interval is split in half until the two-panel Simpson estimate agrees
/// with the one-panel estimate to within fifteen times the local tolerance,
/// then the Richardson-corrected value is accepted.
///
/// # Example
///
/// ```
/// use market_core::math::quadrature::AdaptiveSimpson;
///
/// // Consumer surplus of q = 100 - 2p at p* = 16: ∫_0^68 ((100 - q)/2 - 16) dq
/// let integrator = AdaptiveSimpson::with_defaults();
/// let cs = integrator
///     .integrate(|q| (100.0 - q) / 2.0 - 16.0, 0.0, 68.0)
///     .unwrap();
/// assert!((cs - 1156.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveSimpson {
    config: QuadratureConfig,
}

impl AdaptiveSimpson {
    /// Create an integrator with the given configuration.
    pub fn new(config: QuadratureConfig) -> Self {
        Self { config }
    }

    /// Create an integrator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(QuadratureConfig::default())
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &QuadratureConfig {
        &self.config
    }

    /// Integrate `f` over `[a, b]`. Reversed bounds give the negated area.
    ///
    /// # Errors
    ///
    /// * `SolverError::NonFiniteValue` - `f` is NaN or infinite at a sample
    /// * `SolverError::MaxIterationsExceeded` - Some sub-interval did not
    ///   converge within `max_depth` bisections
    pub fn integrate<F>(&self, f: F, a: f64, b: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        if a == b {
            return Ok(0.0);
        }
        let eval = |x: f64| {
            let y = f(x);
            if y.is_finite() {
                Ok(y)
            } else {
                Err(SolverError::NonFiniteValue { x })
            }
        };
        let whole = Panel::new(&eval, a, b)?;
        self.refine(&eval, whole, self.config.tolerance, self.config.max_depth)
    }

    fn refine<F>(
        &self,
        eval: &F,
        panel: Panel,
        tolerance: f64,
        depth: usize,
    ) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> Result<f64, SolverError>,
    {
        let (left, right) = panel.split(eval)?;
        let delta = left.area + right.area - panel.area;
        if delta.abs() <= 15.0 * tolerance {
            return Ok(left.area + right.area + delta / 15.0);
        }
        if depth == 0 {
            return Err(SolverError::MaxIterationsExceeded {
                iterations: self.config.max_depth,
            });
        }
        let half = tolerance / 2.0;
        let left = self.refine(eval, left, half, depth - 1)?;
        let right = self.refine(eval, right, half, depth - 1)?;
        Ok(left + right)
    }
}

/// One Simpson panel with its cached samples.
#[derive(Debug, Clone, Copy)]
struct Panel {
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    area: f64,
}

impl Panel {
    fn new<F>(eval: &F, a: f64, b: f64) -> Result<Self, SolverError>
    where
        F: Fn(f64) -> Result<f64, SolverError>,
    {
        let (fa, fb) = (eval(a)?, eval(b)?);
        let fm = eval(0.5 * (a + b))?;
        Ok(Self::from_samples(a, b, fa, fm, fb))
    }

    fn from_samples(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> Self {
        let area = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
        Self {
            a,
            b,
            fa,
            fm,
            fb,
            area,
        }
    }

    fn split<F>(&self, eval: &F) -> Result<(Panel, Panel), SolverError>
    where
        F: Fn(f64) -> Result<f64, SolverError>,
    {
        let m = 0.5 * (self.a + self.b);
        let left_mid = eval(0.5 * (self.a + m))?;
        let right_mid = eval(0.5 * (m + self.b))?;
        Ok((
            Panel::from_samples(self.a, m, self.fa, left_mid, self.fm),
            Panel::from_samples(m, self.b, self.fm, right_mid, self.fb),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_polynomial_is_exact() {
        let integrator = AdaptiveSimpson::with_defaults();
        let area = integrator.integrate(|x| x * x * x, 0.0, 2.0).unwrap();
        assert_relative_eq!(area, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exponential_demand_area() {
        // ∫_0^50 exp(4.6 - 0.05p) dp
        let integrator = AdaptiveSimpson::with_defaults();
        let area = integrator
            .integrate(|p| (4.6 - 0.05 * p).exp(), 0.0, 50.0)
            .unwrap();
        let expected = 20.0 * (4.6_f64.exp() - 2.1_f64.exp());
        assert_relative_eq!(area, expected, max_relative = 1e-10);
    }

    #[test]
    fn test_reversed_bounds_negate() {
        let integrator = AdaptiveSimpson::with_defaults();
        let forward = integrator.integrate(|x| x.sin(), 0.0, 1.0).unwrap();
        let backward = integrator.integrate(|x| x.sin(), 1.0, 0.0).unwrap();
        assert_relative_eq!(forward, -backward, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_interval() {
        let integrator = AdaptiveSimpson::with_defaults();
        assert_eq!(integrator.integrate(|x| x, 3.0, 3.0).unwrap(), 0.0);
    }

    #[test]
    fn test_non_finite_integrand() {
        let integrator = AdaptiveSimpson::with_defaults();
        let result = integrator.integrate(|x| 1.0 / x, 0.0, 1.0);
        assert!(matches!(result, Err(SolverError::NonFiniteValue { x }) if x == 0.0));
    }

    #[test]
    fn test_depth_exhaustion() {
        let integrator = AdaptiveSimpson::new(QuadratureConfig {
            tolerance: 1e-14,
            max_depth: 2,
        });
        let result = integrator.integrate(|x| x.sqrt(), 0.0, 1.0);
        assert!(matches!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 2 })
        ));
    }

    #[test]
    fn test_config_validity() {
        assert!(QuadratureConfig::default().is_valid());
        let config = QuadratureConfig {
            tolerance: -1.0,
            max_depth: 10,
        };
        assert!(!config.is_valid());
    }
}
