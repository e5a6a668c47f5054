//! Engine configuration.

use crate::MarketError;
use market_core::math::quadrature::QuadratureConfig;
use market_core::math::solvers::{GridScanner, SolverConfig};

/// Tunables of the equilibrium and surplus engine.
///
/// Every field has a default, so a configuration file only needs the keys it
/// changes.
///
/// # Example
///
/// ```
/// use market_equilibrium::EngineConfig;
///
/// let config = EngineConfig {
///     reference_price: 2.0,
///     ..EngineConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Price at which slope directions are checked.
    pub reference_price: f64,
    /// Lower end of the numeric root scan.
    pub scan_min_price: f64,
    /// Upper end of the numeric root scan.
    pub scan_max_price: f64,
    /// Number of log-spaced scan points.
    pub scan_samples: usize,
    /// Brent refinement settings.
    pub solver: SolverConfig<f64>,
    /// Fallback quadrature settings.
    pub quadrature: QuadratureConfig,
    /// Upper bound of the price range sampled by `curve_points`.
    pub plot_price_cap: f64,
    /// Number of samples taken by `curve_points`.
    pub plot_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_price: 1.0,
            scan_min_price: 1e-6,
            scan_max_price: 1e6,
            scan_samples: 400,
            solver: SolverConfig::default(),
            quadrature: QuadratureConfig::default(),
            plot_price_cap: 100.0,
            plot_samples: 200,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// * `MarketError::Validation` - Describes the first invalid field
    pub fn validate(&self) -> Result<(), MarketError> {
        let invalid = |message: &str| Err(MarketError::Validation(message.to_string()));
        if !(self.reference_price.is_finite() && self.reference_price >= 0.0) {
            return invalid("reference_price must be a finite non-negative number");
        }
        if !self.scanner().is_valid() {
            return invalid(
                "scan range must satisfy 0 < scan_min_price < scan_max_price with at least 2 samples",
            );
        }
        if !self.solver.is_valid() {
            return invalid("solver tolerance must be positive and max_iterations > 0");
        }
        if !self.quadrature.is_valid() {
            return invalid("quadrature tolerance must be positive and max_depth > 0");
        }
        let cap_valid = self.plot_price_cap.is_finite() && self.plot_price_cap > 0.0;
        if !cap_valid || self.plot_samples < 2 {
            return invalid("plot_price_cap must be positive and plot_samples at least 2");
        }
        Ok(())
    }

    /// The numeric root scanner described by this configuration.
    pub fn scanner(&self) -> GridScanner {
        GridScanner::new(
            self.scan_min_price,
            self.scan_max_price,
            self.scan_samples,
            self.solver,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference_price, 1.0);
    }

    #[test]
    fn test_rejects_inverted_scan_range() {
        let config = EngineConfig {
            scan_min_price: 10.0,
            scan_max_price: 1.0,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scan range"));
    }

    #[test]
    fn test_rejects_negative_reference_price() {
        let config = EngineConfig {
            reference_price: -1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_solver() {
        let config = EngineConfig {
            solver: SolverConfig {
                tolerance: 0.0,
                max_iterations: 10,
            },
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
