//! Parameter sweeps.

use super::{EquilibriumResult, MarketEquilibrium};
use crate::MarketError;
use market_core::symbolic::Symbol;
use rayon::prelude::*;
use tracing::debug;

impl MarketEquilibrium {
    /// Re-solve the market once per value of `symbol`.
    ///
    /// Each value is bound on top of the configured parameters. Solves run
    /// in parallel; results keep the order of `values`, with `None` where
    /// the market does not clear.
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbols::A;
    /// use market_equilibrium::curves::{linear_demand, linear_supply};
    /// use market_equilibrium::equilibrium::MarketEquilibrium;
    ///
    /// let market = MarketEquilibrium::new()
    ///     .demand(linear_demand(None, Some(2.0)))
    ///     .supply(linear_supply(Some(20.0), Some(3.0)));
    ///
    /// let results = market.sweep(&A, &[100.0, 120.0, 10.0]).unwrap();
    /// let prices: Vec<Option<f64>> = results
    ///     .iter()
    ///     .map(|r| r.as_ref().and_then(|r| r.price().as_f64()))
    ///     .collect();
    /// assert_eq!(prices, vec![Some(16.0), Some(20.0), None]);
    /// ```
    ///
    /// # Errors
    ///
    /// * `MarketError::Validation` - A curve is missing or the configuration
    ///   is invalid
    pub fn sweep(
        &self,
        symbol: &Symbol,
        values: &[f64],
    ) -> Result<Vec<Option<EquilibriumResult>>, MarketError> {
        self.config().validate()?;
        self.curves()?;
        debug!(%symbol, points = values.len(), "Sweeping parameter");

        values
            .par_iter()
            .map(|&value| {
                let mut parameters = self.parameter_values().clone();
                parameters.insert(symbol.clone(), value);
                self.solve_with(&parameters)
            })
            .collect()
    }
}

/// Free-function form of [`MarketEquilibrium::sweep`].
///
/// # Errors
///
/// * `MarketError::Validation` - A curve is missing or the configuration
///   is invalid
pub fn sweep_parameter(
    market: &MarketEquilibrium,
    symbol: &Symbol,
    values: &[f64],
) -> Result<Vec<Option<EquilibriumResult>>, MarketError> {
    market.sweep(symbol, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{linear_demand, linear_supply, power_demand, power_supply};
    use approx::assert_relative_eq;
    use market_core::symbols::{A, D};

    #[test]
    fn test_order_preserved_for_many_values() {
        let market = MarketEquilibrium::new()
            .demand(linear_demand(None, Some(2.0)))
            .supply(linear_supply(Some(20.0), Some(3.0)));
        let values: Vec<f64> = (0..64).map(|i| 30.0 + i as f64 * 5.0).collect();
        let results = sweep_parameter(&market, &A, &values).unwrap();

        assert_eq!(results.len(), values.len());
        for (a, result) in values.iter().zip(&results) {
            let price = result.as_ref().unwrap().price().as_f64().unwrap();
            assert_relative_eq!(price, (a - 20.0) / 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sweep_overrides_stored_value() {
        let market = MarketEquilibrium::new()
            .demand(power_demand(Some(100.0), Some(-0.5)))
            .supply(power_supply(Some(1.0), Some(1.5)));
        let results = market.sweep(&D, &[1.5, 1.0]).unwrap();
        // 100 p^-0.5 = p at p = 100^(2/3)
        let price = results[1].as_ref().unwrap().price().as_f64().unwrap();
        assert_relative_eq!(price, 100.0_f64.powf(2.0 / 3.0), max_relative = 1e-9);
    }

    #[test]
    fn test_missing_curve() {
        let market = MarketEquilibrium::new().demand(linear_demand(None, Some(2.0)));
        assert!(market.sweep(&A, &[1.0]).is_err());
        assert!(market.sweep(&A, &[]).is_err());
    }
}
