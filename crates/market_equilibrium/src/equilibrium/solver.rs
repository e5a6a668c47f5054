//! Equilibrium solver.
//!
//! Demand is made explicit in quantity, substituted into supply, and the
//! resulting single equation is solved for price. If no closed form exists
//! and every parameter is numeric, `D(p) − S(p)` is scanned on a log-spaced
//! grid and each sign change refined with Brent's method.
//!
//! Candidate selection: numeric pairs must be finite and non-negative and
//! the smallest price wins (then the smallest quantity); symbolic pairs must
//! not be provably negative and keep their enumeration order, with a
//! provably non-negative price preferred.

use super::surplus::{self, explicit, is_numeric_in, numeric_fn};
use super::validation::validate_market_functions_at;
use super::EquilibriumResult;
use crate::config::EngineConfig;
use crate::curves::{MarketFunction, TypedEquation};
use crate::roots::is_admissible;
use crate::MarketError;
use market_core::symbolic::{Expr, ParameterBinding, Symbol};
use market_core::symbols::{PRICE, QUANTITY};
use market_core::types::SymbolicError;
use tracing::{debug, warn};

/// Builder for a market equilibrium computation.
///
/// # Example
///
/// ```
/// use market_core::symbols::A;
/// use market_equilibrium::curves::{linear_demand, linear_supply};
/// use market_equilibrium::equilibrium::MarketEquilibrium;
///
/// let result = MarketEquilibrium::new()
///     .demand(linear_demand(None, Some(2.0)))
///     .supply(linear_supply(Some(20.0), Some(3.0)))
///     .parameter(A, 100.0)
///     .solve()
///     .unwrap()
///     .expect("linear markets clear");
///
/// let (price, quantity) = result.numeric_point().unwrap();
/// assert!((price - 16.0).abs() < 1e-12);
/// assert!((quantity - 68.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarketEquilibrium {
    demand: Option<MarketFunction>,
    supply: Option<MarketFunction>,
    parameters: ParameterBinding,
    config: EngineConfig,
}

impl MarketEquilibrium {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the demand curve.
    pub fn demand(mut self, demand: MarketFunction) -> Self {
        self.demand = Some(demand);
        self
    }

    /// Set the supply curve.
    pub fn supply(mut self, supply: MarketFunction) -> Self {
        self.supply = Some(supply);
        self
    }

    /// Replace the call-time parameter values.
    pub fn parameters(mut self, parameters: ParameterBinding) -> Self {
        self.parameters = parameters;
        self
    }

    /// Add one call-time parameter value.
    pub fn parameter(mut self, symbol: Symbol, value: impl Into<f64>) -> Self {
        self.parameters.insert(symbol, value);
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the call-time parameter values.
    pub fn parameter_values(&self) -> &ParameterBinding {
        &self.parameters
    }

    pub(crate) fn curves(&self) -> Result<(&MarketFunction, &MarketFunction), MarketError> {
        let demand = self
            .demand
            .as_ref()
            .ok_or_else(|| MarketError::Validation("Demand curve is required".to_string()))?;
        let supply = self
            .supply
            .as_ref()
            .ok_or_else(|| MarketError::Validation("Supply curve is required".to_string()))?;
        Ok((demand, supply))
    }

    /// Solve for the equilibrium and its surplus measures.
    ///
    /// Slopes are not checked, so partially symbolic curves are accepted.
    ///
    /// # Errors
    ///
    /// * `MarketError::Validation` - A curve is missing or the configuration
    ///   is invalid
    ///
    /// No admissible intersection is `Ok(None)`, not an error.
    pub fn solve(&self) -> Result<Option<EquilibriumResult>, MarketError> {
        self.config.validate()?;
        self.solve_with(&self.parameters)
    }

    pub(crate) fn solve_with(
        &self,
        parameters: &ParameterBinding,
    ) -> Result<Option<EquilibriumResult>, MarketError> {
        let (demand, supply) = self.curves()?;
        let demand_equation = demand.bound_equation(Some(parameters));
        let supply_equation = supply.bound_equation(Some(parameters));

        let Some((price, quantity)) = self.equilibrium_point(&demand_equation, &supply_equation)
        else {
            return Ok(None);
        };
        debug!(%price, %quantity, "Equilibrium found");

        let analysis = surplus::analyse(
            &demand_equation,
            &supply_equation,
            &price,
            &quantity,
            &self.config,
        );
        Ok(Some(EquilibriumResult::assemble(
            &price,
            &quantity,
            demand_equation,
            supply_equation,
            analysis,
        )))
    }

    /// Check that demand slopes down and supply slopes up at the configured
    /// reference price.
    ///
    /// # Errors
    ///
    /// * `MarketError::Validation` - A curve is missing
    /// * `MarketError::EconomicConstraint` - A slope has the wrong sign
    /// * `MarketError::Symbolic` - A parameter has no value
    pub fn validate(&self) -> Result<(), MarketError> {
        let (demand, supply) = self.curves()?;
        validate_market_functions_at(
            demand,
            supply,
            Some(&self.parameters),
            self.config.reference_price,
        )
    }

    /// Validate the curves, then solve for a numeric `(price, quantity)`.
    ///
    /// # Errors
    ///
    /// Everything [`MarketEquilibrium::validate`] and
    /// [`MarketEquilibrium::solve`] report, plus `MarketError::Validation`
    /// if the equilibrium is not fully numeric.
    pub fn solve_numeric(&self) -> Result<Option<(f64, f64)>, MarketError> {
        self.validate()?;
        let Some(result) = self.solve()? else {
            return Ok(None);
        };
        result.numeric_point().map(Some).ok_or_else(|| {
            MarketError::Validation(format!(
                "Equilibrium is not numeric: price {}, quantity {}",
                result.price(),
                result.quantity()
            ))
        })
    }

    fn equilibrium_point(
        &self,
        demand: &TypedEquation,
        supply: &TypedEquation,
    ) -> Option<(Expr, Expr)> {
        let demand_quantity = explicit(demand, &QUANTITY)?;
        let reduced = supply.replace_all(&[(QUANTITY, demand_quantity.clone())]);

        let candidates = match reduced.solve_for(&PRICE) {
            Ok(prices) => prices
                .into_iter()
                .map(|price| {
                    let quantity = demand_quantity.replace(&PRICE, &price);
                    (price, quantity)
                })
                .collect(),
            Err(SymbolicError::Indeterminate { .. }) => {
                warn!(%demand, %supply, "Demand and supply coincide; no unique equilibrium");
                return None;
            }
            Err(error) => {
                debug!(%error, "No closed-form equilibrium; scanning numerically");
                self.scan(&demand_quantity, supply)
            }
        };

        let chosen = select_candidate(candidates);
        if chosen.is_none() {
            warn!(%demand, %supply, "No admissible equilibrium");
        }
        chosen
    }

    fn scan(&self, demand_quantity: &Expr, supply: &TypedEquation) -> Vec<(Expr, Expr)> {
        let Some(supply_quantity) = explicit(supply, &QUANTITY) else {
            return Vec::new();
        };
        if !is_numeric_in(demand_quantity, &PRICE) || !is_numeric_in(&supply_quantity, &PRICE) {
            warn!("Numeric scan needs every parameter bound");
            return Vec::new();
        }
        let excess = (demand_quantity.clone() - supply_quantity).simplify();
        let demand_at = numeric_fn(demand_quantity, PRICE);
        self.config
            .scanner()
            .find_roots(numeric_fn(&excess, PRICE))
            .into_iter()
            .map(|price| (Expr::Num(price), Expr::Num(demand_at(price))))
            .collect()
    }
}

fn select_candidate(candidates: Vec<(Expr, Expr)>) -> Option<(Expr, Expr)> {
    let all_numeric = candidates
        .iter()
        .all(|(p, q)| p.is_constant() && q.is_constant());

    if all_numeric {
        return candidates
            .iter()
            .filter_map(|(p, q)| Some((p.eval_constant().ok()?, q.eval_constant().ok()?)))
            .filter(|(p, q)| is_admissible(*p) && is_admissible(*q))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
            .map(|(p, q)| (Expr::Num(p), Expr::Num(q)));
    }

    let admissible: Vec<(Expr, Expr)> = candidates
        .into_iter()
        .filter(|(p, q)| !p.sign().is_negative() && !q.sign().is_negative())
        .collect();
    let preferred = admissible
        .iter()
        .position(|(p, _)| p.sign().is_non_negative())
        .unwrap_or(0);
    admissible.into_iter().nth(preferred)
}

/// Solve a market.
///
/// `params` is merged over each curve's stored values and applied to both
/// equations before solving. Slopes are not checked.
///
/// # Errors
///
/// * `MarketError::Validation` - Default configuration rejected (never in
///   practice)
pub fn market_equilibrium(
    demand: &MarketFunction,
    supply: &MarketFunction,
    params: Option<&ParameterBinding>,
) -> Result<Option<EquilibriumResult>, MarketError> {
    MarketEquilibrium::new()
        .demand(demand.clone())
        .supply(supply.clone())
        .parameters(params.cloned().unwrap_or_default())
        .solve()
}

/// Check slopes, then solve for a numeric `(price, quantity)`.
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::{linear_demand, linear_supply};
/// use market_equilibrium::equilibrium::solve_equilibrium;
///
/// let demand = linear_demand(Some(100.0), Some(2.0));
/// let supply = linear_supply(Some(20.0), Some(3.0));
/// let (price, quantity) = solve_equilibrium(&demand, &supply, None).unwrap().unwrap();
/// assert!((price - 16.0).abs() < 1e-12);
/// assert!((quantity - 68.0).abs() < 1e-12);
///
/// // Swapped roles violate the slope directions
/// assert!(solve_equilibrium(&supply, &demand, None).is_err());
/// ```
///
/// # Errors
///
/// * `MarketError::EconomicConstraint` - Demand does not slope down or
///   supply does not slope up at the reference price
/// * `MarketError::Symbolic` - A parameter has no value
pub fn solve_equilibrium(
    demand: &MarketFunction,
    supply: &MarketFunction,
    params: Option<&ParameterBinding>,
) -> Result<Option<(f64, f64)>, MarketError> {
    MarketEquilibrium::new()
        .demand(demand.clone())
        .supply(supply.clone())
        .parameters(params.cloned().unwrap_or_default())
        .solve_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{
        exponential_demand, exponential_supply, linear_demand, linear_supply, power_demand,
        power_supply, quadratic_demand, quadratic_supply, FamilyDefaults, FunctionType,
    };
    use approx::assert_relative_eq;
    use market_core::symbols::{A, B, C, D};

    #[test]
    fn test_missing_curve_is_validation_error() {
        let err = MarketEquilibrium::new()
            .demand(linear_demand(Some(100.0), Some(2.0)))
            .solve()
            .unwrap_err();
        assert_eq!(err, MarketError::Validation("Supply curve is required".to_string()));

        let err = MarketEquilibrium::new().solve().unwrap_err();
        assert!(err.to_string().contains("Demand curve is required"));
    }

    #[test]
    fn test_symbolic_linear_closed_form() {
        let demand = linear_demand(None, None);
        let supply = linear_supply(None, None);
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        let price = result.price().as_expr().unwrap();
        let (a, b, c, d) = (Expr::from(A), Expr::from(B), Expr::from(C), Expr::from(D));
        let expected = ((a - c) / (b + d)).simplify();
        assert_eq!(price, expected);
        assert!(result.quantity().is_exact());
        assert!(result.consumer_surplus().is_exact());
    }

    #[test]
    fn test_params_override_stored_values() {
        let demand = linear_demand(Some(100.0), Some(2.0));
        let supply = linear_supply(Some(20.0), Some(3.0));
        let params = ParameterBinding::new().with(A, 120.0);
        let result = market_equilibrium(&demand, &supply, Some(&params))
            .unwrap()
            .unwrap();
        let (price, quantity) = result.numeric_point().unwrap();
        assert_relative_eq!(price, 20.0, epsilon = 1e-12);
        assert_relative_eq!(quantity, 80.0, epsilon = 1e-12);
    }

    #[test]
    fn test_every_default_pairing_clears() {
        let defaults = FamilyDefaults::standard();
        let demands = FunctionType::ALL.into_iter().filter(FunctionType::is_demand);
        for demand_type in demands {
            for supply_type in FunctionType::ALL.into_iter().filter(FunctionType::is_supply) {
                let demand = defaults.function(demand_type);
                let supply = defaults.function(supply_type);
                let (price, quantity) = solve_equilibrium(&demand, &supply, None)
                    .unwrap()
                    .unwrap_or_else(|| panic!("{} / {} did not clear", demand_type, supply_type));
                assert!(price > 0.0 && quantity > 0.0);
                // Both curves agree at the equilibrium
                assert_relative_eq!(
                    demand.evaluate(price, None).unwrap(),
                    supply.evaluate(price, None).unwrap(),
                    max_relative = 1e-8
                );
            }
        }
    }

    #[test]
    fn test_quadratic_pair_picks_positive_branch() {
        let demand = quadratic_demand(Some(100.0), Some(0.04));
        let supply = quadratic_supply(Some(0.0), Some(0.04));
        let (price, quantity) = solve_equilibrium(&demand, &supply, None).unwrap().unwrap();
        assert_relative_eq!(price, 1250.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(quantity, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_numeric_scan_fallback() {
        // 100 p^-0.5 = exp(0.05 p) has no closed form
        let demand = power_demand(Some(100.0), Some(-0.5));
        let supply = exponential_supply(Some(0.05), Some(0.0));
        let (price, quantity) = solve_equilibrium(&demand, &supply, None).unwrap().unwrap();
        assert_relative_eq!(quantity, 100.0 / price.sqrt(), max_relative = 1e-9);
        assert_relative_eq!(quantity, (0.05 * price).exp(), max_relative = 1e-8);
    }

    #[test]
    fn test_symbolic_system_without_closed_form_has_no_equilibrium() {
        let demand = power_demand(None, Some(-0.5));
        let supply = exponential_supply(Some(0.05), Some(0.0));
        assert!(market_equilibrium(&demand, &supply, None).unwrap().is_none());
    }

    #[test]
    fn test_no_real_solution_is_none() {
        // 10 - p^2 never meets 20 + p^2 on the real line
        let demand = quadratic_demand(Some(10.0), Some(1.0));
        let supply = quadratic_supply(Some(20.0), Some(1.0));
        assert!(market_equilibrium(&demand, &supply, None).unwrap().is_none());
    }

    #[test]
    fn test_negative_intersection_is_rejected() {
        // 10 - 2p = 20 + 3p at p = -2
        let demand = linear_demand(Some(10.0), Some(2.0));
        let supply = linear_supply(Some(20.0), Some(3.0));
        assert!(market_equilibrium(&demand, &supply, None).unwrap().is_none());
    }

    #[test]
    fn test_identical_curves_have_no_equilibrium() {
        let demand = linear_demand(Some(100.0), Some(2.0));
        assert!(market_equilibrium(&demand, &demand, None).unwrap().is_none());
    }

    #[test]
    fn test_exponential_pair() {
        let demand = exponential_demand(Some(0.05), Some(4.6));
        let supply = exponential_supply(Some(0.05), Some(0.0));
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        let (price, quantity) = result.numeric_point().unwrap();
        assert_relative_eq!(price, 46.0, epsilon = 1e-9);
        assert_relative_eq!(quantity, 2.3_f64.exp(), epsilon = 1e-9);
        assert!(result.consumer_surplus().is_unbounded());
        assert!(result.producer_surplus().is_numeric());
    }

    #[test]
    fn test_power_pair() {
        let demand = power_demand(Some(100.0), Some(-0.5));
        let supply = power_supply(Some(1.0), Some(1.5));
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        assert_relative_eq!(result.price().as_f64().unwrap(), 10.0, epsilon = 1e-9);
        assert!(result.total_surplus().is_unbounded());
    }

    #[test]
    fn test_select_candidate_policies() {
        let numeric = vec![
            (Expr::Num(-2.0), Expr::Num(5.0)),
            (Expr::Num(9.0), Expr::Num(1.0)),
            (Expr::Num(4.0), Expr::Num(3.0)),
            (Expr::Num(f64::NAN), Expr::Num(1.0)),
        ];
        assert_eq!(
            select_candidate(numeric),
            Some((Expr::Num(4.0), Expr::Num(3.0)))
        );

        let root = Expr::from(A).sqrt().simplify();
        let symbolic = vec![
            ((-root.clone()).simplify(), Expr::from(B)),
            (root.clone(), Expr::from(B)),
        ];
        assert_eq!(select_candidate(symbolic), Some((root, Expr::from(B))));
        assert_eq!(select_candidate(Vec::new()), None);
    }

    #[test]
    fn test_solve_numeric_requires_bound_parameters() {
        // The slope of a - 2p does not depend on a, so only the solve notices
        let err = MarketEquilibrium::new()
            .demand(linear_demand(None, Some(2.0)))
            .supply(linear_supply(Some(20.0), Some(3.0)))
            .solve_numeric()
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(ref m) if m.contains("not numeric")));

        // Supply slope d is needed by the check
        let err = MarketEquilibrium::new()
            .demand(linear_demand(Some(100.0), Some(2.0)))
            .supply(linear_supply(Some(20.0), None))
            .solve_numeric()
            .unwrap_err();
        assert!(matches!(err, MarketError::Symbolic(ref e) if e.is_unbound()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            scan_samples: 1,
            ..EngineConfig::default()
        };
        let err = MarketEquilibrium::with_config(config)
            .demand(linear_demand(Some(100.0), Some(2.0)))
            .supply(linear_supply(Some(20.0), Some(3.0)))
            .solve()
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }
}
