//! Economic sanity checks on curves and results.

use super::EquilibriumResult;
use crate::config::EngineConfig;
use crate::curves::MarketFunction;
use crate::MarketError;
use market_core::symbolic::ParameterBinding;
use tracing::debug;

/// Check slope directions at the default reference price.
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::{linear_demand, linear_supply};
/// use market_equilibrium::equilibrium::validate_market_functions;
///
/// let demand = linear_demand(Some(100.0), Some(2.0));
/// let supply = linear_supply(Some(20.0), Some(3.0));
/// assert!(validate_market_functions(&demand, &supply, None).is_ok());
///
/// let err = validate_market_functions(&supply, &demand, None).unwrap_err();
/// assert!(err.to_string().contains("Demand curve must have negative slope"));
/// ```
///
/// # Errors
///
/// See [`validate_market_functions_at`].
pub fn validate_market_functions(
    demand: &MarketFunction,
    supply: &MarketFunction,
    params: Option<&ParameterBinding>,
) -> Result<(), MarketError> {
    validate_market_functions_at(
        demand,
        supply,
        params,
        EngineConfig::default().reference_price,
    )
}

/// Check that demand slopes down and supply slopes up at `reference_price`.
///
/// # Errors
///
/// * `MarketError::EconomicConstraint` - Demand slope is not strictly
///   negative, or supply slope is not strictly positive
/// * `MarketError::Symbolic` - A parameter has no value
pub fn validate_market_functions_at(
    demand: &MarketFunction,
    supply: &MarketFunction,
    params: Option<&ParameterBinding>,
    reference_price: f64,
) -> Result<(), MarketError> {
    let demand_slope = demand.get_slope(reference_price, params)?;
    if demand_slope.is_nan() || demand_slope >= 0.0 {
        return Err(MarketError::EconomicConstraint(
            "Demand curve must have negative slope".to_string(),
        ));
    }
    let supply_slope = supply.get_slope(reference_price, params)?;
    if supply_slope.is_nan() || supply_slope <= 0.0 {
        return Err(MarketError::EconomicConstraint(
            "Supply curve must have positive slope".to_string(),
        ));
    }
    debug!(demand_slope, supply_slope, reference_price, "Slope check passed");
    Ok(())
}

/// Advisory sanity check of a result.
///
/// False when the result is absent, price or quantity is negative, or a
/// surplus field is negative. Closed forms are judged by their structural
/// sign; `Unbounded` and `Undetermined` pass.
pub fn validate_equilibrium(result: Option<&EquilibriumResult>) -> bool {
    let Some(result) = result else {
        return false;
    };
    let fields = [
        result.price(),
        result.quantity(),
        result.consumer_surplus(),
        result.producer_surplus(),
    ];
    !fields.iter().any(|field| field.is_negative())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{
        exponential_demand, linear_demand, linear_supply, power_demand, power_supply,
        quadratic_demand, quadratic_supply,
    };
    use crate::equilibrium::market_equilibrium;
    use market_core::symbols::{A, B, C, D};

    #[test]
    fn test_valid_families_pass() {
        let pairs = [
            (linear_demand(Some(100.0), Some(2.0)), linear_supply(Some(20.0), Some(3.0))),
            (power_demand(Some(100.0), Some(-0.5)), power_supply(Some(1.0), Some(1.5))),
            (quadratic_demand(Some(100.0), Some(0.04)), quadratic_supply(Some(0.0), Some(0.04))),
        ];
        for (demand, supply) in &pairs {
            assert!(validate_market_functions(demand, supply, None).is_ok());
        }
    }

    #[test]
    fn test_swapped_pair_fails_with_demand_message() {
        let demand = linear_demand(Some(100.0), Some(2.0));
        let supply = linear_supply(Some(20.0), Some(3.0));
        let err = validate_market_functions(&supply, &demand, None).unwrap_err();
        assert_eq!(
            err,
            MarketError::EconomicConstraint("Demand curve must have negative slope".to_string())
        );
    }

    #[test]
    fn test_flat_supply_fails_with_supply_message() {
        let demand = exponential_demand(Some(0.05), Some(4.6));
        let supply = linear_supply(Some(20.0), Some(0.0));
        let err = validate_market_functions(&demand, &supply, None).unwrap_err();
        assert!(err.is_economic_constraint());
        assert!(err.to_string().contains("Supply curve must have positive slope"));
    }

    #[test]
    fn test_call_time_params_and_reference_price() {
        // Upward-sloping "demand" q = 100 - b p with b < 0
        let demand = linear_demand(Some(100.0), None);
        let supply = linear_supply(Some(20.0), Some(3.0));
        let params = ParameterBinding::new().with(B, -1.0);
        assert!(validate_market_functions(&demand, &supply, Some(&params)).is_err());

        // Quadratic demand is flat at p = 0
        let demand = quadratic_demand(Some(100.0), Some(0.04));
        assert!(validate_market_functions_at(&demand, &supply, None, 0.0).is_err());
        assert!(validate_market_functions_at(&demand, &supply, None, 5.0).is_ok());
    }

    #[test]
    fn test_unbound_parameter_is_symbolic_error() {
        let demand = linear_demand(Some(100.0), None);
        let supply = linear_supply(Some(20.0), Some(3.0));
        let err = validate_market_functions(&demand, &supply, None).unwrap_err();
        assert!(matches!(err, MarketError::Symbolic(_)));
    }

    #[test]
    fn test_validate_equilibrium() {
        assert!(!validate_equilibrium(None));

        let demand = linear_demand(Some(100.0), Some(2.0));
        let supply = linear_supply(Some(20.0), Some(3.0));
        let result = market_equilibrium(&demand, &supply, None).unwrap();
        assert!(validate_equilibrium(result.as_ref()));

        // Unbounded consumer surplus is accepted
        let demand = power_demand(Some(100.0), Some(-0.5));
        let supply = power_supply(Some(1.0), Some(1.5));
        let result = market_equilibrium(&demand, &supply, None).unwrap();
        assert!(validate_equilibrium(result.as_ref()));

        // Symbolic result of unknown sign is accepted
        let (demand, supply) = (linear_demand(None, None), linear_supply(None, None));
        let result = market_equilibrium(&demand, &supply, None).unwrap();
        assert!(validate_equilibrium(result.as_ref()));
    }

    #[test]
    fn test_validate_equilibrium_rejects_negative_price() {
        let (demand, supply) = (linear_demand(None, None), linear_supply(None, None));
        let symbolic = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        // a < c puts the intersection at a negative price
        let binding = ParameterBinding::new()
            .with(A, 10.0)
            .with(B, 2.0)
            .with(C, 20.0)
            .with(D, 3.0);
        assert!(!validate_equilibrium(Some(&symbolic.substitute(&binding))));
    }

    #[test]
    fn test_validate_equilibrium_rejects_negative_producer_surplus() {
        // Downward-sloping supply q = 80 - p meets 100 - 2p at p = 20, q = 60,
        // below the price where supply starts
        let demand = linear_demand(Some(100.0), Some(2.0));
        let supply = linear_supply(Some(80.0), Some(-1.0));
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        let (price, quantity) = result.numeric_point().unwrap();
        assert!((price - 20.0).abs() < 1e-9);
        assert!((quantity - 60.0).abs() < 1e-9);
        let producer = result.producer_surplus().as_f64().unwrap();
        assert!((producer + 1800.0).abs() < 1e-9, "got {}", producer);
        assert!(result.consumer_surplus().as_f64().unwrap() > 0.0);
        assert!(!validate_equilibrium(Some(&result)));
    }

    #[test]
    fn test_validate_equilibrium_rejects_negative_consumer_surplus() {
        let (demand, supply) = (linear_demand(None, None), linear_supply(None, None));
        let symbolic = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        // b < 0 keeps p = 40 and q = 140 but flips the sign of the demand area
        let binding = ParameterBinding::new()
            .with(A, 100.0)
            .with(B, -1.0)
            .with(C, 20.0)
            .with(D, 3.0);
        let result = symbolic.substitute(&binding);
        let (price, quantity) = result.numeric_point().unwrap();
        assert!((price - 40.0).abs() < 1e-9);
        assert!((quantity - 140.0).abs() < 1e-9);
        let consumer = result.consumer_surplus().as_f64().unwrap();
        assert!((consumer + 9800.0).abs() < 1e-6, "got {}", consumer);
        assert!(!validate_equilibrium(Some(&result)));
    }
}
