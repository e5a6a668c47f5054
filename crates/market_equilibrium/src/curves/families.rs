//! Curve-family constructors.
//!
//! Each constructor takes the family's two parameters in order; `None`
//! leaves a parameter symbolic so it can be supplied at evaluation or solve
//! time.

use super::{FunctionType, MarketFunction};
use market_core::symbolic::ParameterBinding;

/// Build a market function of any family.
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::{family, FunctionType};
///
/// let supply = family(FunctionType::QuadraticSupply, Some(0.0), Some(0.04));
/// assert!((supply.evaluate(10.0, None).unwrap() - 4.0).abs() < 1e-12);
/// ```
pub fn family(
    function_type: FunctionType,
    first: Option<f64>,
    second: Option<f64>,
) -> MarketFunction {
    let [first_symbol, second_symbol] = function_type.parameter_symbols();
    let mut binding = ParameterBinding::new();
    if let Some(value) = first {
        binding.insert(first_symbol, value);
    }
    if let Some(value) = second {
        binding.insert(second_symbol, value);
    }
    MarketFunction::from_family(function_type, binding)
}

/// `q = a - b*p`
pub fn linear_demand(a: Option<f64>, b: Option<f64>) -> MarketFunction {
    family(FunctionType::LinearDemand, a, b)
}

/// `q = a*p^b`
pub fn power_demand(a: Option<f64>, b: Option<f64>) -> MarketFunction {
    family(FunctionType::PowerDemand, a, b)
}

/// `q = exp(-a*p + b)`
pub fn exponential_demand(a: Option<f64>, b: Option<f64>) -> MarketFunction {
    family(FunctionType::ExponentialDemand, a, b)
}

/// `q = a - b*p^2`
pub fn quadratic_demand(a: Option<f64>, b: Option<f64>) -> MarketFunction {
    family(FunctionType::QuadraticDemand, a, b)
}

/// `q = c + d*p`
pub fn linear_supply(c: Option<f64>, d: Option<f64>) -> MarketFunction {
    family(FunctionType::LinearSupply, c, d)
}

/// `q = c*p^d`
pub fn power_supply(c: Option<f64>, d: Option<f64>) -> MarketFunction {
    family(FunctionType::PowerSupply, c, d)
}

/// `q = exp(c*p + d)`
pub fn exponential_supply(c: Option<f64>, d: Option<f64>) -> MarketFunction {
    family(FunctionType::ExponentialSupply, c, d)
}

/// `q = c + d*p^2`
pub fn quadratic_supply(c: Option<f64>, d: Option<f64>) -> MarketFunction {
    family(FunctionType::QuadraticSupply, c, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use market_core::symbols::{A, B, C, D};

    #[test]
    fn test_constructors_store_given_values_only() {
        let demand = linear_demand(Some(100.0), None);
        assert_eq!(demand.parameters().get(&A), Some(100.0));
        assert!(!demand.parameters().contains(&B));

        let supply = power_supply(None, Some(1.5));
        assert_eq!(supply.parameters().get(&D), Some(1.5));
        assert!(!supply.parameters().contains(&C));
    }

    #[test]
    fn test_constructors_tag_family() {
        assert_eq!(
            exponential_demand(None, None).function_type(),
            FunctionType::ExponentialDemand
        );
        assert_eq!(
            quadratic_supply(None, None).function_type(),
            FunctionType::QuadraticSupply
        );
    }

    #[test]
    fn test_exponential_families() {
        let demand = exponential_demand(Some(0.05), Some(4.6));
        assert_relative_eq!(
            demand.evaluate(10.0, None).unwrap(),
            (4.1_f64).exp(),
            max_relative = 1e-12
        );
        assert!(demand.get_slope(10.0, None).unwrap() < 0.0);

        let supply = exponential_supply(Some(0.05), Some(0.0));
        assert_relative_eq!(supply.evaluate(0.0, None).unwrap(), 1.0, epsilon = 1e-12);
        assert!(supply.get_slope(10.0, None).unwrap() > 0.0);
    }

    #[test]
    fn test_power_supply_slope() {
        let supply = power_supply(Some(1.0), Some(1.5));
        assert_relative_eq!(supply.evaluate(4.0, None).unwrap(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(supply.get_slope(4.0, None).unwrap(), 3.0, epsilon = 1e-12);
    }
}
