//! End-to-end properties of the equilibrium and surplus engine.

use approx::assert_relative_eq;
use market_core::symbolic::ParameterBinding;
use market_core::symbols::{A, B, C, D};
use market_equilibrium::curves::{
    exponential_demand, family, linear_demand, linear_supply, power_demand, power_supply,
    quadratic_demand, FamilyDefaults, FunctionType,
};
use market_equilibrium::equilibrium::{
    market_equilibrium, solve_equilibrium, validate_equilibrium, validate_market_functions,
    MarketEquilibrium, Outcome,
};
use market_equilibrium::{EngineConfig, MarketError};
use proptest::prelude::*;

fn value(outcome: &Outcome) -> f64 {
    outcome
        .as_f64()
        .unwrap_or_else(|| panic!("expected a number, got {}", outcome))
}

#[test]
fn test_textbook_linear_market() {
    let demand = linear_demand(Some(100.0), Some(2.0));
    let supply = linear_supply(Some(20.0), Some(3.0));
    let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();

    assert_relative_eq!(value(result.price()), 16.0, epsilon = 1e-12);
    assert_relative_eq!(value(result.quantity()), 68.0, epsilon = 1e-12);
    assert_relative_eq!(value(result.consumer_surplus()), 1156.0, epsilon = 1e-9);
    assert_relative_eq!(value(result.producer_surplus()), 704.0, epsilon = 1e-9);
    assert_relative_eq!(value(result.total_surplus()), 1860.0, epsilon = 1e-9);
    assert!(validate_equilibrium(Some(&result)));
}

#[test]
fn test_symbolic_linear_market_specialises() {
    let symbolic = market_equilibrium(&linear_demand(None, None), &linear_supply(None, None), None)
        .unwrap()
        .unwrap();
    assert!(symbolic.price().is_exact());
    assert!(symbolic.consumer_surplus().is_exact());
    assert!(symbolic.producer_surplus().is_exact());

    let binding = ParameterBinding::new()
        .with(A, 100.0)
        .with(B, 2.0)
        .with(C, 20.0)
        .with(D, 3.0);
    let numeric = symbolic.substitute(&binding);
    assert_relative_eq!(value(numeric.price()), 16.0, max_relative = 1e-9);
    assert_relative_eq!(value(numeric.consumer_surplus()), 1156.0, max_relative = 1e-9);
    assert_relative_eq!(value(numeric.producer_surplus()), 704.0, max_relative = 1e-9);
    assert_relative_eq!(value(numeric.total_surplus()), 1860.0, max_relative = 1e-9);
    assert_eq!(numeric.demand_equation().to_string(), "q = 100 - 2*p");
}

#[test]
fn test_point_evaluations() {
    let demand = power_demand(Some(100.0), Some(-0.5));
    assert_relative_eq!(demand.evaluate(4.0, None).unwrap(), 50.0, epsilon = 1e-12);
    assert!(demand.get_slope(4.0, None).unwrap() < 0.0);

    let demand = quadratic_demand(Some(100.0), Some(0.04));
    assert_relative_eq!(demand.evaluate(10.0, None).unwrap(), 96.0, epsilon = 1e-12);
    assert!(demand.get_slope(10.0, None).unwrap() < 0.0);
}

#[test]
fn test_domain_errors() {
    for function_type in FunctionType::ALL {
        let function = FamilyDefaults::standard().function(function_type);
        let err = function.evaluate(-1.0, None).unwrap_err();
        assert!(err.is_domain(), "{}: {}", function_type, err);
    }
    let err = linear_demand(Some(100.0), Some(2.0))
        .evaluate(60.0, None)
        .unwrap_err();
    assert!(matches!(err, MarketError::Domain(_)));
}

#[test]
fn test_slope_validation() {
    let demand = linear_demand(Some(100.0), Some(2.0));
    let supply = linear_supply(Some(20.0), Some(3.0));
    assert!(validate_market_functions(&demand, &supply, None).is_ok());

    let err = validate_market_functions(&supply, &demand, None).unwrap_err();
    assert!(err.is_economic_constraint());
    assert!(err.to_string().contains("slope"));
    assert!(solve_equilibrium(&supply, &demand, None).is_err());
}

#[test]
fn test_unbounded_consumer_surplus_for_asymptotic_demand() {
    let supply = power_supply(Some(1.0), Some(1.5));
    for demand in [
        power_demand(Some(100.0), Some(-0.5)),
        exponential_demand(Some(0.05), Some(4.6)),
    ] {
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        assert_eq!(*result.consumer_surplus(), Outcome::Unbounded);
        assert_eq!(*result.total_surplus(), Outcome::Unbounded);
        assert!(result.producer_surplus().is_numeric());
    }
}

#[test]
fn test_no_real_solution() {
    // 10 - 2p meets 20 + 3p only at p = -2
    let demand = linear_demand(Some(10.0), Some(2.0));
    let supply = linear_supply(Some(20.0), Some(3.0));
    assert!(market_equilibrium(&demand, &supply, None).unwrap().is_none());
    assert!(solve_equilibrium(&demand, &supply, None).unwrap().is_none());
    assert!(!validate_equilibrium(None));
}

#[test]
fn test_substitution_properties() {
    let demand = linear_demand(None, None);
    let binding = ParameterBinding::new().with(A, 100.0).with(B, 2.0);
    let once = demand.substitute_params(&binding);
    assert_eq!(once.substitute_params(&binding), once);
    assert_eq!(demand.substitute_params(&ParameterBinding::new()), demand);
    assert_eq!(
        demand.equation().subs(&ParameterBinding::new()),
        *demand.equation()
    );
}

#[test]
fn test_family_by_tag() {
    let supply = family("power_supply".parse().unwrap(), Some(1.0), Some(1.5));
    assert_eq!(supply.function_type(), FunctionType::PowerSupply);
    assert!("cubic_supply".parse::<FunctionType>().is_err());
}

#[test]
fn test_custom_reference_price() {
    let config = EngineConfig {
        reference_price: 0.0,
        ..EngineConfig::default()
    };
    // Quadratic demand is flat at p = 0
    let err = MarketEquilibrium::with_config(config)
        .demand(quadratic_demand(Some(100.0), Some(0.04)))
        .supply(linear_supply(Some(20.0), Some(3.0)))
        .solve_numeric()
        .unwrap_err();
    assert!(err.is_economic_constraint());
}

#[test]
fn test_curve_points_default_range() {
    let config = EngineConfig::default();
    let result = market_equilibrium(
        &linear_demand(Some(100.0), Some(2.0)),
        &linear_supply(Some(20.0), Some(3.0)),
        None,
    )
    .unwrap()
    .unwrap();
    let points = result
        .curve_points(config.plot_price_cap, config.plot_samples)
        .unwrap();
    assert_eq!(points.demand.len(), config.plot_samples);
    assert_relative_eq!(points.demand.last().unwrap().0, 32.0, epsilon = 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_linear_market_closed_form(
        a in 10.0f64..1000.0,
        b in 0.1f64..10.0,
        c_ratio in 0.0f64..0.9,
        d in 0.1f64..10.0,
    ) {
        let c = a * c_ratio;
        let demand = linear_demand(Some(a), Some(b));
        let supply = linear_supply(Some(c), Some(d));
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();

        let price = (a - c) / (b + d);
        let quantity = (a * d + b * c) / (b + d);
        let (p, q) = result.numeric_point().unwrap();
        prop_assert!((p - price).abs() <= 1e-9 * price.max(1.0));
        prop_assert!((q - quantity).abs() <= 1e-9 * quantity.max(1.0));

        // Triangle areas
        let cs = value(result.consumer_surplus());
        let ps = value(result.producer_surplus());
        let expected_cs = quantity * quantity / (2.0 * b);
        let expected_ps = (quantity * quantity - c * c) / (2.0 * d);
        prop_assert!((cs - expected_cs).abs() <= 1e-7 * expected_cs.max(1.0));
        prop_assert!((ps - expected_ps).abs() <= 1e-7 * expected_ps.max(1.0));
        prop_assert!(cs > 0.0);
        prop_assert!(validate_equilibrium(Some(&result)));
    }

    #[test]
    fn prop_substitution_is_idempotent(
        a in -100.0f64..100.0,
        b in -10.0f64..10.0,
    ) {
        let binding = ParameterBinding::new().with(A, a).with(B, b);
        let demand = linear_demand(None, None);
        let once = demand.substitute_params(&binding);
        prop_assert_eq!(once.substitute_params(&binding), once);
    }
}
