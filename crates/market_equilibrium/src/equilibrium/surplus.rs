//! Consumer, producer and total surplus.
//!
//! The quantity-domain integrals are the reference definition:
//!
//! - `CS = ∫₀^{q*} (P_d(q) − p*) dq`
//! - `PS = ∫_{q_f}^{q*} (p* − P_s(q)) dq + (p* − p_min)·q_f`, with
//!   `q_f = S(p_min)`
//!
//! When the quantity-domain route has no closed form the equivalent
//! price-domain integral is tried, then adaptive Simpson quadrature for
//! fully numeric integrands. Each field degrades on its own.

use super::Outcome;
use crate::config::EngineConfig;
use crate::curves::{MarketFunction, TypedEquation};
use crate::roots::{first_admissible, largest_admissible, smallest_admissible};
use market_core::math::quadrature::AdaptiveSimpson;
use market_core::symbolic::{solve, Expr, ParameterBinding, Symbol};
use market_core::symbols::{PRICE, QUANTITY};
use tracing::{debug, warn};

/// Consumer, producer and total surplus of one equilibrium.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurplusBreakdown {
    /// Area between inverse demand and the equilibrium price.
    pub consumer: Outcome,
    /// Area between the equilibrium price and inverse supply.
    pub producer: Outcome,
    /// Sum of both, or the dominating sentinel.
    pub total: Outcome,
}

/// Everything the surplus step derives from a pair of bound equations.
#[derive(Debug, Clone)]
pub(crate) struct SurplusAnalysis {
    pub inverse_demand: Outcome,
    pub inverse_supply: Outcome,
    pub surplus: SurplusBreakdown,
}

/// Surplus at a known numeric equilibrium.
///
/// `params` is merged over each curve's stored values. Uses the default
/// [`EngineConfig`]; see [`calculate_surpluses_with`] to override it.
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::{linear_demand, linear_supply};
/// use market_equilibrium::equilibrium::calculate_surpluses;
///
/// let demand = linear_demand(Some(100.0), Some(2.0));
/// let supply = linear_supply(Some(20.0), Some(3.0));
///
/// let surplus = calculate_surpluses(&demand, &supply, 16.0, 68.0, None);
/// let cs = surplus.consumer.as_f64().unwrap();
/// let ps = surplus.producer.as_f64().unwrap();
/// assert!((cs - 1156.0).abs() < 1e-9);
/// assert!((ps - 704.0).abs() < 1e-9);
/// assert!((surplus.total.as_f64().unwrap() - 1860.0).abs() < 1e-9);
/// ```
pub fn calculate_surpluses(
    demand: &MarketFunction,
    supply: &MarketFunction,
    eq_price: f64,
    eq_quantity: f64,
    params: Option<&ParameterBinding>,
) -> SurplusBreakdown {
    calculate_surpluses_with(
        demand,
        supply,
        eq_price,
        eq_quantity,
        params,
        &EngineConfig::default(),
    )
}

/// [`calculate_surpluses`] with an explicit engine configuration.
pub fn calculate_surpluses_with(
    demand: &MarketFunction,
    supply: &MarketFunction,
    eq_price: f64,
    eq_quantity: f64,
    params: Option<&ParameterBinding>,
    config: &EngineConfig,
) -> SurplusBreakdown {
    analyse(
        &demand.bound_equation(params),
        &supply.bound_equation(params),
        &Expr::Num(eq_price),
        &Expr::Num(eq_quantity),
        config,
    )
    .surplus
}

pub(crate) fn analyse(
    demand: &TypedEquation,
    supply: &TypedEquation,
    price: &Expr,
    quantity: &Expr,
    config: &EngineConfig,
) -> SurplusAnalysis {
    let inverse_demand = explicit(demand, &PRICE);
    let inverse_supply = explicit(supply, &PRICE);
    let demand_quantity = explicit(demand, &QUANTITY);
    let supply_quantity = explicit(supply, &QUANTITY);

    let consumer = consumer_surplus(
        inverse_demand.as_ref(),
        demand_quantity.as_ref(),
        price,
        quantity,
        config,
    );
    let producer = producer_surplus(
        inverse_supply.as_ref(),
        supply_quantity.as_ref(),
        price,
        quantity,
        config,
    );
    let total = total_surplus(&consumer, &producer);

    SurplusAnalysis {
        inverse_demand: inverse_demand.map_or(Outcome::Undetermined, Outcome::from_expr),
        inverse_supply: inverse_supply.map_or(Outcome::Undetermined, Outcome::from_expr),
        surplus: SurplusBreakdown {
            consumer,
            producer,
            total,
        },
    }
}

/// Solve `equation` for `var`, keeping the first admissible branch.
pub(crate) fn explicit(equation: &TypedEquation, var: &Symbol) -> Option<Expr> {
    match equation.solve_for(var) {
        Ok(candidates) => {
            let chosen = first_admissible(&candidates);
            if chosen.is_none() {
                warn!(%equation, variable = %var, "No admissible branch when inverting curve");
            }
            chosen
        }
        Err(error) => {
            warn!(%equation, variable = %var, %error, "Failed to invert curve");
            None
        }
    }
}

/// Returns true if `var` is the only free symbol of `expr`.
pub(crate) fn is_numeric_in(expr: &Expr, var: &Symbol) -> bool {
    expr.free_symbols().iter().all(|s| s == var)
}

/// `expr` as a plain function of `var`; NaN where evaluation fails.
pub(crate) fn numeric_fn(expr: &Expr, var: Symbol) -> impl Fn(f64) -> f64 + '_ {
    move |x| {
        expr.eval(&ParameterBinding::new().with(var.clone(), x))
            .unwrap_or(f64::NAN)
    }
}

enum ChokePrice {
    At(Expr),
    Absent,
    Unknown,
}

/// Lowest price at which demand reaches zero.
fn choke_price(demand_quantity: &Expr, config: &EngineConfig) -> ChokePrice {
    match solve(demand_quantity, &Expr::zero(), &PRICE) {
        Ok(roots) if roots.iter().all(Expr::is_constant) => {
            let values = roots.iter().filter_map(|r| r.eval_constant().ok());
            smallest_admissible(values).map_or(ChokePrice::Absent, |p| ChokePrice::At(Expr::Num(p)))
        }
        Ok(roots) => first_admissible(&roots).map_or(ChokePrice::Absent, ChokePrice::At),
        Err(error) if is_numeric_in(demand_quantity, &PRICE) => {
            debug!(%error, "Scanning for choke price");
            let roots = config.scanner().find_roots(numeric_fn(demand_quantity, PRICE));
            smallest_admissible(roots).map_or(ChokePrice::Absent, |p| ChokePrice::At(Expr::Num(p)))
        }
        Err(error) => {
            warn!(%error, "Choke price cannot be determined");
            ChokePrice::Unknown
        }
    }
}

/// Largest numeric price at which supply vanishes, else zero.
///
/// Symbolic roots of unknown sign do not bind the floor.
fn floor_price(supply_quantity: &Expr, config: &EngineConfig) -> Expr {
    let roots: Vec<f64> = match solve(supply_quantity, &Expr::zero(), &PRICE) {
        Ok(roots) => roots
            .iter()
            .filter(|r| r.is_constant())
            .filter_map(|r| r.eval_constant().ok())
            .collect(),
        Err(_) if is_numeric_in(supply_quantity, &PRICE) => {
            config.scanner().find_roots(numeric_fn(supply_quantity, PRICE))
        }
        Err(_) => Vec::new(),
    };
    largest_admissible(roots).map_or_else(Expr::zero, Expr::Num)
}

fn consumer_surplus(
    inverse_demand: Option<&Expr>,
    demand_quantity: Option<&Expr>,
    price: &Expr,
    quantity: &Expr,
    config: &EngineConfig,
) -> Outcome {
    let Some(demand_quantity) = demand_quantity else {
        return Outcome::Undetermined;
    };
    let choke = match choke_price(demand_quantity, config) {
        ChokePrice::At(choke) => choke,
        ChokePrice::Absent => {
            debug!("Demand never reaches zero; consumer surplus is unbounded");
            return Outcome::Unbounded;
        }
        ChokePrice::Unknown => return Outcome::Undetermined,
    };

    if let Some(inverse) = inverse_demand {
        let integrand = (inverse.clone() - price.clone()).simplify();
        if let Some(area) = integrate(&integrand, &QUANTITY, &Expr::zero(), quantity, config) {
            return reduced(area);
        }
    }
    if let Some(area) = integrate(demand_quantity, &PRICE, price, &choke, config) {
        return reduced(area);
    }
    warn!(%price, %quantity, "Consumer surplus could not be integrated");
    Outcome::Undetermined
}

fn producer_surplus(
    inverse_supply: Option<&Expr>,
    supply_quantity: Option<&Expr>,
    price: &Expr,
    quantity: &Expr,
    config: &EngineConfig,
) -> Outcome {
    let Some(supply_quantity) = supply_quantity else {
        return Outcome::Undetermined;
    };
    let floor = floor_price(supply_quantity, config);
    let floor_quantity = supply_quantity.replace(&PRICE, &floor);

    if let Some(inverse) = inverse_supply.filter(|_| !floor_quantity.is_degenerate()) {
        let integrand = (price.clone() - inverse.clone()).simplify();
        if let Some(area) = integrate(&integrand, &QUANTITY, &floor_quantity, quantity, config) {
            let rectangle = (price.clone() - floor.clone()) * floor_quantity;
            return reduced(area + rectangle);
        }
    }
    if let Some(area) = integrate(supply_quantity, &PRICE, &floor, price, config) {
        return reduced(area);
    }
    warn!(%price, %quantity, "Producer surplus could not be integrated");
    Outcome::Undetermined
}

fn total_surplus(consumer: &Outcome, producer: &Outcome) -> Outcome {
    if consumer.is_unbounded() {
        return Outcome::Unbounded;
    }
    match (consumer, producer) {
        (Outcome::Numeric(cs), Outcome::Numeric(ps)) => Outcome::Numeric(cs + ps),
        (Outcome::Undetermined, _) | (_, Outcome::Undetermined) => Outcome::Undetermined,
        _ => match (consumer.as_expr(), producer.as_expr()) {
            (Some(cs), Some(ps)) => reduced(cs + ps),
            _ => Outcome::Undetermined,
        },
    }
}

/// A surplus area as a single reduced fraction.
fn reduced(area: Expr) -> Outcome {
    Outcome::from_expr(area.cancel())
}

/// Definite integral, closed form first, then quadrature.
fn integrate(
    integrand: &Expr,
    var: &Symbol,
    lower: &Expr,
    upper: &Expr,
    config: &EngineConfig,
) -> Option<Expr> {
    match integrand.definite_integral(var, lower, upper) {
        Ok(area) if !area.is_degenerate() => return Some(area),
        Ok(area) => debug!(%integrand, %area, "Closed-form integral is degenerate"),
        Err(error) => debug!(%integrand, %error, "No closed-form integral"),
    }

    let (Some(a), Some(b)) = (lower.as_num(), upper.as_num()) else {
        return None;
    };
    if !is_numeric_in(integrand, var) {
        return None;
    }
    debug!(%integrand, a, b, "Falling back to adaptive Simpson quadrature");
    let quadrature = AdaptiveSimpson::new(config.quadrature);
    match quadrature.integrate(numeric_fn(integrand, var.clone()), a, b) {
        Ok(area) => Some(Expr::Num(area)),
        Err(error) => {
            warn!(%integrand, %error, "Quadrature failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{
        exponential_demand, exponential_supply, linear_demand, linear_supply, power_demand,
        power_supply, quadratic_demand, quadratic_supply,
    };
    use approx::assert_relative_eq;

    fn numeric(outcome: &Outcome) -> f64 {
        outcome
            .as_f64()
            .unwrap_or_else(|| panic!("expected a number, got {}", outcome))
    }

    #[test]
    fn test_linear_market() {
        let demand = linear_demand(Some(100.0), Some(2.0));
        let supply = linear_supply(Some(20.0), Some(3.0));
        let surplus = calculate_surpluses(&demand, &supply, 16.0, 68.0, None);
        assert_relative_eq!(numeric(&surplus.consumer), 1156.0, epsilon = 1e-9);
        assert_relative_eq!(numeric(&surplus.producer), 704.0, epsilon = 1e-9);
        assert_relative_eq!(numeric(&surplus.total), 1860.0, epsilon = 1e-9);
    }

    #[test]
    fn test_supply_with_positive_floor_price() {
        // q = -20 + 4p is zero at p = 5, so only the triangle above it counts
        let demand = linear_demand(Some(100.0), Some(1.0));
        let supply = linear_supply(Some(-20.0), Some(4.0));
        // 100 - p = -20 + 4p at p = 24, q = 76
        let surplus = calculate_surpluses(&demand, &supply, 24.0, 76.0, None);
        assert_relative_eq!(numeric(&surplus.consumer), 0.5 * 76.0 * 76.0, epsilon = 1e-9);
        assert_relative_eq!(numeric(&surplus.producer), 0.5 * 76.0 * 19.0, epsilon = 1e-9);
    }

    #[test]
    fn test_power_demand_consumer_surplus_unbounded() {
        let demand = power_demand(Some(100.0), Some(-0.5));
        let supply = power_supply(Some(1.0), Some(1.5));
        let price = 10.0;
        let quantity = 10.0_f64.powf(1.5);
        let surplus = calculate_surpluses(&demand, &supply, price, quantity, None);
        assert!(surplus.consumer.is_unbounded());
        assert!(surplus.total.is_unbounded());
        // PS = ∫_0^10 p^1.5 dp = 10^2.5 / 2.5
        assert_relative_eq!(
            numeric(&surplus.producer),
            10.0_f64.powf(2.5) / 2.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_exponential_demand_unbounded_and_supply_finite() {
        let demand = exponential_demand(Some(0.05), Some(4.6));
        let supply = exponential_supply(Some(0.05), Some(0.0));
        let price = 46.0;
        let quantity = 2.3_f64.exp();
        let surplus = calculate_surpluses(&demand, &supply, price, quantity, None);
        assert!(surplus.consumer.is_unbounded());
        // PS = ∫_0^46 exp(0.05 p) dp
        let expected = (2.3_f64.exp() - 1.0) / 0.05;
        assert_relative_eq!(numeric(&surplus.producer), expected, epsilon = 1e-7);
    }

    #[test]
    fn test_quadratic_market() {
        let demand = quadratic_demand(Some(100.0), Some(0.04));
        let supply = quadratic_supply(Some(0.0), Some(0.04));
        let price = 1250.0_f64.sqrt();
        let surplus = calculate_surpluses(&demand, &supply, price, 50.0, None);
        // CS = ∫_{p*}^{50} (100 - 0.04 p^2) dp, PS = ∫_0^{p*} 0.04 p^2 dp
        let antiderivative = |p: f64| 100.0 * p - 0.04 * p.powi(3) / 3.0;
        let cs = antiderivative(50.0) - antiderivative(price);
        let ps = 0.04 * price.powi(3) / 3.0;
        assert_relative_eq!(numeric(&surplus.consumer), cs, epsilon = 1e-7);
        assert_relative_eq!(numeric(&surplus.producer), ps, epsilon = 1e-7);
        assert_relative_eq!(numeric(&surplus.total), cs + ps, epsilon = 1e-7);
    }

    #[test]
    fn test_symbolic_linear_consumer_surplus_is_one_fraction() {
        use crate::equilibrium::market_equilibrium;
        use market_core::symbols::{A, B, C, D};

        let (demand, supply) = (linear_demand(None, None), linear_supply(None, None));
        let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
        let (a, b, c, d) = (Expr::from(A), Expr::from(B), Expr::from(C), Expr::from(D));
        // q* = (a*d + b*c)/(b + d) and CS = q*^2/(2b)
        let quantity = (a * d.clone() + b.clone() * c) / (b.clone() + d);
        let expected = (quantity.pow(2.0) / (2.0 * b)).cancel();
        let consumer = result.consumer_surplus().as_expr().unwrap();
        assert_eq!(consumer, expected);
        assert!(consumer.sign().is_positive());
    }

    #[test]
    fn test_numeric_fn_outlives_its_statement() {
        let expr = (100.0 - 2.0 * Expr::from(PRICE)).simplify();
        let demand_at = numeric_fn(&expr, PRICE);
        assert_eq!(demand_at(10.0), 80.0);
        assert_eq!(demand_at(50.0), 0.0);

        let log = Expr::from(PRICE).ln();
        assert!(numeric_fn(&log, PRICE)(-1.0).is_nan());
    }

    #[test]
    fn test_total_surplus_rules() {
        let exact = Outcome::from_expr(Expr::from(market_core::symbols::A));
        assert!(total_surplus(&Outcome::Unbounded, &Outcome::Undetermined).is_unbounded());
        assert!(total_surplus(&Outcome::Numeric(1.0), &Outcome::Undetermined).is_undetermined());
        assert!(total_surplus(&exact, &Outcome::Numeric(1.0)).is_exact());
        assert_eq!(
            total_surplus(&Outcome::Numeric(1.0), &Outcome::Numeric(2.0)),
            Outcome::Numeric(3.0)
        );
    }

    #[test]
    fn test_quadrature_fallback_for_numeric_integrand() {
        // exp(q^2) has no antiderivative in the supported families
        let q = Expr::from(QUANTITY);
        let integrand = q.clone().pow(2.0).exp().simplify();
        let area = integrate(
            &integrand,
            &QUANTITY,
            &Expr::zero(),
            &Expr::one(),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(area.as_num().unwrap(), 1.462_651_745_907_181_6, epsilon = 1e-9);

        // A symbolic integrand cannot fall back
        let symbolic = (q.pow(2.0) * Expr::from(market_core::symbols::A)).exp().simplify();
        assert!(integrate(
            &symbolic,
            &QUANTITY,
            &Expr::zero(),
            &Expr::one(),
            &EngineConfig::default()
        )
        .is_none());
    }
}
