//! Assembled equilibrium results.

use super::surplus::{explicit, SurplusAnalysis, SurplusBreakdown};
use super::Outcome;
use crate::curves::{FunctionType, TypedEquation};
use market_core::symbolic::{Expr, ParameterBinding};
use market_core::symbols::{PRICE, QUANTITY};

/// Equilibrium of one market, with surplus measures.
///
/// Built once per solve and never mutated; use [`EquilibriumResult::substitute`]
/// to derive a result for additional parameter values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquilibriumResult {
    price: Outcome,
    quantity: Outcome,
    consumer_surplus: Outcome,
    producer_surplus: Outcome,
    total_surplus: Outcome,
    demand_equation: TypedEquation,
    supply_equation: TypedEquation,
    inverse_demand: Outcome,
    inverse_supply: Outcome,
}

/// Demand and supply sampled over a price range, as `(price, quantity)`
/// pairs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePoints {
    /// Demand samples.
    pub demand: Vec<(f64, f64)>,
    /// Supply samples.
    pub supply: Vec<(f64, f64)>,
}

impl EquilibriumResult {
    pub(crate) fn assemble(
        price: &Expr,
        quantity: &Expr,
        demand_equation: TypedEquation,
        supply_equation: TypedEquation,
        analysis: SurplusAnalysis,
    ) -> Self {
        let SurplusAnalysis {
            inverse_demand,
            inverse_supply,
            surplus,
        } = analysis;
        Self {
            price: Outcome::from_expr(price.clone()),
            quantity: Outcome::from_expr(quantity.clone()),
            consumer_surplus: surplus.consumer,
            producer_surplus: surplus.producer,
            total_surplus: surplus.total,
            demand_equation,
            supply_equation,
            inverse_demand,
            inverse_supply,
        }
    }

    /// Equilibrium price.
    pub fn price(&self) -> &Outcome {
        &self.price
    }

    /// Equilibrium quantity.
    pub fn quantity(&self) -> &Outcome {
        &self.quantity
    }

    /// Consumer surplus.
    pub fn consumer_surplus(&self) -> &Outcome {
        &self.consumer_surplus
    }

    /// Producer surplus.
    pub fn producer_surplus(&self) -> &Outcome {
        &self.producer_surplus
    }

    /// Total surplus.
    pub fn total_surplus(&self) -> &Outcome {
        &self.total_surplus
    }

    /// The three surplus fields together.
    pub fn surplus(&self) -> SurplusBreakdown {
        SurplusBreakdown {
            consumer: self.consumer_surplus.clone(),
            producer: self.producer_surplus.clone(),
            total: self.total_surplus.clone(),
        }
    }

    /// Demand equation after parameter substitution.
    pub fn demand_equation(&self) -> &TypedEquation {
        &self.demand_equation
    }

    /// Supply equation after parameter substitution.
    pub fn supply_equation(&self) -> &TypedEquation {
        &self.supply_equation
    }

    /// Inverse demand, price as a function of quantity.
    pub fn inverse_demand(&self) -> &Outcome {
        &self.inverse_demand
    }

    /// Inverse supply, price as a function of quantity.
    pub fn inverse_supply(&self) -> &Outcome {
        &self.inverse_supply
    }

    /// Family of the demand curve.
    pub fn demand_type(&self) -> FunctionType {
        self.demand_equation.function_type()
    }

    /// Family of the supply curve.
    pub fn supply_type(&self) -> FunctionType {
        self.supply_equation.function_type()
    }

    /// Numeric `(price, quantity)`, if both are concrete.
    pub fn numeric_point(&self) -> Option<(f64, f64)> {
        Some((self.price.as_f64()?, self.quantity.as_f64()?))
    }

    /// A new result with `binding` substituted into every field.
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbolic::ParameterBinding;
    /// use market_core::symbols::{A, B, C, D};
    /// use market_equilibrium::curves::{linear_demand, linear_supply};
    /// use market_equilibrium::equilibrium::market_equilibrium;
    ///
    /// let demand = linear_demand(None, None);
    /// let supply = linear_supply(None, None);
    /// let symbolic = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
    /// assert!(symbolic.price().is_exact());
    ///
    /// let binding = ParameterBinding::new()
    ///     .with(A, 100.0)
    ///     .with(B, 2.0)
    ///     .with(C, 20.0)
    ///     .with(D, 3.0);
    /// let numeric = symbolic.substitute(&binding);
    /// let (price, quantity) = numeric.numeric_point().unwrap();
    /// assert!((price - 16.0).abs() < 1e-12);
    /// assert!((quantity - 68.0).abs() < 1e-12);
    /// ```
    pub fn substitute(&self, binding: &ParameterBinding) -> EquilibriumResult {
        EquilibriumResult {
            price: self.price.substitute(binding),
            quantity: self.quantity.substitute(binding),
            consumer_surplus: self.consumer_surplus.substitute(binding),
            producer_surplus: self.producer_surplus.substitute(binding),
            total_surplus: self.total_surplus.substitute(binding),
            demand_equation: self.demand_equation.subs(binding),
            supply_equation: self.supply_equation.subs(binding),
            inverse_demand: self.inverse_demand.substitute(binding),
            inverse_supply: self.inverse_supply.substitute(binding),
        }
    }

    /// Sample both curves over `[0, min(2·p*, price_cap)]`.
    ///
    /// Points where a curve is negative or not finite are skipped. Returns
    /// `None` unless the equilibrium price is a positive number and
    /// `samples >= 2`.
    pub fn curve_points(&self, price_cap: f64, samples: usize) -> Option<CurvePoints> {
        let price = self.price.as_f64()?;
        let upper = (2.0 * price).min(price_cap);
        if upper.is_nan() || upper <= 0.0 || samples < 2 {
            return None;
        }
        let demand = explicit(&self.demand_equation, &QUANTITY)?;
        let supply = explicit(&self.supply_equation, &QUANTITY)?;

        let step = upper / (samples - 1) as f64;
        let sample = |curve: &Expr| -> Vec<(f64, f64)> {
            (0..samples)
                .map(|i| i as f64 * step)
                .filter_map(|p| {
                    let q = curve.eval(&ParameterBinding::new().with(PRICE, p)).ok()?;
                    (q.is_finite() && q >= 0.0).then_some((p, q))
                })
                .collect()
        };
        Some(CurvePoints {
            demand: sample(&demand),
            supply: sample(&supply),
        })
    }
}
