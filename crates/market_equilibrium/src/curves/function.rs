//! Market functions: typed curves bound to parameter values.

use super::{FunctionType, TypedEquation};
use crate::roots::first_admissible;
use crate::MarketError;
use market_core::symbolic::{Expr, ParameterBinding};
use market_core::symbols::{PRICE, QUANTITY};
use market_core::types::SymbolicError;
use std::fmt;

/// A typed curve together with stored parameter values.
///
/// The stored binding may be partial. Point evaluation merges call-time
/// values over the stored ones (call-time wins); the merged binding must
/// then resolve every parameter.
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::{linear_demand, quadratic_demand};
///
/// let demand = linear_demand(Some(100.0), Some(2.0));
/// assert_eq!(demand.evaluate(10.0, None).unwrap(), 80.0);
/// assert_eq!(demand.get_slope(10.0, None).unwrap(), -2.0);
///
/// let demand = quadratic_demand(Some(100.0), Some(0.04));
/// assert!((demand.evaluate(10.0, None).unwrap() - 96.0).abs() < 1e-12);
/// assert!(demand.get_slope(10.0, None).unwrap() < 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketFunction {
    equation: TypedEquation,
    parameters: ParameterBinding,
}

impl MarketFunction {
    /// Create a market function.
    ///
    /// Values bound to the unknowns `p` or `q` are ignored.
    ///
    /// # Errors
    ///
    /// * `MarketError::Validation` - The equation does not contain both
    ///   price and quantity
    pub fn new(equation: TypedEquation, parameters: ParameterBinding) -> Result<Self, MarketError> {
        equation.validate()?;
        Ok(Self::from_parts(equation, parameters))
    }

    /// Build from a family template, which always relates `p` and `q`.
    pub(crate) fn from_family(function_type: FunctionType, parameters: ParameterBinding) -> Self {
        Self::from_parts(function_type.equation(), parameters)
    }

    fn from_parts(equation: TypedEquation, mut parameters: ParameterBinding) -> Self {
        parameters.remove(&PRICE);
        parameters.remove(&QUANTITY);
        Self {
            equation,
            parameters,
        }
    }

    /// The (possibly partially substituted) equation.
    pub fn equation(&self) -> &TypedEquation {
        &self.equation
    }

    /// Stored parameter values.
    pub fn parameters(&self) -> &ParameterBinding {
        &self.parameters
    }

    /// Curve family tag.
    pub fn function_type(&self) -> FunctionType {
        self.equation.function_type()
    }

    /// Stored values merged with call-time overrides.
    pub fn binding(&self, extra: Option<&ParameterBinding>) -> ParameterBinding {
        match extra {
            Some(extra) => self.parameters.merged(extra),
            None => self.parameters.clone(),
        }
    }

    /// The equation with stored and call-time values substituted.
    pub fn bound_equation(&self, extra: Option<&ParameterBinding>) -> TypedEquation {
        let mut binding = self.binding(extra);
        binding.remove(&PRICE);
        binding.remove(&QUANTITY);
        self.equation.subs(&binding)
    }

    /// Quantity as an explicit function of price, with parameters left
    /// symbolic.
    ///
    /// # Errors
    ///
    /// * `MarketError::Symbolic` - The equation cannot be solved for `q`, or
    ///   every branch is negative
    pub fn quantity_expr(&self) -> Result<Expr, MarketError> {
        let candidates = self.equation.solve_for(&QUANTITY)?;
        first_admissible(&candidates).ok_or_else(|| {
            MarketError::Symbolic(SymbolicError::Unsolvable {
                variable: QUANTITY.to_string(),
                reason: "no non-negative branch".to_string(),
            })
        })
    }

    fn point_binding(&self, price: f64, extra: Option<&ParameterBinding>) -> ParameterBinding {
        let mut binding = self.binding(extra);
        binding.insert(PRICE, price);
        binding
    }

    /// Quantity at `price`.
    ///
    /// # Errors
    ///
    /// * `MarketError::Domain` - `price` is negative, or the curve yields a
    ///   negative quantity there
    /// * `MarketError::Symbolic` - A parameter has no value, or the value is
    ///   not a finite real number
    pub fn evaluate(
        &self,
        price: f64,
        extra: Option<&ParameterBinding>,
    ) -> Result<f64, MarketError> {
        if price < 0.0 || price.is_nan() {
            return Err(MarketError::Domain(format!(
                "Price must be non-negative, got {}",
                price
            )));
        }
        let quantity = self
            .quantity_expr()?
            .eval(&self.point_binding(price, extra))?;
        if quantity < 0.0 {
            return Err(MarketError::Domain(format!(
                "Quantity {} is negative at price {}",
                quantity, price
            )));
        }
        Ok(quantity)
    }

    /// Derivative `dq/dp` at `price`; no sign constraint is applied.
    ///
    /// # Errors
    ///
    /// * `MarketError::Symbolic` - A parameter has no value, or the slope is
    ///   not finite at `price`
    pub fn get_slope(
        &self,
        price: f64,
        extra: Option<&ParameterBinding>,
    ) -> Result<f64, MarketError> {
        let slope = self.quantity_expr()?.derivative(&PRICE);
        Ok(slope.eval(&self.point_binding(price, extra))?)
    }

    /// Substitute parameter values into the equation.
    ///
    /// Stored values for the substituted symbols are dropped; other stored
    /// values are kept. Values for `p` and `q` are ignored.
    pub fn substitute_params(&self, params: &ParameterBinding) -> MarketFunction {
        let mut params = params.clone();
        params.remove(&PRICE);
        params.remove(&QUANTITY);

        let mut parameters = self.parameters.clone();
        for (symbol, _) in params.iter() {
            parameters.remove(symbol);
        }
        MarketFunction {
            equation: self.equation.subs(&params),
            parameters,
        }
    }
}

impl fmt::Display for MarketFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.bound_equation(None), self.function_type())
    }
}
