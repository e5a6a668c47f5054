//! Curve family tags.

use crate::MarketError;
use market_core::symbolic::{Expr, Symbol};
use market_core::symbols::{A, B, C, D, PRICE, QUANTITY};
use std::fmt;
use std::str::FromStr;

use super::TypedEquation;

/// Functional family of a supply or demand curve.
///
/// Parses from and displays as the snake_case tag (`"linear_demand"`, ...).
/// Demand families are written over parameters `a` and `b`, supply families
/// over `c` and `d`.
///
/// # Example
///
/// ```
/// use market_equilibrium::curves::FunctionType;
///
/// let family: FunctionType = "power_supply".parse().unwrap();
/// assert_eq!(family, FunctionType::PowerSupply);
/// assert!(!family.is_demand());
/// assert_eq!(family.to_string(), "power_supply");
/// assert_eq!(family.equation().to_string(), "q = c*p^d");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FunctionType {
    /// `q = a - b*p`
    LinearDemand,
    /// `q = a*p^b`
    PowerDemand,
    /// `q = exp(-a*p + b)`
    ExponentialDemand,
    /// `q = a - b*p^2`
    QuadraticDemand,
    /// `q = c + d*p`
    LinearSupply,
    /// `q = c*p^d`
    PowerSupply,
    /// `q = exp(c*p + d)`
    ExponentialSupply,
    /// `q = c + d*p^2`
    QuadraticSupply,
}

impl FunctionType {
    /// Every family, demand first.
    pub const ALL: [FunctionType; 8] = [
        FunctionType::LinearDemand,
        FunctionType::PowerDemand,
        FunctionType::ExponentialDemand,
        FunctionType::QuadraticDemand,
        FunctionType::LinearSupply,
        FunctionType::PowerSupply,
        FunctionType::ExponentialSupply,
        FunctionType::QuadraticSupply,
    ];

    /// The snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionType::LinearDemand => "linear_demand",
            FunctionType::PowerDemand => "power_demand",
            FunctionType::ExponentialDemand => "exponential_demand",
            FunctionType::QuadraticDemand => "quadratic_demand",
            FunctionType::LinearSupply => "linear_supply",
            FunctionType::PowerSupply => "power_supply",
            FunctionType::ExponentialSupply => "exponential_supply",
            FunctionType::QuadraticSupply => "quadratic_supply",
        }
    }

    /// Returns true for demand families.
    pub fn is_demand(&self) -> bool {
        matches!(
            self,
            FunctionType::LinearDemand
                | FunctionType::PowerDemand
                | FunctionType::ExponentialDemand
                | FunctionType::QuadraticDemand
        )
    }

    /// Returns true for supply families.
    pub fn is_supply(&self) -> bool {
        !self.is_demand()
    }

    /// The two parameter symbols of the family, in constructor order.
    pub fn parameter_symbols(&self) -> [Symbol; 2] {
        if self.is_demand() {
            [A, B]
        } else {
            [C, D]
        }
    }

    /// The family's symbolic equation `q = f(p)`.
    pub fn equation(&self) -> TypedEquation {
        let p = || Expr::from(PRICE);
        let [first, second] = self.parameter_symbols().map(Expr::from);
        let rhs = match self {
            FunctionType::LinearDemand => first - second * p(),
            FunctionType::QuadraticDemand => first - second * p().pow(2.0),
            FunctionType::LinearSupply => first + second * p(),
            FunctionType::QuadraticSupply => first + second * p().pow(2.0),
            FunctionType::PowerDemand | FunctionType::PowerSupply => first * p().pow(second),
            FunctionType::ExponentialDemand => (-(first * p()) + second).exp(),
            FunctionType::ExponentialSupply => (first * p() + second).exp(),
        };
        TypedEquation::new(Expr::from(QUANTITY), rhs, *self)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionType {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarketError::Validation(format!("Unknown function type: {}", s)))
    }
}
