//! Per-field outcome of the equilibrium engine.

use market_core::symbolic::{Expr, ParameterBinding, Sign};
use std::fmt;

/// Value of a single result field.
///
/// An expression that still contains parameters stays [`Outcome::Exact`];
/// once every symbol is bound it is reduced to [`Outcome::Numeric`]. The
/// two sentinels are defined results, not errors.
///
/// # Example
///
/// ```
/// use market_core::symbolic::Expr;
/// use market_core::symbols::A;
/// use market_equilibrium::equilibrium::Outcome;
///
/// assert_eq!(Outcome::from_expr(Expr::num(2.0) * 8.0), Outcome::Numeric(16.0));
/// assert!(Outcome::from_expr(Expr::from(A) / 2.0).is_exact());
/// assert!(Outcome::from_expr(Expr::zero().ln()).is_undetermined());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "kind", content = "value"))]
pub enum Outcome {
    /// Concrete value.
    Numeric(f64),
    /// Closed form in the remaining parameters.
    Exact(Expr),
    /// The defining integral diverges.
    Unbounded,
    /// No closed form or numeric value could be derived.
    Undetermined,
}

impl Outcome {
    /// Reduce an expression to an outcome.
    ///
    /// Degenerate expressions (e.g. `ln(0)`) become `Undetermined`.
    pub fn from_expr(expr: Expr) -> Outcome {
        let expr = expr.simplify();
        if expr.is_degenerate() {
            return Outcome::Undetermined;
        }
        if expr.is_constant() {
            return match expr.eval_constant() {
                Ok(value) => Outcome::Numeric(value),
                Err(_) => Outcome::Undetermined,
            };
        }
        Outcome::Exact(expr)
    }

    /// The numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Outcome::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as an expression (numeric values become constants).
    pub fn as_expr(&self) -> Option<Expr> {
        match self {
            Outcome::Numeric(value) => Some(Expr::Num(*value)),
            Outcome::Exact(expr) => Some(expr.clone()),
            Outcome::Unbounded | Outcome::Undetermined => None,
        }
    }

    /// Returns true for a numeric value.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Outcome::Numeric(_))
    }

    /// Returns true for a closed form with parameters.
    pub fn is_exact(&self) -> bool {
        matches!(self, Outcome::Exact(_))
    }

    /// Returns true for a divergent integral.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Outcome::Unbounded)
    }

    /// Returns true if no value could be derived.
    pub fn is_undetermined(&self) -> bool {
        matches!(self, Outcome::Undetermined)
    }

    /// Returns true if the value is known to be negative.
    ///
    /// Closed forms are judged by their structural sign with every
    /// parameter taken as a positive real; sentinels are never negative.
    pub fn is_negative(&self) -> bool {
        match self {
            Outcome::Numeric(value) => *value < 0.0,
            Outcome::Exact(expr) => expr.sign() == Sign::Negative,
            Outcome::Unbounded | Outcome::Undetermined => false,
        }
    }

    /// Substitute parameter values and re-reduce.
    pub fn substitute(&self, binding: &ParameterBinding) -> Outcome {
        match self {
            Outcome::Exact(expr) => Outcome::from_expr(expr.subs(binding)),
            other => other.clone(),
        }
    }
}

impl From<f64> for Outcome {
    fn from(value: f64) -> Self {
        Outcome::Numeric(value)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Numeric(value) => write!(f, "{}", value),
            Outcome::Exact(expr) => write!(f, "{}", expr),
            Outcome::Unbounded => f.write_str("unbounded"),
            Outcome::Undetermined => f.write_str("undetermined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::symbols::{A, B};

    #[test]
    fn test_constant_expression_is_numeric() {
        let outcome = Outcome::from_expr(Expr::num(100.0) - Expr::num(32.0));
        assert_eq!(outcome, Outcome::Numeric(68.0));
        assert_eq!(outcome.as_f64(), Some(68.0));
        assert_eq!(outcome.as_expr(), Some(Expr::Num(68.0)));
    }

    #[test]
    fn test_symbolic_substitution_reduces() {
        let outcome = Outcome::from_expr(Expr::from(A) / Expr::from(B));
        assert!(outcome.is_exact());
        assert_eq!(outcome.as_f64(), None);

        let partially = outcome.substitute(&ParameterBinding::new().with(A, 100.0));
        assert!(partially.is_exact());

        let binding = ParameterBinding::new().with(A, 100.0).with(B, 4.0);
        assert_eq!(outcome.substitute(&binding), Outcome::Numeric(25.0));
    }

    #[test]
    fn test_sentinels() {
        assert!(Outcome::Unbounded.is_unbounded());
        assert!(!Outcome::Unbounded.is_negative());
        assert_eq!(Outcome::Unbounded.as_expr(), None);
        assert_eq!(
            Outcome::Undetermined.substitute(&ParameterBinding::new().with(A, 1.0)),
            Outcome::Undetermined
        );
        assert_eq!(Outcome::Unbounded.to_string(), "unbounded");
    }

    #[test]
    fn test_negative_detection() {
        assert!(Outcome::Numeric(-1.0).is_negative());
        assert!(!Outcome::Numeric(0.0).is_negative());
        assert!(Outcome::from_expr(-Expr::from(A)).is_negative());
        assert!(!Outcome::from_expr(Expr::from(A) - Expr::from(B)).is_negative());
    }
}
