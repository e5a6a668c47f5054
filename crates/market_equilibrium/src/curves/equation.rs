//! Typed equations relating price and quantity.

use super::FunctionType;
use crate::MarketError;
use market_core::symbolic::{solve, Expr, ParameterBinding, Symbol};
use market_core::symbols::{PRICE, QUANTITY};
use market_core::types::SymbolicError;
use std::collections::BTreeSet;
use std::fmt;

/// An equation `lhs = rhs` tagged with the curve family it came from.
///
/// Both sides are kept in canonical form. Substitution returns a new
/// equation with the same tag; the original is never mutated.
///
/// # Example
///
/// ```
/// use market_core::symbolic::ParameterBinding;
/// use market_core::symbols::{A, B};
/// use market_equilibrium::curves::FunctionType;
///
/// let equation = FunctionType::LinearDemand.equation();
/// let bound = equation.subs(&ParameterBinding::new().with(A, 100.0).with(B, 2.0));
///
/// assert_eq!(bound.to_string(), "q = 100 - 2*p");
/// assert_eq!(bound.function_type(), FunctionType::LinearDemand);
/// assert_eq!(equation.to_string(), "q = a - b*p");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedEquation {
    lhs: Expr,
    rhs: Expr,
    function_type: FunctionType,
}

impl TypedEquation {
    /// Create an equation; both sides are simplified.
    pub fn new(lhs: Expr, rhs: Expr, function_type: FunctionType) -> Self {
        Self {
            lhs: lhs.simplify(),
            rhs: rhs.simplify(),
            function_type,
        }
    }

    /// Left-hand side.
    pub fn lhs(&self) -> &Expr {
        &self.lhs
    }

    /// Right-hand side.
    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    /// Curve family tag.
    pub fn function_type(&self) -> FunctionType {
        self.function_type
    }

    /// Symbols occurring on either side.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = self.lhs.free_symbols();
        symbols.extend(self.rhs.free_symbols());
        symbols
    }

    /// Check that the equation relates price and quantity.
    ///
    /// # Errors
    ///
    /// * `MarketError::Validation` - `p` or `q` does not occur
    pub fn validate(&self) -> Result<(), MarketError> {
        let symbols = self.free_symbols();
        for unknown in [PRICE, QUANTITY] {
            if !symbols.contains(&unknown) {
                return Err(MarketError::Validation(format!(
                    "Equation {} must contain both price {} and quantity {}",
                    self, PRICE, QUANTITY
                )));
            }
        }
        Ok(())
    }

    /// Substitute numeric parameter values into both sides.
    pub fn subs(&self, binding: &ParameterBinding) -> TypedEquation {
        self.replace_all(&binding.to_substitutions())
    }

    /// Replace symbols by expressions on both sides.
    pub fn replace_all(&self, substitutions: &[(Symbol, Expr)]) -> TypedEquation {
        TypedEquation {
            lhs: self.lhs.replace_all(substitutions),
            rhs: self.rhs.replace_all(substitutions),
            function_type: self.function_type,
        }
    }

    /// Solve the equation for `var`.
    pub fn solve_for(&self, var: &Symbol) -> Result<Vec<Expr>, SymbolicError> {
        solve(&self.lhs, &self.rhs, var)
    }
}

impl fmt::Display for TypedEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::symbols::{A, B, C, D};

    #[test]
    fn test_free_symbols_recomputed_after_subs() {
        let equation = FunctionType::LinearSupply.equation();
        let names: Vec<String> = equation.free_symbols().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["c", "d", "p", "q"]);

        let bound = equation.subs(&ParameterBinding::new().with(C, 20.0));
        let names: Vec<String> = bound.free_symbols().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["d", "p", "q"]);
        // Original untouched
        assert!(equation.free_symbols().contains(&C));
    }

    #[test]
    fn test_empty_substitution_is_identity() {
        let equation = FunctionType::PowerDemand.equation();
        assert_eq!(equation.subs(&ParameterBinding::new()), equation);
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let binding = ParameterBinding::new().with(A, 10.0).with(B, 0.5);
        let equation = FunctionType::QuadraticDemand.equation();
        let once = equation.subs(&binding);
        assert_eq!(once.subs(&binding), once);
    }

    #[test]
    fn test_validate_requires_both_unknowns() {
        let equation = TypedEquation::new(
            Expr::from(QUANTITY),
            Expr::from(C) + Expr::from(D),
            FunctionType::LinearSupply,
        );
        let err = equation.validate().unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[test]
    fn test_solve_for_price() {
        let equation = FunctionType::LinearDemand.equation();
        let inverse = equation.solve_for(&PRICE).unwrap();
        assert_eq!(inverse.len(), 1);
        assert_eq!(inverse[0].to_string(), "(a - q)/b");
    }
}
