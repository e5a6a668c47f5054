//! Error types for market analysis.
//!
//! This module provides:
//! - `MarketError`: Errors raised by curves, market functions and the
//!   equilibrium engine

use market_core::types::SymbolicError;
use thiserror::Error;

/// Market analysis errors.
///
/// "No equilibrium" and undetermined surplus fields are not errors; they are
/// reported through `Option` and [`Outcome`](crate::equilibrium::Outcome).
///
/// # Variants
/// - `Domain`: Negative price, or a negative quantity at a valid price
/// - `EconomicConstraint`: Demand not downward sloping or supply not upward
///   sloping
/// - `Validation`: Missing curve, or an equation without both price and
///   quantity
/// - `Symbolic`: Kernel failure surfaced from point evaluation (unbound
///   parameter, undefined value)
///
/// # Examples
/// ```
/// use market_equilibrium::MarketError;
///
/// let err = MarketError::EconomicConstraint("Demand curve must have negative slope".into());
/// assert!(err.to_string().contains("negative slope"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MarketError {
    /// Input outside the economic domain.
    #[error("Domain error: {0}")]
    Domain(String),

    /// Slope direction violated.
    #[error("Economic constraint violated: {0}")]
    EconomicConstraint(String),

    /// Structurally invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Symbolic kernel error.
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
}

impl MarketError {
    /// Check if this is a domain error.
    pub fn is_domain(&self) -> bool {
        matches!(self, MarketError::Domain(_))
    }

    /// Check if this is a slope-direction violation.
    pub fn is_economic_constraint(&self) -> bool {
        matches!(self, MarketError::EconomicConstraint(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_display() {
        let err = MarketError::Domain("Price must be non-negative, got -1".to_string());
        assert_eq!(
            format!("{}", err),
            "Domain error: Price must be non-negative, got -1"
        );
        assert!(err.is_domain());
        assert!(!err.is_economic_constraint());
    }

    #[test]
    fn test_from_symbolic_error() {
        let err: MarketError = SymbolicError::UnboundSymbol {
            name: "a".to_string(),
        }
        .into();
        assert!(matches!(err, MarketError::Symbolic(ref e) if e.is_unbound()));
        assert_eq!(format!("{}", err), "Unbound symbol: a has no numeric value");
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = MarketError::Validation("Missing demand curve".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
