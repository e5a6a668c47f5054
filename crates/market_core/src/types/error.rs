//! Error types for structured error handling.
//!
//! This module provides:
//! - `SymbolicError`: Errors from the symbolic algebra kernel
//! - `SolverError`: Errors from root-finding and quadrature routines

use thiserror::Error;

/// Symbolic kernel errors.
///
/// Raised by evaluation, equation solving and integration when an
/// expression cannot be reduced. Callers in the equilibrium layer convert
/// most of these into "undetermined" outcomes rather than propagating them.
///
/// # Variants
/// - `UnboundSymbol`: Evaluation met a symbol with no numeric value
/// - `Undefined`: Evaluation produced a non-finite or non-real value
/// - `Unsolvable`: No closed-form isolation of the unknown exists
/// - `Indeterminate`: The equation holds for every value of the unknown
/// - `NoAntiderivative`: The integrand is outside the supported families
///
/// # Examples
/// ```
/// use market_core::types::SymbolicError;
///
/// let err = SymbolicError::UnboundSymbol { name: "a".to_string() };
/// assert_eq!(format!("{}", err), "Unbound symbol: a has no numeric value");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolicError {
    /// A symbol had no value in the binding used for evaluation.
    #[error("Unbound symbol: {name} has no numeric value")]
    UnboundSymbol {
        /// Name of the unbound symbol
        name: String,
    },

    /// Evaluation produced NaN or an infinity.
    #[error("Undefined value while evaluating {expression}")]
    Undefined {
        /// Rendered sub-expression that failed
        expression: String,
    },

    /// The equation could not be solved for the requested unknown.
    #[error("Cannot solve for {variable}: {reason}")]
    Unsolvable {
        /// Unknown being solved for
        variable: String,
        /// Why isolation failed
        reason: String,
    },

    /// The equation is an identity in the requested unknown.
    #[error("Equation holds for every value of {variable}")]
    Indeterminate {
        /// Unknown being solved for
        variable: String,
    },

    /// No closed-form antiderivative is known for the integrand.
    #[error("No antiderivative of {expression} with respect to {variable}")]
    NoAntiderivative {
        /// Rendered integrand
        expression: String,
        /// Integration variable
        variable: String,
    },
}

impl SymbolicError {
    /// Check if the error comes from a missing parameter value.
    pub fn is_unbound(&self) -> bool {
        matches!(self, SymbolicError::UnboundSymbol { .. })
    }
}

/// Root-finding and quadrature errors.
///
/// # Variants
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `NoBracket`: Function values at bracket endpoints have same sign
/// - `NonFiniteValue`: The function returned NaN or an infinity
/// - `NumericalInstability`: General numerical instability
///
/// # Examples
/// ```
/// use market_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// The function was not finite at a sampled point.
    #[error("Non-finite function value at x = {x}")]
    NonFiniteValue {
        /// Point where the function was evaluated
        x: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}
