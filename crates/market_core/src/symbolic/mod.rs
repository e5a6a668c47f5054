//! Symbolic algebra kernel.
//!
//! This module provides:
//! - [`Symbol`]: Named unknowns and parameters
//! - [`Expr`]: Expression trees with canonical simplification
//! - [`ParameterBinding`]: Symbol → value mappings used for substitution
//! - [`solve`]: Closed-form equation solving (polynomials up to degree 2 and
//!   inverse-function isolation)
//! - [`Sign`]: Structural sign analysis under the positive-parameter
//!   assumption
//!
//! Calculus (`derivative`, `antiderivative`, `definite_integral`),
//! polynomial coefficient extraction and reduction to a single fraction
//! (`cancel`) are provided as methods on [`Expr`].

mod binding;
mod calculus;
mod expr;
mod polynomial;
mod rational;
mod sign;
mod simplify;
mod solve;
mod symbol;

pub use binding::ParameterBinding;
pub use expr::Expr;
pub use sign::Sign;
pub use solve::solve;
pub use symbol::Symbol;
