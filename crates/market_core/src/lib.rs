//! # market_core: Algebraic Foundation for Market Equilibrium Analysis
//!
//! ## Layer 1 (Foundation) Role
//!
//! market_core serves as the bottom layer of the workspace, providing:
//! - The shared symbol registry: price `p`, quantity `q` and the curve
//!   parameters `a`, `b`, `c`, `d` (`symbols`)
//! - A small symbolic algebra kernel: expression trees, canonical
//!   simplification, substitution, differentiation, antiderivatives and
//!   equation solving (`symbolic`)
//! - Numerical fallbacks: Brent root finding and adaptive Simpson quadrature
//!   (`math`)
//! - Error types: `SymbolicError`, `SolverError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other market_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use market_core::symbolic::{solve, Expr, ParameterBinding};
//! use market_core::symbols::{A, B, PRICE, QUANTITY};
//!
//! // q = a - b*p
//! let demand = Expr::from(A) - Expr::from(B) * Expr::from(PRICE);
//!
//! // Solve q = a - b*p for p
//! let inverse = solve(&Expr::from(QUANTITY), &demand, &PRICE).unwrap();
//! assert_eq!(inverse.len(), 1);
//!
//! let binding = ParameterBinding::new()
//!     .with(A, 100.0)
//!     .with(B, 2.0)
//!     .with(QUANTITY, 68.0);
//! let price = inverse[0].eval(&binding).unwrap();
//! assert!((price - 16.0).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for `Symbol`, `Expr` and `ParameterBinding`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod symbolic;
pub mod symbols;
pub mod types;
