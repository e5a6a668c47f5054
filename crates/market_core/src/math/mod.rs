//! Numerical fallbacks for the symbolic kernel.
//!
//! This module provides:
//! - Root finding: Brent's method and a log-spaced bracketing scan
//!   (`solvers`)
//! - Definite integration: adaptive Simpson quadrature (`quadrature`)
//!
//! The equilibrium layer only reaches for these when a closed form is not
//! available and every parameter has a numeric value.

pub mod quadrature;
pub mod solvers;
