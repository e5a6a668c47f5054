//! Core error types.
//!
//! This module provides:
//! - `error`: Structured error types for the symbolic kernel and the numerical solvers
//!
//! # Re-exports
//!
//! For convenience, the error types are re-exported at this module level:
//! - [`SymbolicError`], [`SolverError`] from `error`

pub mod error;

pub use error::{SolverError, SymbolicError};
