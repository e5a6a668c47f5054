//! Market equilibrium and surplus.
//!
//! This module provides:
//! - [`MarketEquilibrium`]: Builder that solves a demand/supply pair
//! - [`market_equilibrium`], [`solve_equilibrium`]: One-shot entry points
//! - [`EquilibriumResult`]: Price, quantity, surplus and inverse curves
//! - [`Outcome`]: Numeric, exact, unbounded or undetermined field values
//! - [`calculate_surpluses`]: Surplus at a known numeric equilibrium
//! - [`validate_market_functions`], [`validate_equilibrium`]: Sanity checks
//! - [`sweep_parameter`]: Parallel re-solve over one parameter

mod outcome;
mod result;
mod solver;
mod surplus;
mod sweep;
mod validation;

pub use outcome::Outcome;
pub use result::{CurvePoints, EquilibriumResult};
pub use solver::{market_equilibrium, solve_equilibrium, MarketEquilibrium};
pub use surplus::{calculate_surpluses, calculate_surpluses_with, SurplusBreakdown};
pub use sweep::sweep_parameter;
pub use validation::{validate_equilibrium, validate_market_functions, validate_market_functions_at};
