//! # market_equilibrium: Curves, Equilibrium and Surplus (Layer 2)
//!
//! Typed supply and demand curves, the equilibrium solver and the surplus
//! calculator, built on the symbolic kernel of `market_core`.
//!
//! This crate provides:
//! - Curve families and market functions with point evaluation and slope
//!   (`curves`)
//! - Equilibrium solving with a closed-form path and a numeric fallback,
//!   consumer/producer/total surplus, result validation and parameter
//!   sweeps (`equilibrium`)
//! - Engine configuration (`EngineConfig`) and errors (`MarketError`)
//!
//! ## Design Principles
//!
//! - **Exact while symbolic**: fields stay closed-form expressions until
//!   every parameter is bound
//! - **Per-field degradation**: a surplus that cannot be integrated is
//!   reported as undetermined without affecting the other fields
//! - **Builder pattern** for the solver, with sensible defaults
//!
//! ## Usage Examples
//!
//! ```rust
//! use market_equilibrium::curves::{linear_demand, linear_supply, power_demand, power_supply};
//! use market_equilibrium::equilibrium::market_equilibrium;
//!
//! let demand = linear_demand(Some(100.0), Some(2.0));
//! let supply = linear_supply(Some(20.0), Some(3.0));
//! let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
//! assert!((result.total_surplus().as_f64().unwrap() - 1860.0).abs() < 1e-9);
//!
//! // Constant-elasticity demand never reaches zero
//! let demand = power_demand(Some(100.0), Some(-0.5));
//! let supply = power_supply(Some(1.0), Some(1.5));
//! let result = market_equilibrium(&demand, &supply, None).unwrap().unwrap();
//! assert!(result.consumer_surplus().is_unbounded());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for curves, results and
//!   configuration

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

mod config;
pub mod curves;
pub mod equilibrium;
mod error;
mod roots;

pub use config::EngineConfig;
pub use error::MarketError;
