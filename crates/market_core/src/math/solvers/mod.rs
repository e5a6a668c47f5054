//! Root-finding solvers for equilibrium prices and choke prices.
//!
//! ## Available Solvers
//!
//! - [`BrentSolver`]: Robust bracketing method without derivative requirement
//! - [`GridScanner`]: Log-spaced sign-change scan that brackets every root on
//!   a price range and refines each bracket with Brent's method
//!
//! ## Configuration
//!
//! Both solvers use [`SolverConfig`] for configuring:
//! - `tolerance`: Convergence tolerance (default: 1e-10)
//! - `max_iterations`: Maximum iteration count (default: 100)
//!
//! ## Examples
//!
//! ```
//! use market_core::math::solvers::{GridScanner, SolverConfig};
//!
//! // Excess demand of q = 100 p^-0.5 against q = p^1.5 vanishes at p = 10
//! let excess = |p: f64| 100.0 / p.sqrt() - p.powf(1.5);
//!
//! let scanner = GridScanner::new(1e-6, 1e6, 400, SolverConfig::default());
//! let roots = scanner.find_roots(excess);
//!
//! assert_eq!(roots.len(), 1);
//! assert!((roots[0] - 10.0).abs() < 1e-8);
//! ```

mod brent;
mod config;
mod grid;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use grid::GridScanner;
