//! Shared symbol registry.
//!
//! Every curve family is written over the same two unknowns and four
//! parameters. Demand curves use `a` and `b`, supply curves use `c` and `d`,
//! so a demand/supply pair never shares a parameter name.

use crate::symbolic::Symbol;

/// Price unknown `p`.
pub const PRICE: Symbol = Symbol::from_static("p");

/// Quantity unknown `q`.
pub const QUANTITY: Symbol = Symbol::from_static("q");

/// First demand parameter `a`.
pub const A: Symbol = Symbol::from_static("a");

/// Second demand parameter `b`.
pub const B: Symbol = Symbol::from_static("b");

/// First supply parameter `c`.
pub const C: Symbol = Symbol::from_static("c");

/// Second supply parameter `d`.
pub const D: Symbol = Symbol::from_static("d");

/// The four curve parameters in registry order.
pub fn parameters() -> [Symbol; 4] {
    [A, B, C, D]
}

/// Look up a registry symbol by name.
///
/// # Example
///
/// ```
/// use market_core::symbols::{lookup, PRICE};
///
/// assert_eq!(lookup("p"), Some(PRICE));
/// assert_eq!(lookup("z"), None);
/// ```
pub fn lookup(name: &str) -> Option<Symbol> {
    [PRICE, QUANTITY, A, B, C, D]
        .into_iter()
        .find(|s| s.name() == name)
}
