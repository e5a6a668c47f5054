//! Parameter bindings: symbol → numeric value.

use super::{Expr, Symbol};
use std::collections::BTreeMap;

/// Mapping from parameter symbols to numeric values.
///
/// Bindings may be partial: symbols without a value stay symbolic until a
/// numeric reduction is requested. Integer values are widened to `f64` on
/// insertion.
///
/// # Example
///
/// ```
/// use market_core::symbolic::ParameterBinding;
/// use market_core::symbols::{A, B};
///
/// let stored = ParameterBinding::new().with(A, 100).with(B, 2.0);
/// let call_time = ParameterBinding::new().with(B, 4.0);
///
/// let merged = stored.merged(&call_time);
/// assert_eq!(merged.get(&A), Some(100.0));
/// assert_eq!(merged.get(&B), Some(4.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParameterBinding {
    values: BTreeMap<Symbol, f64>,
}

impl ParameterBinding {
    /// Create an empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, symbol: Symbol, value: impl Into<f64>) -> Self {
        self.insert(symbol, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, symbol: Symbol, value: impl Into<f64>) {
        self.values.insert(symbol, value.into());
    }

    /// Remove a value, returning it if present.
    pub fn remove(&mut self, symbol: &Symbol) -> Option<f64> {
        self.values.remove(symbol)
    }

    /// Returns the value bound to `symbol`.
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(symbol).copied()
    }

    /// Returns true if `symbol` has a value.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.values.contains_key(symbol)
    }

    /// Number of bound symbols.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over bindings in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.values.iter().map(|(s, v)| (s, *v))
    }

    /// Returns a new binding where values in `overrides` replace ours.
    pub fn merged(&self, overrides: &ParameterBinding) -> ParameterBinding {
        let mut values = self.values.clone();
        values.extend(overrides.iter().map(|(s, v)| (s.clone(), v)));
        ParameterBinding { values }
    }

    /// Returns the bindings as `(symbol, constant expression)` pairs.
    pub fn to_substitutions(&self) -> Vec<(Symbol, Expr)> {
        self.iter().map(|(s, v)| (s.clone(), Expr::Num(v))).collect()
    }
}

impl FromIterator<(Symbol, f64)> for ParameterBinding {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        ParameterBinding {
            values: iter.into_iter().collect(),
        }
    }
}
