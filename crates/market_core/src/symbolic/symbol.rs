//! Named symbols.

use std::borrow::Cow;
use std::fmt;

/// An atomic named unknown or parameter.
///
/// Symbols are immutable and compared by name. Registry symbols borrow a
/// `'static` name so they can be declared as constants; symbols created at
/// runtime own their name. Ordering is by name, which keeps symbol sets and
/// parameter bindings deterministic.
///
/// # Example
///
/// ```
/// use market_core::symbolic::Symbol;
///
/// const ALPHA: Symbol = Symbol::from_static("alpha");
/// assert_eq!(ALPHA, Symbol::new("alpha"));
/// assert_eq!(ALPHA.name(), "alpha");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Symbol(Cow<'static, str>);

impl Symbol {
    /// Create a symbol from a static name (usable in `const` items).
    pub const fn from_static(name: &'static str) -> Self {
        Symbol(Cow::Borrowed(name))
    }

    /// Create a symbol from a runtime name.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(Cow::Owned(name.into()))
    }

    /// Returns the symbol name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}
