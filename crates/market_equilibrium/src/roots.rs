//! Candidate-root selection policy.
//!
//! Symbolic candidates are filtered with the structural sign analysis and
//! keep their enumeration order; numeric candidates must be finite and
//! non-negative and are tie-broken by value.

use market_core::symbolic::Expr;

/// First symbolic candidate that is not provably negative, preferring one
/// that is provably non-negative (the `+` branch of a square root over the
/// `-` branch).
pub(crate) fn first_admissible(candidates: &[Expr]) -> Option<Expr> {
    let admissible: Vec<&Expr> = candidates
        .iter()
        .filter(|c| !c.sign().is_negative())
        .collect();
    admissible
        .iter()
        .find(|c| c.sign().is_non_negative())
        .or_else(|| admissible.first())
        .map(|c| (*c).clone())
}

/// Returns true if `value` is an admissible price or quantity.
pub(crate) fn is_admissible(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Smallest finite non-negative value.
pub(crate) fn smallest_admissible(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| is_admissible(*v))
        .min_by(f64::total_cmp)
}

/// Largest finite non-negative value.
pub(crate) fn largest_admissible(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| is_admissible(*v))
        .max_by(f64::total_cmp)
}
