//! Polynomial coefficient extraction.

use super::simplify::{simplify_add, simplify_mul};
use super::{Expr, Symbol};

/// Highest degree tracked during extraction.
const MAX_DEGREE: usize = 4;

impl Expr {
    /// Coefficients `[c0, c1, ..., cn]` of the expression as a polynomial in
    /// `var`, lowest degree first.
    ///
    /// Coefficients may themselves be symbolic. Returns `None` when the
    /// expression is not a polynomial in `var` (the unknown appears under
    /// `exp`, `ln`, a non-integer or negative power, or in an exponent) or the
    /// degree exceeds four. Trailing zero coefficients are trimmed, so a
    /// constant yields a single coefficient.
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbolic::Expr;
    /// use market_core::symbols::{A, B, PRICE};
    ///
    /// // a - b*p^2
    /// let expr = Expr::from(A) - Expr::from(B) * Expr::from(PRICE).pow(2.0);
    /// let coefficients = expr.polynomial_coefficients(&PRICE).unwrap();
    /// assert_eq!(coefficients.len(), 3);
    /// assert_eq!(coefficients[0], Expr::from(A));
    /// assert!(coefficients[1].is_zero());
    /// ```
    pub fn polynomial_coefficients(&self, var: &Symbol) -> Option<Vec<Expr>> {
        let mut coefficients = collect(&self.simplify(), var)?;
        while coefficients.len() > 1 && coefficients.last().is_some_and(Expr::is_zero) {
            coefficients.pop();
        }
        Some(coefficients)
    }

    /// Degree of the expression in `var`, if it is a polynomial.
    pub fn degree_in(&self, var: &Symbol) -> Option<usize> {
        self.polynomial_coefficients(var).map(|c| c.len() - 1)
    }
}

fn collect(expr: &Expr, var: &Symbol) -> Option<Vec<Expr>> {
    if !expr.contains(var) {
        return Some(vec![expr.clone()]);
    }
    match expr {
        Expr::Sym(_) => Some(vec![Expr::zero(), Expr::one()]),
        Expr::Add(terms) => {
            let mut acc = vec![Expr::zero()];
            for term in terms {
                acc = add(&acc, &collect(term, var)?);
            }
            Some(acc)
        }
        Expr::Mul(factors) => {
            let mut acc = vec![Expr::one()];
            for factor in factors {
                acc = multiply(&acc, &collect(factor, var)?)?;
            }
            Some(acc)
        }
        Expr::Pow(base, exponent) => {
            let n = exponent.as_num()?;
            if n < 0.0 || n.fract() != 0.0 || n as usize > MAX_DEGREE {
                return None;
            }
            let base = collect(base, var)?;
            let mut acc = vec![Expr::one()];
            for _ in 0..n as usize {
                acc = multiply(&acc, &base)?;
            }
            Some(acc)
        }
        _ => None,
    }
}

fn add(lhs: &[Expr], rhs: &[Expr]) -> Vec<Expr> {
    (0..lhs.len().max(rhs.len()))
        .map(|i| {
            let terms = [lhs.get(i), rhs.get(i)]
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            simplify_add(terms)
        })
        .collect()
}

fn multiply(lhs: &[Expr], rhs: &[Expr]) -> Option<Vec<Expr>> {
    let degree = lhs.len() + rhs.len() - 2;
    if degree > MAX_DEGREE {
        return None;
    }
    let mut out: Vec<Vec<Expr>> = vec![Vec::new(); degree + 1];
    for (i, l) in lhs.iter().enumerate() {
        for (j, r) in rhs.iter().enumerate() {
            out[i + j].push(simplify_mul(vec![l.clone(), r.clone()]));
        }
    }
    Some(out.into_iter().map(simplify_add).collect())
}
