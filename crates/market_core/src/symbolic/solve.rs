//! Closed-form equation solving.

use super::simplify::{simplify_add, simplify_mul, simplify_pow};
use super::{Expr, Symbol};
use crate::types::SymbolicError;

/// Solve `lhs = rhs` for `var`.
///
/// Polynomial equations of degree one and two are solved by formula; other
/// forms are solved by isolating the unknown through inverse functions
/// (`exp` ↔ `ln`, powers ↔ roots). Candidates are returned in enumeration
/// order: for a square root or quadratic the negative branch comes first.
///
/// Only real candidates are kept: a negative discriminant or an impossible
/// inversion such as `exp(x) = -1` yields an empty vector. Constant
/// candidates that do not evaluate to a finite number are dropped.
///
/// # Errors
///
/// * `SymbolicError::Indeterminate` - The equation holds for every value of
///   `var`
/// * `SymbolicError::Unsolvable` - The unknown cannot be isolated in closed
///   form (it appears in several terms of a sum, or the polynomial degree is
///   above two)
///
/// # Example
///
/// ```
/// use market_core::symbolic::{solve, Expr};
/// use market_core::symbols::{PRICE, QUANTITY};
///
/// // q = 100 - 0.04 p^2 has the branches p = ∓ 5 sqrt(100 - q)
/// let demand = 100.0 - 0.04 * Expr::from(PRICE).pow(2.0);
/// let roots = solve(&Expr::from(QUANTITY), &demand, &PRICE).unwrap();
/// assert_eq!(roots.len(), 2);
///
/// let at_96 = roots[1].replace(&QUANTITY, &Expr::from(96.0));
/// assert!((at_96.as_num().unwrap() - 10.0).abs() < 1e-12);
/// ```
pub fn solve(lhs: &Expr, rhs: &Expr, var: &Symbol) -> Result<Vec<Expr>, SymbolicError> {
    let equation = simplify_add(vec![lhs.simplify(), negate(rhs.simplify())]);
    if !equation.contains(var) {
        if equation.is_zero() {
            return Err(SymbolicError::Indeterminate {
                variable: var.to_string(),
            });
        }
        return Ok(Vec::new());
    }

    let candidates = isolate(equation, Expr::zero(), var)?;
    let mut roots: Vec<Expr> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate = candidate.simplify();
        if candidate.is_degenerate() || candidate.contains(var) {
            continue;
        }
        if candidate.is_constant() && candidate.eval_constant().is_err() {
            continue;
        }
        if !roots.contains(&candidate) {
            roots.push(candidate);
        }
    }
    Ok(roots)
}

fn negate(expr: Expr) -> Expr {
    simplify_mul(vec![Expr::Num(-1.0), expr])
}

fn divide(numerator: Expr, denominator: Expr) -> Expr {
    simplify_mul(vec![numerator, simplify_pow(denominator, Expr::Num(-1.0))])
}

fn unsolvable(var: &Symbol, reason: &str) -> SymbolicError {
    SymbolicError::Unsolvable {
        variable: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Solves `lhs = rhs` where `rhs` is free of `var`.
fn isolate(lhs: Expr, rhs: Expr, var: &Symbol) -> Result<Vec<Expr>, SymbolicError> {
    let residual = simplify_add(vec![lhs.clone(), negate(rhs.clone())]);
    if let Some(coefficients) = residual.polynomial_coefficients(var) {
        match coefficients.len() {
            2 | 3 => return Ok(polynomial_roots(&coefficients)),
            1 => return Ok(Vec::new()),
            _ => {}
        }
    }

    match lhs {
        Expr::Sym(ref s) if s == var => Ok(vec![rhs]),
        Expr::Add(terms) => {
            let (dependent, rest): (Vec<Expr>, Vec<Expr>) =
                terms.into_iter().partition(|t| t.contains(var));
            match dependent.as_slice() {
                [single] => {
                    let moved = simplify_add(vec![rhs, negate(simplify_add(rest))]);
                    isolate(single.clone(), moved, var)
                }
                [first, second] if rest.is_empty() && rhs.is_zero() => {
                    // u + v = 0  =>  u / (-v) = 1
                    let ratio = divide(first.clone(), negate(second.clone()));
                    if ratio.is_one() {
                        return Err(SymbolicError::Indeterminate {
                            variable: var.to_string(),
                        });
                    }
                    isolate(ratio, Expr::one(), var)
                }
                _ => Err(unsolvable(var, "unknown appears in several terms")),
            }
        }
        Expr::Mul(factors) => {
            let (dependent, rest): (Vec<Expr>, Vec<Expr>) =
                factors.into_iter().partition(|f| f.contains(var));
            match dependent.as_slice() {
                [single] => isolate(single.clone(), divide(rhs, simplify_mul(rest)), var),
                _ if rhs.is_zero() => {
                    let mut roots = Vec::new();
                    for factor in dependent {
                        roots.extend(isolate(factor, Expr::zero(), var)?);
                    }
                    Ok(roots)
                }
                _ => Err(unsolvable(var, "unknown appears in several factors")),
            }
        }
        Expr::Pow(base, exponent) if !exponent.contains(var) => {
            invert_power(*base, *exponent, rhs, var)
        }
        Expr::Pow(base, exponent) if !base.contains(var) => {
            // b^u = r  =>  u = ln(r) / ln(b)
            if rhs.as_num().is_some_and(|r| r <= 0.0) {
                return Ok(Vec::new());
            }
            let target = divide(rhs.ln().simplify(), (*base).ln().simplify());
            isolate(*exponent, target, var)
        }
        Expr::Exp(arg) => {
            if rhs.as_num().is_some_and(|r| r <= 0.0) {
                return Ok(Vec::new());
            }
            isolate(*arg, rhs.ln().simplify(), var)
        }
        Expr::Ln(arg) => isolate(*arg, rhs.exp().simplify(), var),
        _ => Err(unsolvable(var, "no inverse for this form")),
    }
}

/// Solves `base^exponent = rhs` for a constant exponent.
fn invert_power(
    base: Expr,
    exponent: Expr,
    rhs: Expr,
    var: &Symbol,
) -> Result<Vec<Expr>, SymbolicError> {
    let n = exponent.as_num();
    if rhs.is_zero() {
        return match n {
            Some(e) if e > 0.0 => isolate(base, Expr::zero(), var),
            _ => Ok(Vec::new()),
        };
    }
    let inverse = divide(Expr::one(), exponent);
    let negative_rhs = rhs.as_num().is_some_and(|r| r < 0.0);
    match n {
        Some(e) if e.fract() == 0.0 && e % 2.0 == 0.0 => {
            if negative_rhs {
                return Ok(Vec::new());
            }
            let root = simplify_pow(rhs, inverse);
            let mut roots = isolate(base.clone(), negate(root.clone()), var)?;
            roots.extend(isolate(base, root, var)?);
            Ok(roots)
        }
        Some(e) if e.fract() == 0.0 && negative_rhs => {
            // Odd root of a negative number
            let root = negate(simplify_pow(negate(rhs), inverse));
            isolate(base, root, var)
        }
        Some(_) if negative_rhs => Ok(Vec::new()),
        _ => isolate(base, simplify_pow(rhs, inverse), var),
    }
}

/// Roots of `c0 + c1 x (+ c2 x^2)`, negative branch first.
fn polynomial_roots(coefficients: &[Expr]) -> Vec<Expr> {
    match coefficients {
        [c0, c1] => vec![negate(divide(c0.clone(), c1.clone()))],
        [c0, c1, c2] if c1.is_zero() => {
            // c2 x^2 = -c0
            let square = negate(divide(c0.clone(), c2.clone()));
            if square.as_num().is_some_and(|v| v < 0.0) {
                return Vec::new();
            }
            let root = simplify_pow(square, Expr::Num(0.5));
            if root.is_zero() {
                return vec![root];
            }
            vec![negate(root.clone()), root]
        }
        [c0, c1, c2] => {
            let discriminant = simplify_add(vec![
                simplify_pow(c1.clone(), Expr::Num(2.0)),
                simplify_mul(vec![Expr::Num(-4.0), c2.clone(), c0.clone()]),
            ]);
            let twice_leading = simplify_mul(vec![Expr::Num(2.0), c2.clone()]);
            match discriminant.as_num() {
                Some(d) if d < 0.0 => Vec::new(),
                Some(d) if d == 0.0 => vec![negate(divide(c1.clone(), twice_leading))],
                _ => {
                    let root = simplify_pow(discriminant, Expr::Num(0.5));
                    let minus_b = negate(c1.clone());
                    let lower = simplify_add(vec![minus_b.clone(), negate(root.clone())]);
                    let upper = simplify_add(vec![minus_b, root]);
                    vec![
                        divide(lower, twice_leading.clone()),
                        divide(upper, twice_leading),
                    ]
                }
            }
        }
        _ => Vec::new(),
    }
}
