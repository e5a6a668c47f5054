//! Differentiation and integration.
//!
//! Antiderivatives cover the forms that arise from the four curve families
//! and their inverses: polynomials, powers and exponentials of an argument
//! linear in the variable, and logarithms of a linear argument.

use super::simplify::{simplify_add, simplify_mul};
use super::{Expr, Symbol};
use crate::types::SymbolicError;

impl Expr {
    /// Derivative with respect to `var`, in canonical form.
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbolic::Expr;
    /// use market_core::symbols::PRICE;
    ///
    /// // d/dp (100 - 0.04 p^2) = -0.08 p
    /// let p = Expr::from(PRICE);
    /// let slope = (100.0 - 0.04 * p.clone().pow(2.0)).derivative(&PRICE);
    /// assert_eq!(slope, (-0.08 * p).simplify());
    /// ```
    pub fn derivative(&self, var: &Symbol) -> Expr {
        differentiate(&self.simplify(), var).simplify()
    }

    /// Indefinite integral with respect to `var` (integration constant
    /// omitted).
    ///
    /// # Errors
    ///
    /// * `SymbolicError::NoAntiderivative` - The integrand is outside the
    ///   supported forms
    pub fn antiderivative(&self, var: &Symbol) -> Result<Expr, SymbolicError> {
        integrate(&self.simplify(), var).map(|e| e.simplify())
    }

    /// Definite integral of the expression over `[lower, upper]`.
    ///
    /// Bounds may be symbolic.
    ///
    /// # Errors
    ///
    /// * `SymbolicError::NoAntiderivative` - No closed form is available
    /// * `SymbolicError::Undefined` - The antiderivative is not finite at a
    ///   bound (for instance `ln(0)` at a lower bound of zero)
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbolic::Expr;
    /// use market_core::symbols::QUANTITY;
    ///
    /// // Area under 34 - q/2 between 0 and 68
    /// let integrand = 34.0 - 0.5 * Expr::from(QUANTITY);
    /// let area = integrand
    ///     .definite_integral(&QUANTITY, &Expr::zero(), &Expr::from(68.0))
    ///     .unwrap();
    /// assert_eq!(area, Expr::Num(1156.0));
    /// ```
    pub fn definite_integral(
        &self,
        var: &Symbol,
        lower: &Expr,
        upper: &Expr,
    ) -> Result<Expr, SymbolicError> {
        let primitive = self.antiderivative(var)?;
        let at_upper = primitive.replace(var, upper);
        let at_lower = primitive.replace(var, lower);
        for bound in [&at_upper, &at_lower] {
            if bound.is_degenerate() {
                return Err(SymbolicError::Undefined {
                    expression: bound.to_string(),
                });
            }
        }
        Ok(simplify_add(vec![
            at_upper,
            simplify_mul(vec![Expr::Num(-1.0), at_lower]),
        ]))
    }
}

fn differentiate(expr: &Expr, var: &Symbol) -> Expr {
    if !expr.contains(var) {
        return Expr::zero();
    }
    match expr {
        Expr::Num(_) => Expr::zero(),
        Expr::Sym(s) => {
            if s == var {
                Expr::one()
            } else {
                Expr::zero()
            }
        }
        Expr::Add(terms) => Expr::Add(terms.iter().map(|t| differentiate(t, var)).collect()),
        Expr::Mul(factors) => {
            // Product rule
            let terms = (0..factors.len())
                .filter(|&i| factors[i].contains(var))
                .map(|i| {
                    let mut product = factors.clone();
                    product[i] = differentiate(&factors[i], var);
                    Expr::Mul(product)
                })
                .collect();
            Expr::Add(terms)
        }
        Expr::Pow(base, exponent) => {
            let (b, e) = (base.as_ref(), exponent.as_ref());
            if !e.contains(var) {
                // e * b^(e - 1) * b'
                Expr::Mul(vec![
                    e.clone(),
                    b.clone().pow(e.clone() - 1.0),
                    differentiate(b, var),
                ])
            } else if !b.contains(var) {
                // b^e * ln(b) * e'
                Expr::Mul(vec![expr.clone(), b.clone().ln(), differentiate(e, var)])
            } else {
                // b^e * (e' ln(b) + e b' / b)
                Expr::Mul(vec![
                    expr.clone(),
                    Expr::Add(vec![
                        Expr::Mul(vec![differentiate(e, var), b.clone().ln()]),
                        Expr::Mul(vec![e.clone(), differentiate(b, var), b.clone().recip()]),
                    ]),
                ])
            }
        }
        Expr::Exp(arg) => Expr::Mul(vec![expr.clone(), differentiate(arg, var)]),
        Expr::Ln(arg) => Expr::Mul(vec![differentiate(arg, var), arg.as_ref().clone().recip()]),
    }
}

/// Returns `(slope, intercept)` when `expr` is linear in `var`.
fn linear_parts(expr: &Expr, var: &Symbol) -> Option<(Expr, Expr)> {
    let mut coefficients = expr.polynomial_coefficients(var)?;
    if coefficients.len() != 2 {
        return None;
    }
    let slope = coefficients.pop()?;
    let intercept = coefficients.pop()?;
    Some((slope, intercept))
}

fn integrate(expr: &Expr, var: &Symbol) -> Result<Expr, SymbolicError> {
    if !expr.contains(var) {
        return Ok(Expr::Mul(vec![expr.clone(), Expr::Sym(var.clone())]));
    }
    if let Some(coefficients) = expr.polynomial_coefficients(var) {
        let terms = coefficients
            .into_iter()
            .enumerate()
            .map(|(k, c)| {
                let n = (k + 1) as f64;
                Expr::Mul(vec![c, Expr::Num(1.0 / n), Expr::Sym(var.clone()).pow(n)])
            })
            .collect();
        return Ok(Expr::Add(terms));
    }

    let unsupported = || SymbolicError::NoAntiderivative {
        expression: expr.to_string(),
        variable: var.to_string(),
    };

    match expr {
        Expr::Add(terms) => terms
            .iter()
            .map(|t| integrate(t, var))
            .collect::<Result<Vec<_>, _>>()
            .map(Expr::Add),
        Expr::Mul(factors) => {
            let (mut constant, dependent): (Vec<Expr>, Vec<Expr>) =
                factors.iter().cloned().partition(|f| !f.contains(var));
            match dependent.as_slice() {
                [single] => {
                    constant.push(integrate(single, var)?);
                    Ok(Expr::Mul(constant))
                }
                _ => Err(unsupported()),
            }
        }
        Expr::Pow(base, exponent) if !exponent.contains(var) => {
            let (slope, _) = linear_parts(base, var).ok_or_else(unsupported)?;
            if exponent.as_num() == Some(-1.0) {
                // ln(u) / k
                return Ok(Expr::Mul(vec![base.as_ref().clone().ln(), slope.recip()]));
            }
            // u^(n + 1) / ((n + 1) k)
            let raised = exponent.as_ref().clone() + 1.0;
            Ok(Expr::Mul(vec![
                base.as_ref().clone().pow(raised.clone()),
                raised.recip(),
                slope.recip(),
            ]))
        }
        Expr::Pow(base, exponent) if !base.contains(var) => {
            // b^u / (k ln b)
            let (slope, _) = linear_parts(exponent, var).ok_or_else(unsupported)?;
            Ok(Expr::Mul(vec![
                expr.clone(),
                slope.recip(),
                base.as_ref().clone().ln().recip(),
            ]))
        }
        Expr::Exp(arg) => {
            let (slope, _) = linear_parts(arg, var).ok_or_else(unsupported)?;
            Ok(Expr::Mul(vec![expr.clone(), slope.recip()]))
        }
        Expr::Ln(arg) => {
            // (u ln u - u) / k
            let (slope, _) = linear_parts(arg, var).ok_or_else(unsupported)?;
            let u = arg.as_ref().clone();
            Ok(Expr::Mul(vec![
                Expr::Add(vec![
                    Expr::Mul(vec![u.clone(), u.clone().ln()]),
                    Expr::Mul(vec![Expr::Num(-1.0), u]),
                ]),
                slope.recip(),
            ]))
        }
        _ => Err(unsupported()),
    }
}
