//! Canonical simplification.
//!
//! Rewrites applied bottom-up:
//! - nested sums and products are flattened
//! - numeric constants are folded
//! - like terms are collected (`2*p + 3*p -> 5*p`) and equal bases are
//!   merged (`p^a * p^b -> p^(a + b)`)
//! - a numeric factor is distributed into the only sum of a product
//!   (`-(a - c) -> c - a`)
//! - numeric powers are distributed over products and nested powers are
//!   collapsed
//! - `exp(ln(x)) -> x`, `ln(exp(x)) -> x`, `exp(x)*exp(y) -> exp(x + y)`
//!
//! Power rewrites treat symbols as positive reals, which holds for prices,
//! quantities and the scale parameters of every supported curve family.

use super::Expr;

impl Expr {
    /// Returns the canonical simplified form of the expression.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Num(_) | Expr::Sym(_) => self.clone(),
            Expr::Add(terms) => simplify_add(terms.iter().map(Expr::simplify).collect()),
            Expr::Mul(factors) => simplify_mul(factors.iter().map(Expr::simplify).collect()),
            Expr::Pow(b, e) => simplify_pow(b.simplify(), e.simplify()),
            Expr::Exp(a) => simplify_exp(a.simplify()),
            Expr::Ln(a) => simplify_ln(a.simplify()),
        }
    }
}

/// Splits a canonical term into its numeric coefficient and the remainder.
pub(crate) fn split_coefficient(term: Expr) -> (f64, Expr) {
    match term {
        Expr::Num(v) => (v, Expr::Num(1.0)),
        Expr::Mul(mut factors) => match factors.first() {
            Some(Expr::Num(c)) => {
                let c = *c;
                factors.remove(0);
                let rest = match factors.len() {
                    0 => Expr::Num(1.0),
                    1 => factors.swap_remove(0),
                    _ => Expr::Mul(factors),
                };
                (c, rest)
            }
            _ => (1.0, Expr::Mul(factors)),
        },
        other => (1.0, other),
    }
}

fn scale(coefficient: f64, term: Expr) -> Expr {
    if coefficient == 1.0 {
        return term;
    }
    match term {
        Expr::Num(v) => Expr::Num(coefficient * v),
        Expr::Mul(mut factors) => {
            factors.insert(0, Expr::Num(coefficient));
            Expr::Mul(factors)
        }
        other => Expr::Mul(vec![Expr::Num(coefficient), other]),
    }
}

/// Combines already-simplified terms into a canonical sum.
pub(crate) fn simplify_add(terms: Vec<Expr>) -> Expr {
    let mut constant = 0.0;
    let mut collected: Vec<(Expr, f64)> = Vec::new();

    let flat = terms.into_iter().flat_map(|t| match t {
        Expr::Add(inner) => inner,
        other => vec![other],
    });
    for term in flat {
        if let Expr::Num(v) = term {
            constant += v;
            continue;
        }
        let (coefficient, rest) = split_coefficient(term);
        match collected.iter_mut().find(|(e, _)| *e == rest) {
            Some(slot) => slot.1 += coefficient,
            None => collected.push((rest, coefficient)),
        }
    }

    let mut out: Vec<Expr> = collected
        .into_iter()
        .filter(|(_, c)| *c != 0.0)
        .map(|(e, c)| scale(c, e))
        .collect();
    if constant != 0.0 || out.is_empty() {
        out.push(Expr::Num(constant));
    }
    out.sort_by(Expr::canonical_cmp);
    match out.len() {
        1 => out.swap_remove(0),
        _ => Expr::Add(out),
    }
}

/// Combines already-simplified factors into a canonical product.
pub(crate) fn simplify_mul(factors: Vec<Expr>) -> Expr {
    let mut coefficient = 1.0;
    let mut powers: Vec<(Expr, Vec<Expr>)> = Vec::new();
    let mut exp_args: Vec<Expr> = Vec::new();

    let flat = factors.into_iter().flat_map(|f| match f {
        Expr::Mul(inner) => inner,
        other => vec![other],
    });
    for factor in flat {
        match factor {
            Expr::Num(v) => coefficient *= v,
            Expr::Exp(arg) => exp_args.push(*arg),
            Expr::Pow(base, exponent) => push_power(&mut powers, *base, *exponent),
            other => push_power(&mut powers, other, Expr::Num(1.0)),
        }
    }
    if coefficient == 0.0 {
        return Expr::Num(0.0);
    }

    let mut out: Vec<Expr> = Vec::new();
    for (base, exponents) in powers {
        let exponent = simplify_add(exponents);
        absorb(simplify_pow(base, exponent), &mut coefficient, &mut out);
    }
    if !exp_args.is_empty() {
        absorb(simplify_exp(simplify_add(exp_args)), &mut coefficient, &mut out);
    }
    if coefficient == 0.0 {
        return Expr::Num(0.0);
    }

    // A numeric coefficient is pushed into the only sum of the product
    let sums = out.iter().filter(|f| matches!(f, Expr::Add(_))).count();
    if coefficient != 1.0 && sums == 1 {
        for factor in out.iter_mut() {
            if let Expr::Add(terms) = factor {
                *factor = simplify_add(
                    terms
                        .iter()
                        .map(|t| simplify_mul(vec![Expr::Num(coefficient), t.clone()]))
                        .collect(),
                );
            }
        }
        coefficient = 1.0;
    }
    out.sort_by(Expr::canonical_cmp);
    if coefficient != 1.0 || out.is_empty() {
        out.insert(0, Expr::Num(coefficient));
    }
    match out.len() {
        1 => out.swap_remove(0),
        _ => Expr::Mul(out),
    }
}

fn absorb(e: Expr, coefficient: &mut f64, out: &mut Vec<Expr>) {
    match e {
        Expr::Num(v) => *coefficient *= v,
        Expr::Mul(inner) => {
            for f in inner {
                match f {
                    Expr::Num(v) => *coefficient *= v,
                    other => out.push(other),
                }
            }
        }
        other => out.push(other),
    }
}

fn push_power(powers: &mut Vec<(Expr, Vec<Expr>)>, base: Expr, exponent: Expr) {
    match powers.iter_mut().find(|(b, _)| *b == base) {
        Some(slot) => slot.1.push(exponent),
        None => powers.push((base, vec![exponent])),
    }
}

fn is_integer(v: f64) -> bool {
    v.fract() == 0.0
}

/// Simplifies `base ^ exponent` where both operands are canonical.
pub(crate) fn simplify_pow(base: Expr, exponent: Expr) -> Expr {
    if exponent.is_zero() {
        return Expr::Num(1.0);
    }
    if exponent.is_one() {
        return base;
    }
    match (base, exponent) {
        (Expr::Num(b), Expr::Num(e)) => {
            let value = b.powf(e);
            if value.is_finite() && (b >= 0.0 || is_integer(e)) {
                Expr::Num(value)
            } else {
                Expr::Pow(Box::new(Expr::Num(b)), Box::new(Expr::Num(e)))
            }
        }
        (Expr::Num(b), _) if b == 1.0 => Expr::Num(1.0),
        (Expr::Num(b), exponent) if b == 0.0 && exponent.sign().is_positive() => Expr::Num(0.0),
        (Expr::Pow(inner_base, inner_exp), exponent) => {
            let combined = simplify_mul(vec![*inner_exp, exponent]);
            simplify_pow(*inner_base, combined)
        }
        (Expr::Exp(arg), exponent) => simplify_exp(simplify_mul(vec![*arg, exponent])),
        (Expr::Mul(factors), Expr::Num(e)) if can_distribute(&factors, e) => simplify_mul(
            factors
                .into_iter()
                .map(|f| simplify_pow(f, Expr::Num(e)))
                .collect(),
        ),
        (Expr::Add(terms), Expr::Num(e))
            if is_integer(e) && e % 2.0 != 0.0 && all_negative(&terms) =>
        {
            // (-x)^n = -(x^n) for odd n: keeps denominators like 1/(b + d)
            let flipped = simplify_mul(vec![Expr::Num(-1.0), Expr::Add(terms)]);
            simplify_mul(vec![Expr::Num(-1.0), simplify_pow(flipped, Expr::Num(e))])
        }
        (base, exponent) => Expr::Pow(Box::new(base), Box::new(exponent)),
    }
}

fn can_distribute(factors: &[Expr], exponent: f64) -> bool {
    is_integer(exponent)
        || factors
            .iter()
            .all(|f| !matches!(f, Expr::Num(v) if *v < 0.0))
}

fn all_negative(terms: &[Expr]) -> bool {
    terms.iter().all(|t| split_coefficient(t.clone()).0 < 0.0)
}

pub(crate) fn simplify_exp(arg: Expr) -> Expr {
    match arg {
        Expr::Num(v) if v.exp().is_finite() => Expr::Num(v.exp()),
        Expr::Ln(inner) => *inner,
        other => Expr::Exp(Box::new(other)),
    }
}

pub(crate) fn simplify_ln(arg: Expr) -> Expr {
    match arg {
        Expr::Num(v) if v > 0.0 => Expr::Num(v.ln()),
        Expr::Exp(inner) => *inner,
        other => Expr::Ln(Box::new(other)),
    }
}
