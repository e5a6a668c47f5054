//! Rational normal form.
//!
//! [`Expr::cancel`] rewrites an expression as one expanded polynomial over a
//! product of polynomial factors, then divides out every factor that also
//! divides the numerator. Symbols and the sub-terms that are not polynomial
//! (`exp`, `ln`, non-integer or symbolic powers) act as the variables.

use super::simplify::{simplify_add, simplify_mul, simplify_pow};
use super::Expr;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Largest integer power that is expanded.
const MAX_POWER: u32 = 6;

/// Largest number of terms kept in any polynomial.
const MAX_TERMS: usize = 128;

/// Coefficients smaller than this fraction of the largest are rounding noise.
const RELATIVE_EPSILON: f64 = 1e-12;

impl Expr {
    /// Returns the expression as a single reduced fraction.
    ///
    /// The numerator is expanded and the denominator is kept as a product of
    /// monic factors, so nested fractions such as `a/b + (c - a)/(b + d)`
    /// become `(a*d + b*c)/(b*(b + d))`. Falls back to [`Expr::simplify`]
    /// when the expansion would grow past a fixed number of terms.
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbolic::Expr;
    /// use market_core::symbols::{A, B};
    ///
    /// let (a, b) = (Expr::from(A), Expr::from(B));
    /// // (a^2 - b^2)/(a + b) = a - b
    /// let expr = (a.clone().pow(2.0) - b.clone().pow(2.0)) / (a.clone() + b.clone());
    /// assert_eq!(expr.cancel(), (a - b).simplify());
    /// ```
    pub fn cancel(&self) -> Expr {
        let simplified = self.simplify();
        match rational(&simplified) {
            Some(mut fraction) if fraction.is_finite() => {
                fraction.reduce();
                fraction.to_expr()
            }
            _ => simplified,
        }
    }
}

/// A polynomial variable, ordered by the canonical expression order.
#[derive(Debug, Clone)]
struct Atom(Expr);

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.canonical_cmp(&other.0)
    }
}

/// Variables with positive exponents.
type Monomial = BTreeMap<Atom, u32>;

/// Lexicographic monomial order: the earlier variable decides.
fn lex_cmp(lhs: &Monomial, rhs: &Monomial) -> Ordering {
    let mut lhs = lhs.iter().peekable();
    let mut rhs = rhs.iter().peekable();
    loop {
        match (lhs.peek().copied(), rhs.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some((l, le)), Some((r, re))) => match l.cmp(r) {
                Ordering::Less => return Ordering::Greater,
                Ordering::Greater => return Ordering::Less,
                Ordering::Equal => match le.cmp(re) {
                    Ordering::Equal => {
                        lhs.next();
                        rhs.next();
                    }
                    unequal => return unequal,
                },
            },
        }
    }
}

fn multiply_monomials(lhs: &Monomial, rhs: &Monomial) -> Monomial {
    let mut out = lhs.clone();
    for (atom, exponent) in rhs {
        *out.entry(atom.clone()).or_insert(0) += exponent;
    }
    out
}

fn divide_monomials(dividend: &Monomial, divisor: &Monomial) -> Option<Monomial> {
    let mut out = dividend.clone();
    for (atom, exponent) in divisor {
        let slot = out.get_mut(atom)?;
        match (*slot).cmp(exponent) {
            Ordering::Less => return None,
            Ordering::Equal => {
                out.remove(atom);
            }
            Ordering::Greater => *slot -= exponent,
        }
    }
    Some(out)
}

/// Sparse multivariate polynomial with real coefficients.
#[derive(Debug, Clone, Default, PartialEq)]
struct Poly {
    terms: BTreeMap<Monomial, f64>,
}

impl Poly {
    fn constant(value: f64) -> Poly {
        Poly::term(Monomial::new(), value)
    }

    fn term(monomial: Monomial, coefficient: f64) -> Poly {
        let mut terms = BTreeMap::new();
        if coefficient != 0.0 {
            terms.insert(monomial, coefficient);
        }
        Poly { terms }
    }

    fn atom(expr: Expr) -> Poly {
        Poly::term(Monomial::from([(Atom(expr), 1)]), 1.0)
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self.terms.get(&Monomial::new()).copied(),
            _ => None,
        }
    }

    fn magnitude(&self) -> f64 {
        self.terms.values().fold(0.0, |max, c| max.max(c.abs()))
    }

    fn is_finite(&self) -> bool {
        self.terms.values().all(|c| c.is_finite())
    }

    fn drop_noise(&mut self, magnitude: f64) {
        let cutoff = magnitude * RELATIVE_EPSILON;
        self.terms.retain(|_, c| c.abs() > cutoff);
    }

    fn leading(&self) -> Option<(&Monomial, f64)> {
        self.terms
            .iter()
            .max_by(|(l, _), (r, _)| lex_cmp(l, r))
            .map(|(m, c)| (m, *c))
    }

    fn add(&self, other: &Poly) -> Option<Poly> {
        let magnitude = self.magnitude().max(other.magnitude());
        let mut out = self.clone();
        for (monomial, coefficient) in &other.terms {
            *out.terms.entry(monomial.clone()).or_insert(0.0) += coefficient;
        }
        out.drop_noise(magnitude);
        (out.terms.len() <= MAX_TERMS).then_some(out)
    }

    fn scaled(&self, factor: f64) -> Poly {
        if factor == 0.0 {
            return Poly::default();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    fn mul(&self, other: &Poly) -> Option<Poly> {
        let mut out = Poly::default();
        for (lm, lc) in &self.terms {
            for (rm, rc) in &other.terms {
                *out.terms.entry(multiply_monomials(lm, rm)).or_insert(0.0) += lc * rc;
            }
        }
        out.drop_noise(self.magnitude() * other.magnitude());
        (out.terms.len() <= MAX_TERMS).then_some(out)
    }

    fn pow(&self, n: u32) -> Option<Poly> {
        (0..n).try_fold(Poly::constant(1.0), |acc, _| acc.mul(self))
    }

    /// `self / divisor` when the division leaves no remainder.
    fn divide_exact(&self, divisor: &Poly) -> Option<Poly> {
        let (lead, lead_coefficient) = divisor.leading()?;
        let lead = lead.clone();
        let magnitude = self.magnitude();
        let mut remainder = self.clone();
        let mut quotient = Poly::default();
        for _ in 0..=MAX_TERMS {
            let Some((monomial, coefficient)) = remainder.leading() else {
                return Some(quotient);
            };
            let monomial = monomial.clone();
            let step = Poly::term(
                divide_monomials(&monomial, &lead)?,
                coefficient / lead_coefficient,
            );
            remainder = remainder.add(&divisor.mul(&step)?.scaled(-1.0))?;
            remainder.terms.remove(&monomial);
            remainder.drop_noise(magnitude);
            quotient = quotient.add(&step)?;
        }
        None
    }

    fn to_expr(&self) -> Expr {
        let terms = self
            .terms
            .iter()
            .map(|(monomial, coefficient)| {
                let mut factors = vec![Expr::Num(*coefficient)];
                factors.extend(
                    monomial
                        .iter()
                        .map(|(atom, e)| simplify_pow(atom.0.clone(), Expr::Num(f64::from(*e)))),
                );
                simplify_mul(factors)
            })
            .collect();
        simplify_add(terms)
    }
}

/// `numerator / Π factor^multiplicity`, with monic non-constant factors.
#[derive(Debug, Clone)]
struct Fraction {
    numerator: Poly,
    denominator: Vec<(Poly, u32)>,
}

impl Fraction {
    fn from_poly(numerator: Poly) -> Fraction {
        Fraction {
            numerator,
            denominator: Vec::new(),
        }
    }

    fn is_finite(&self) -> bool {
        self.numerator.is_finite() && self.denominator.iter().all(|(f, _)| f.is_finite())
    }

    fn multiplicity(&self, factor: &Poly) -> u32 {
        self.denominator
            .iter()
            .find(|(f, _)| f == factor)
            .map_or(0, |(_, m)| *m)
    }

    /// Product of the factors raised to `multiplicity(f) - subtract(f)`.
    fn cofactor(&self, subtract: &Fraction) -> Option<Poly> {
        self.denominator
            .iter()
            .try_fold(Poly::constant(1.0), |acc, (factor, m)| {
                acc.mul(&factor.pow(m - subtract.multiplicity(factor))?)
            })
    }

    fn add(&self, other: &Fraction) -> Option<Fraction> {
        let mut common = Fraction::from_poly(Poly::default());
        for (factor, m) in self.denominator.iter().chain(&other.denominator) {
            match common.denominator.iter_mut().find(|(f, _)| f == factor) {
                Some(slot) => slot.1 = slot.1.max(*m),
                None => common.denominator.push((factor.clone(), *m)),
            }
        }
        let lhs = self.numerator.mul(&common.cofactor(self)?)?;
        let rhs = other.numerator.mul(&common.cofactor(other)?)?;
        common.numerator = lhs.add(&rhs)?;
        Some(common)
    }

    fn mul(&self, other: &Fraction) -> Option<Fraction> {
        let mut out = Fraction::from_poly(self.numerator.mul(&other.numerator)?);
        for (factor, m) in self.denominator.iter().chain(&other.denominator) {
            out.push_factor(factor.clone(), *m);
        }
        Some(out)
    }

    fn pow(&self, n: u32) -> Option<Fraction> {
        Some(Fraction {
            numerator: self.numerator.pow(n)?,
            denominator: self
                .denominator
                .iter()
                .map(|(f, m)| (f.clone(), m * n))
                .collect(),
        })
    }

    fn recip(&self) -> Option<Fraction> {
        let numerator = self
            .denominator
            .iter()
            .try_fold(Poly::constant(1.0), |acc, (f, m)| acc.mul(&f.pow(*m)?))?;
        let mut out = Fraction::from_poly(numerator);
        out.divide_by(self.numerator.clone(), 1)?;
        Some(out)
    }

    /// Moves `poly^multiplicity` into the denominator, splitting monomials
    /// into their variables and scaling factors to a leading coefficient of
    /// one.
    fn divide_by(&mut self, poly: Poly, multiplicity: u32) -> Option<()> {
        if poly.is_zero() {
            return None;
        }
        let power = i32::try_from(multiplicity).ok()?;
        if let Some(value) = poly.as_constant() {
            self.numerator = self.numerator.scaled(value.powi(-power));
            return Some(());
        }
        if poly.terms.len() == 1 {
            let (monomial, coefficient) = poly.terms.into_iter().next()?;
            self.numerator = self.numerator.scaled(coefficient.powi(-power));
            for (atom, e) in monomial {
                self.push_factor(Poly::atom(atom.0), e * multiplicity);
            }
            return Some(());
        }
        let (_, lead) = poly.leading()?;
        self.numerator = self.numerator.scaled(lead.powi(-power));
        self.push_factor(poly.scaled(1.0 / lead), multiplicity);
        Some(())
    }

    fn push_factor(&mut self, factor: Poly, multiplicity: u32) {
        match self.denominator.iter_mut().find(|(f, _)| *f == factor) {
            Some(slot) => slot.1 += multiplicity,
            None => self.denominator.push((factor, multiplicity)),
        }
    }

    /// Divides out every denominator factor that divides the numerator.
    fn reduce(&mut self) {
        if self.numerator.is_zero() {
            self.denominator.clear();
            return;
        }
        for (factor, m) in self.denominator.iter_mut() {
            while *m > 0 {
                match self.numerator.divide_exact(factor) {
                    Some(quotient) => {
                        self.numerator = quotient;
                        *m -= 1;
                    }
                    None => break,
                }
            }
        }
        self.denominator.retain(|(_, m)| *m > 0);
    }

    fn to_expr(&self) -> Expr {
        let mut factors = vec![self.numerator.to_expr()];
        for (factor, m) in &self.denominator {
            factors.push(simplify_pow(factor.to_expr(), Expr::Num(-f64::from(*m))));
        }
        simplify_mul(factors)
    }
}

fn rational(expr: &Expr) -> Option<Fraction> {
    match expr {
        Expr::Num(v) if v.is_finite() => Some(Fraction::from_poly(Poly::constant(*v))),
        Expr::Num(_) => None,
        Expr::Add(terms) => terms
            .iter()
            .try_fold(Fraction::from_poly(Poly::default()), |acc, t| {
                acc.add(&rational(t)?)
            }),
        Expr::Mul(factors) => factors
            .iter()
            .try_fold(Fraction::from_poly(Poly::constant(1.0)), |acc, f| {
                acc.mul(&rational(f)?)
            }),
        Expr::Pow(base, exponent) => match integer_power(exponent) {
            Some(n) if n > 0 => rational(base)?.pow(n.unsigned_abs()),
            Some(n) if n < 0 => rational(base)?.recip()?.pow(n.unsigned_abs()),
            _ => Some(Fraction::from_poly(Poly::atom(expr.clone()))),
        },
        Expr::Sym(_) | Expr::Exp(_) | Expr::Ln(_) => {
            Some(Fraction::from_poly(Poly::atom(expr.clone())))
        }
    }
}

fn integer_power(exponent: &Expr) -> Option<i32> {
    let n = exponent.as_num()?;
    let limit = f64::from(MAX_POWER);
    (n.fract() == 0.0 && n.abs() <= limit).then_some(n as i32)
}
