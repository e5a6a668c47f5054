//! Expression trees over real-valued symbols.

use super::{ParameterBinding, Symbol};
use crate::types::SymbolicError;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::ops;

/// A real-valued algebraic expression.
///
/// Subtraction is represented as `a + (-1)*b` and division as `a * b^(-1)`.
/// The arithmetic operators build raw trees; every kernel operation
/// (`simplify`, `subs`, `derivative`, `solve`, ...) returns the canonical
/// simplified form, so two canonical expressions that are structurally equal
/// compare equal with `==`.
///
/// # Example
///
/// ```
/// use market_core::symbolic::Expr;
/// use market_core::symbols::{PRICE, QUANTITY};
///
/// let p = Expr::from(PRICE);
/// let expr = (Expr::from(100.0) - 2.0 * p.clone() + p).simplify();
/// assert_eq!(expr.to_string(), "100 - p");
/// assert!(!expr.contains(&QUANTITY));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// Numeric constant
    Num(f64),
    /// Symbol reference
    Sym(Symbol),
    /// Sum of terms
    Add(Vec<Expr>),
    /// Product of factors
    Mul(Vec<Expr>),
    /// `base ^ exponent`
    Pow(Box<Expr>, Box<Expr>),
    /// Natural exponential
    Exp(Box<Expr>),
    /// Natural logarithm
    Ln(Box<Expr>),
}

impl Expr {
    /// Numeric constant.
    pub fn num(value: f64) -> Self {
        Expr::Num(value)
    }

    /// The constant zero.
    pub fn zero() -> Self {
        Expr::Num(0.0)
    }

    /// The constant one.
    pub fn one() -> Self {
        Expr::Num(1.0)
    }

    /// `self ^ exponent`
    pub fn pow(self, exponent: impl Into<Expr>) -> Self {
        Expr::Pow(Box::new(self), Box::new(exponent.into()))
    }

    /// Principal square root.
    pub fn sqrt(self) -> Self {
        self.pow(0.5)
    }

    /// `1 / self`
    pub fn recip(self) -> Self {
        self.pow(-1.0)
    }

    /// `e ^ self`
    pub fn exp(self) -> Self {
        Expr::Exp(Box::new(self))
    }

    /// Natural logarithm of `self`.
    pub fn ln(self) -> Self {
        Expr::Ln(Box::new(self))
    }

    /// Returns the value if this is a numeric constant.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns true for the constant zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(v) if *v == 0.0)
    }

    /// Returns true for the constant one.
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Num(v) if *v == 1.0)
    }

    /// Set of symbols occurring in the expression.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Num(_) => {}
            Expr::Sym(s) => {
                out.insert(s.clone());
            }
            Expr::Add(items) | Expr::Mul(items) => {
                items.iter().for_each(|e| e.collect_symbols(out));
            }
            Expr::Pow(b, e) => {
                b.collect_symbols(out);
                e.collect_symbols(out);
            }
            Expr::Exp(a) | Expr::Ln(a) => a.collect_symbols(out),
        }
    }

    /// Returns true if `symbol` occurs in the expression.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Sym(s) => s == symbol,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| e.contains(symbol)),
            Expr::Pow(b, e) => b.contains(symbol) || e.contains(symbol),
            Expr::Exp(a) | Expr::Ln(a) => a.contains(symbol),
        }
    }

    /// Returns true if the expression contains no symbols.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Num(_) => true,
            Expr::Sym(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().all(Expr::is_constant),
            Expr::Pow(b, e) => b.is_constant() && e.is_constant(),
            Expr::Exp(a) | Expr::Ln(a) => a.is_constant(),
        }
    }

    /// Numerically evaluate under `binding`.
    ///
    /// # Errors
    ///
    /// * `SymbolicError::UnboundSymbol` - A symbol has no value in `binding`
    /// * `SymbolicError::Undefined` - Any sub-expression is NaN or infinite
    ///   (logarithm of a non-positive number, fractional power of a negative
    ///   number, overflow)
    pub fn eval(&self, binding: &ParameterBinding) -> Result<f64, SymbolicError> {
        let value = match self {
            Expr::Num(v) => *v,
            Expr::Sym(s) => binding
                .get(s)
                .ok_or_else(|| SymbolicError::UnboundSymbol {
                    name: s.name().to_string(),
                })?,
            Expr::Add(terms) => {
                let mut sum = 0.0;
                for t in terms {
                    sum += t.eval(binding)?;
                }
                sum
            }
            Expr::Mul(factors) => {
                let mut product = 1.0;
                for f in factors {
                    product *= f.eval(binding)?;
                }
                product
            }
            Expr::Pow(b, e) => b.eval(binding)?.powf(e.eval(binding)?),
            Expr::Exp(a) => a.eval(binding)?.exp(),
            Expr::Ln(a) => a.eval(binding)?.ln(),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SymbolicError::Undefined {
                expression: self.to_string(),
            })
        }
    }

    /// Evaluate an expression that must not contain symbols.
    pub fn eval_constant(&self) -> Result<f64, SymbolicError> {
        self.eval(&ParameterBinding::new())
    }

    /// Substitute numeric values and simplify.
    pub fn subs(&self, binding: &ParameterBinding) -> Expr {
        self.replace_all(&binding.to_substitutions())
    }

    /// Replace one symbol by an expression and simplify.
    pub fn replace(&self, symbol: &Symbol, with: &Expr) -> Expr {
        self.replace_all(&[(symbol.clone(), with.clone())])
    }

    /// Replace several symbols simultaneously and simplify.
    pub fn replace_all(&self, substitutions: &[(Symbol, Expr)]) -> Expr {
        self.replace_raw(substitutions).simplify()
    }

    fn replace_raw(&self, substitutions: &[(Symbol, Expr)]) -> Expr {
        match self {
            Expr::Num(_) => self.clone(),
            Expr::Sym(s) => substitutions
                .iter()
                .find(|(target, _)| target == s)
                .map(|(_, with)| with.clone())
                .unwrap_or_else(|| self.clone()),
            Expr::Add(terms) => {
                Expr::Add(terms.iter().map(|t| t.replace_raw(substitutions)).collect())
            }
            Expr::Mul(factors) => {
                Expr::Mul(factors.iter().map(|f| f.replace_raw(substitutions)).collect())
            }
            Expr::Pow(b, e) => Expr::Pow(
                Box::new(b.replace_raw(substitutions)),
                Box::new(e.replace_raw(substitutions)),
            ),
            Expr::Exp(a) => Expr::Exp(Box::new(a.replace_raw(substitutions))),
            Expr::Ln(a) => Expr::Ln(Box::new(a.replace_raw(substitutions))),
        }
    }

    /// Returns true if the expression contains a sub-term that can never be
    /// finite: `ln(c)` with `c <= 0`, `0^e` with `e` not a positive constant,
    /// or a non-finite constant.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Expr::Num(v) => !v.is_finite(),
            Expr::Sym(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(Expr::is_degenerate),
            Expr::Pow(b, e) => {
                let zero_base = b.is_zero() && !matches!(e.as_num(), Some(x) if x > 0.0);
                zero_base || b.is_degenerate() || e.is_degenerate()
            }
            Expr::Ln(a) => matches!(a.as_num(), Some(v) if v <= 0.0) || a.is_degenerate(),
            Expr::Exp(a) => a.is_degenerate(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Expr::Num(_) => 0,
            Expr::Sym(_) => 1,
            Expr::Pow(..) => 2,
            Expr::Mul(_) => 3,
            Expr::Add(_) => 4,
            Expr::Exp(_) => 5,
            Expr::Ln(_) => 6,
        }
    }

    /// Total order used to sort the operands of sums and products.
    pub(crate) fn canonical_cmp(&self, other: &Expr) -> Ordering {
        match (self, other) {
            (Expr::Num(a), Expr::Num(b)) => a.total_cmp(b),
            (Expr::Sym(a), Expr::Sym(b)) => a.cmp(b),
            (Expr::Add(a), Expr::Add(b)) | (Expr::Mul(a), Expr::Mul(b)) => cmp_slices(a, b),
            (Expr::Pow(b1, e1), Expr::Pow(b2, e2)) => {
                b1.canonical_cmp(b2).then_with(|| e1.canonical_cmp(e2))
            }
            (Expr::Exp(a), Expr::Exp(b)) | (Expr::Ln(a), Expr::Ln(b)) => a.canonical_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn cmp_slices(a: &[Expr], b: &[Expr]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = x.canonical_cmp(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Num(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Num(value as f64)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }
}

impl<T: Into<Expr>> ops::Add<T> for Expr {
    type Output = Expr;
    fn add(self, rhs: T) -> Expr {
        Expr::Add(vec![self, rhs.into()])
    }
}

impl<T: Into<Expr>> ops::Sub<T> for Expr {
    type Output = Expr;
    fn sub(self, rhs: T) -> Expr {
        let rhs: Expr = rhs.into();
        Expr::Add(vec![self, -rhs])
    }
}

impl<T: Into<Expr>> ops::Mul<T> for Expr {
    type Output = Expr;
    fn mul(self, rhs: T) -> Expr {
        Expr::Mul(vec![self, rhs.into()])
    }
}

impl<T: Into<Expr>> ops::Div<T> for Expr {
    type Output = Expr;
    fn div(self, rhs: T) -> Expr {
        let rhs: Expr = rhs.into();
        Expr::Mul(vec![self, rhs.recip()])
    }
}

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Mul(vec![Expr::Num(-1.0), self])
    }
}

impl ops::Mul<Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(vec![Expr::Num(self), rhs])
    }
}

impl ops::Add<Expr> for f64 {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(vec![Expr::Num(self), rhs])
    }
}

impl ops::Sub<Expr> for f64 {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::Add(vec![Expr::Num(self), -rhs])
    }
}

// Display precedence levels
const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Num(v) if *v < 0.0 => PREC_ADD,
            Expr::Num(_) | Expr::Sym(_) | Expr::Exp(_) | Expr::Ln(_) => PREC_ATOM,
            Expr::Add(_) => PREC_ADD,
            Expr::Mul(_) => PREC_MUL,
            Expr::Pow(_, e) if matches!(e.as_num(), Some(x) if x == 0.5) => PREC_ATOM,
            Expr::Pow(..) => PREC_POW,
        }
    }

    fn fmt_in(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        if self.precedence() < parent {
            write!(f, "(")?;
            self.fmt_bare(f)?;
            write!(f, ")")
        } else {
            self.fmt_bare(f)
        }
    }

    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(v) => fmt_number(f, *v),
            Expr::Sym(s) => write!(f, "{}", s),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    match (i, negated(term)) {
                        (0, Some(pos)) => {
                            write!(f, "-")?;
                            pos.fmt_in(f, PREC_MUL)?;
                        }
                        (0, None) => term.fmt_in(f, PREC_ADD)?,
                        (_, Some(pos)) => {
                            write!(f, " - ")?;
                            pos.fmt_in(f, PREC_MUL)?;
                        }
                        (_, None) => {
                            write!(f, " + ")?;
                            term.fmt_in(f, PREC_MUL)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Mul(factors) => fmt_product(f, factors),
            Expr::Pow(b, e) => {
                if matches!(e.as_num(), Some(x) if x == 0.5) {
                    write!(f, "sqrt(")?;
                    b.fmt_in(f, 0)?;
                    return write!(f, ")");
                }
                b.fmt_in(f, PREC_ATOM)?;
                write!(f, "^")?;
                e.fmt_in(f, PREC_ATOM)
            }
            Expr::Exp(a) => {
                write!(f, "exp(")?;
                a.fmt_in(f, 0)?;
                write!(f, ")")
            }
            Expr::Ln(a) => {
                write!(f, "ln(")?;
                a.fmt_in(f, 0)?;
                write!(f, ")")
            }
        }
    }
}

/// If `term` carries a negative leading coefficient, return its absolute form.
fn negated(term: &Expr) -> Option<Expr> {
    match term {
        Expr::Num(v) if *v < 0.0 => Some(Expr::Num(-v)),
        Expr::Mul(factors) => match factors.first() {
            Some(Expr::Num(c)) if *c < 0.0 => {
                let mut rest = factors[1..].to_vec();
                if *c != -1.0 {
                    rest.insert(0, Expr::Num(-c));
                }
                Some(match rest.len() {
                    0 => Expr::Num(1.0),
                    1 => rest.swap_remove(0),
                    _ => Expr::Mul(rest),
                })
            }
            _ => None,
        },
        _ => None,
    }
}

fn fmt_product(f: &mut fmt::Formatter<'_>, factors: &[Expr]) -> fmt::Result {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for factor in factors {
        match factor {
            Expr::Pow(b, e) if matches!(e.as_num(), Some(x) if x < 0.0) => {
                let positive = -e.as_num().unwrap_or(-1.0);
                if positive == 1.0 {
                    denominator.push((**b).clone());
                } else {
                    denominator.push(Expr::Pow(b.clone(), Box::new(Expr::Num(positive))));
                }
            }
            other => numerator.push(other.clone()),
        }
    }
    if let Some(Expr::Num(c)) = numerator.first() {
        if *c == -1.0 && numerator.len() > 1 {
            write!(f, "-")?;
            numerator.remove(0);
        }
    }
    if numerator.is_empty() {
        write!(f, "1")?;
    }
    for (i, factor) in numerator.iter().enumerate() {
        match (i, factor) {
            (0, Expr::Num(c)) => fmt_number(f, *c)?,
            (0, _) => factor.fmt_in(f, PREC_POW)?,
            _ => {
                write!(f, "*")?;
                factor.fmt_in(f, PREC_POW)?;
            }
        }
    }
    if !denominator.is_empty() {
        write!(f, "/")?;
        if denominator.len() == 1 {
            denominator[0].fmt_in(f, PREC_POW)?;
        } else {
            write!(f, "(")?;
            for (i, factor) in denominator.iter().enumerate() {
                if i > 0 {
                    write!(f, "*")?;
                }
                factor.fmt_in(f, PREC_POW)?;
            }
            write!(f, ")")?;
        }
    }
    Ok(())
}

fn fmt_number(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        write!(f, "{}", v as i64)
    } else {
        write!(f, "{}", v)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_in(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{A, B, PRICE, QUANTITY};

    fn p() -> Expr {
        Expr::from(PRICE)
    }

    #[test]
    fn test_free_symbols() {
        let expr = Expr::from(QUANTITY) - (Expr::from(A) - Expr::from(B) * p());
        let names: Vec<String> = expr
            .free_symbols()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "p", "q"]);
    }

    #[test]
    fn test_eval_linear() {
        let expr = Expr::from(A) - Expr::from(B) * p();
        let binding = ParameterBinding::new()
            .with(A, 100.0)
            .with(B, 2.0)
            .with(PRICE, 10.0);
        assert_eq!(expr.eval(&binding).unwrap(), 80.0);
    }

    #[test]
    fn test_scalar_on_the_left() {
        let binding = ParameterBinding::new().with(PRICE, 4.0);
        assert_eq!((20.0 + 3.0 * p()).eval(&binding).unwrap(), 32.0);
        assert_eq!((100.0 - 2.0 * p()).eval(&binding).unwrap(), 92.0);
        assert_eq!(20.0 + 3.0 * p(), Expr::from(20.0) + 3.0 * p());
    }

    #[test]
    fn test_eval_unbound_symbol() {
        let expr = Expr::from(A) * p();
        let binding = ParameterBinding::new().with(PRICE, 1.0);
        match expr.eval(&binding) {
            Err(SymbolicError::UnboundSymbol { name }) => assert_eq!(name, "a"),
            other => panic!("Expected UnboundSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_eval_log_of_zero_is_undefined() {
        let expr = Expr::from(0.0).ln();
        assert!(matches!(
            expr.eval_constant(),
            Err(SymbolicError::Undefined { .. })
        ));
    }

    #[test]
    fn test_replace_symbol() {
        let expr = Expr::from(A) - Expr::from(B) * p();
        let replaced = expr.replace(&PRICE, &Expr::from(3.0));
        assert_eq!(replaced.to_string(), "a - 3*b");
    }

    #[test]
    fn test_degenerate_detection() {
        assert!(Expr::from(0.0).ln().is_degenerate());
        assert!(Expr::from(0.0).pow(-2.0).is_degenerate());
        assert!(!Expr::from(0.0).pow(2.0).is_degenerate());
        assert!(!p().ln().is_degenerate());
    }

    #[test]
    fn test_display_forms() {
        let inverse = ((Expr::from(A) - Expr::from(QUANTITY)) / Expr::from(B)).simplify();
        assert_eq!(inverse.to_string(), "(a - q)/b");

        let power = (Expr::from(A) * p().pow(Expr::from(B))).simplify();
        assert_eq!(power.to_string(), "a*p^b");

        let root = p().sqrt().simplify();
        assert_eq!(root.to_string(), "sqrt(p)");

        let exp = (-(Expr::from(A) * p()) + Expr::from(B)).exp().simplify();
        assert_eq!(exp.to_string(), "exp(b - a*p)");
    }
}
