//! Structural sign analysis.
//!
//! Every symbol is treated as a positive real. The analysis tracks the set
//! of signs an expression can take and never evaluates it numerically, so
//! its answers are conservative: `Unknown` means "could not be decided",
//! not "changes sign".

use super::Expr;

/// Sign of an expression under the positive-symbol assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Strictly greater than zero
    Positive,
    /// Strictly less than zero
    Negative,
    /// Identically zero
    Zero,
    /// Greater than or equal to zero
    NonNegative,
    /// Less than or equal to zero
    NonPositive,
    /// Not decidable structurally
    Unknown,
}

impl Sign {
    /// Returns true if the value is provably below zero.
    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }

    /// Returns true if the value is provably above zero.
    pub fn is_positive(self) -> bool {
        self == Sign::Positive
    }

    /// Returns true if the value is provably at or above zero.
    pub fn is_non_negative(self) -> bool {
        matches!(self, Sign::Positive | Sign::Zero | Sign::NonNegative)
    }

    fn from_set(set: SignSet) -> Sign {
        match (set.neg, set.zero, set.pos) {
            (false, false, true) => Sign::Positive,
            (true, false, false) => Sign::Negative,
            (false, true, false) => Sign::Zero,
            (false, true, true) => Sign::NonNegative,
            (true, true, false) => Sign::NonPositive,
            _ => Sign::Unknown,
        }
    }
}

/// Possible signs of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SignSet {
    neg: bool,
    zero: bool,
    pos: bool,
}

impl SignSet {
    const POSITIVE: SignSet = SignSet {
        neg: false,
        zero: false,
        pos: true,
    };
    const ZERO: SignSet = SignSet {
        neg: false,
        zero: true,
        pos: false,
    };
    const ANY: SignSet = SignSet {
        neg: true,
        zero: true,
        pos: true,
    };

    fn of(value: f64) -> SignSet {
        SignSet {
            neg: value < 0.0,
            zero: value == 0.0,
            pos: value > 0.0,
        }
    }

    fn is_empty(self) -> bool {
        !(self.neg || self.zero || self.pos)
    }

    fn sum(self, other: SignSet) -> SignSet {
        let mixed = (self.pos && other.neg) || (self.neg && other.pos);
        if mixed {
            return SignSet::ANY;
        }
        SignSet {
            neg: (self.neg && !other.is_empty()) || (other.neg && !self.is_empty()),
            zero: self.zero && other.zero,
            pos: (self.pos && !other.is_empty()) || (other.pos && !self.is_empty()),
        }
    }

    fn product(self, other: SignSet) -> SignSet {
        SignSet {
            neg: (self.neg && other.pos) || (self.pos && other.neg),
            zero: (self.zero && !other.is_empty()) || (other.zero && !self.is_empty()),
            pos: (self.pos && other.pos) || (self.neg && other.neg),
        }
    }

    fn power(self, exponent: &Expr) -> SignSet {
        let defined_zero = matches!(exponent.as_num(), Some(e) if e > 0.0);
        match exponent.as_num() {
            Some(e) if e.fract() == 0.0 && e % 2.0 == 0.0 => SignSet {
                neg: false,
                zero: self.zero && defined_zero,
                pos: self.pos || self.neg,
            },
            Some(e) if e.fract() == 0.0 => SignSet {
                zero: self.zero && defined_zero,
                ..self
            },
            // Real powers of a negative base are not defined
            _ => SignSet {
                neg: false,
                zero: self.zero && defined_zero,
                pos: self.pos,
            },
        }
    }
}

impl Expr {
    /// Sign of the expression, treating every symbol as a positive real.
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::symbolic::{Expr, Sign};
    /// use market_core::symbols::{C, D};
    ///
    /// // -c/d is negative for positive parameters
    /// let root = (-Expr::from(C) / Expr::from(D)).simplify();
    /// assert_eq!(root.sign(), Sign::Negative);
    ///
    /// // c - d could be either
    /// assert_eq!((Expr::from(C) - Expr::from(D)).simplify().sign(), Sign::Unknown);
    /// ```
    pub fn sign(&self) -> Sign {
        let set = sign_set(self);
        if set.is_empty() {
            Sign::Unknown
        } else {
            Sign::from_set(set)
        }
    }
}

fn sign_set(expr: &Expr) -> SignSet {
    match expr {
        Expr::Num(v) if v.is_finite() => SignSet::of(*v),
        Expr::Num(_) => SignSet::ANY,
        Expr::Sym(_) => SignSet::POSITIVE,
        Expr::Add(terms) => terms
            .iter()
            .map(sign_set)
            .fold(SignSet::ZERO, SignSet::sum),
        Expr::Mul(factors) => factors
            .iter()
            .map(sign_set)
            .fold(SignSet::POSITIVE, SignSet::product),
        Expr::Pow(base, exponent) => sign_set(base).power(exponent),
        Expr::Exp(_) => SignSet::POSITIVE,
        Expr::Ln(arg) => match arg.as_num() {
            Some(v) if v > 0.0 => SignSet::of(v.ln()),
            _ => SignSet::ANY,
        },
    }
}
