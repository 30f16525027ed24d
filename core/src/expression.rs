//! Affine combinations of constraint variables.
//!
//! Expressions are kept in a canonical form: one term per variable, ordered by
//! variable, with zero coefficients dropped. Two expressions describing the
//! same combination therefore compare (and hash) equal, which lets the solver
//! adapter diff constraint sets between solves.

use alloc::{collections::BTreeMap, vec::Vec};
use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Div, Mul, Neg, Sub},
};

use crate::ConstraintVariable;

/// A single `coefficient * variable` product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    /// The variable being scaled.
    pub variable: ConstraintVariable,
    /// The scale factor.
    pub coefficient: f64,
}

/// An immutable affine combination `Σ cᵢ·vᵢ + k`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpression {
    terms: Vec<Term>,
    constant: f64,
}

impl LinearExpression {
    /// Builds an expression from raw terms, merging duplicates.
    pub fn new(terms: impl IntoIterator<Item = Term>, constant: f64) -> Self {
        let mut merged: BTreeMap<ConstraintVariable, f64> = BTreeMap::new();
        for term in terms {
            *merged.entry(term.variable).or_insert(0.0) += term.coefficient;
        }
        let terms = merged
            .into_iter()
            .filter(|(_, coefficient)| *coefficient != 0.0)
            .map(|(variable, coefficient)| Term {
                variable,
                // Folds -0.0 into 0.0 so hashing agrees with equality.
                coefficient: coefficient + 0.0,
            })
            .collect();
        Self {
            terms,
            constant: constant + 0.0,
        }
    }

    /// An expression without variables.
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// The expression `1 * variable`.
    #[must_use]
    pub fn from_variable(variable: ConstraintVariable) -> Self {
        Self {
            terms: alloc::vec![Term {
                variable,
                coefficient: 1.0,
            }],
            constant: 0.0,
        }
    }

    /// The canonical terms of the expression.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The constant part of the expression.
    #[must_use]
    pub const fn constant_part(&self) -> f64 {
        self.constant
    }

    /// Iterates over the variables referenced by the expression.
    pub fn variables(&self) -> impl Iterator<Item = ConstraintVariable> + '_ {
        self.terms.iter().map(|term| term.variable)
    }

    /// Whether every coefficient and the constant are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.constant.is_finite() && self.terms.iter().all(|term| term.coefficient.is_finite())
    }

    /// Evaluates the expression with the given variable assignment.
    pub fn evaluate(&self, value: impl Fn(ConstraintVariable) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, term| acc + term.coefficient * value(term.variable))
    }
}

/// `a + b`
pub fn add(a: impl Into<LinearExpression>, b: impl Into<LinearExpression>) -> LinearExpression {
    let a = a.into();
    let b = b.into();
    LinearExpression::new(
        a.terms.into_iter().chain(b.terms),
        a.constant + b.constant,
    )
}

/// `a - b`
pub fn sub(a: impl Into<LinearExpression>, b: impl Into<LinearExpression>) -> LinearExpression {
    add(a, scale(b, -1.0))
}

/// `factor * a`
pub fn scale(a: impl Into<LinearExpression>, factor: f64) -> LinearExpression {
    let a = a.into();
    LinearExpression::new(
        a.terms.into_iter().map(|term| Term {
            variable: term.variable,
            coefficient: term.coefficient * factor,
        }),
        a.constant * factor,
    )
}

/// `a + constant`
pub fn plus(a: impl Into<LinearExpression>, constant: f64) -> LinearExpression {
    add(a, constant)
}

impl Eq for LinearExpression {}

impl Hash for LinearExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.terms.len().hash(state);
        for term in &self.terms {
            term.variable.hash(state);
            term.coefficient.to_bits().hash(state);
        }
        self.constant.to_bits().hash(state);
    }
}

impl From<f64> for LinearExpression {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl From<ConstraintVariable> for LinearExpression {
    fn from(variable: ConstraintVariable) -> Self {
        Self::from_variable(variable)
    }
}

impl From<&LinearExpression> for LinearExpression {
    fn from(expression: &LinearExpression) -> Self {
        expression.clone()
    }
}

macro_rules! impl_arithmetic {
    ($($ty:ty),*) => {$(
        impl<T: Into<LinearExpression>> Add<T> for $ty {
            type Output = LinearExpression;

            fn add(self, rhs: T) -> LinearExpression {
                add(self, rhs)
            }
        }

        impl<T: Into<LinearExpression>> Sub<T> for $ty {
            type Output = LinearExpression;

            fn sub(self, rhs: T) -> LinearExpression {
                sub(self, rhs)
            }
        }

        impl Mul<f64> for $ty {
            type Output = LinearExpression;

            fn mul(self, rhs: f64) -> LinearExpression {
                scale(self, rhs)
            }
        }

        impl Div<f64> for $ty {
            type Output = LinearExpression;

            fn div(self, rhs: f64) -> LinearExpression {
                scale(self, 1.0 / rhs)
            }
        }

        impl Neg for $ty {
            type Output = LinearExpression;

            fn neg(self) -> LinearExpression {
                scale(self, -1.0)
            }
        }

        impl Mul<$ty> for f64 {
            type Output = LinearExpression;

            fn mul(self, rhs: $ty) -> LinearExpression {
                scale(rhs, self)
            }
        }
    )*};
}

impl_arithmetic!(LinearExpression, &LinearExpression, ConstraintVariable);

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for term in &self.terms {
            let (sign, magnitude) = if term.coefficient < 0.0 {
                ("-", -term.coefficient)
            } else {
                ("+", term.coefficient)
            };
            if first {
                if sign == "-" {
                    f.write_str("-")?;
                }
            } else {
                write!(f, " {sign} ")?;
            }
            if magnitude == 1.0 {
                write!(f, "{}", term.variable)?;
            } else {
                write!(f, "{magnitude} * {}", term.variable)?;
            }
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}
