//! Linear (in)equalities between expressions.

use core::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{ConstraintVariable, LinearExpression, Strength, sub};

/// The relation between the two sides of a [`Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// `lhs == rhs`
    Eq,
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
}

impl Relation {
    /// The operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An immutable, strength-tagged relation between two linear expressions.
///
/// Constraints are [`Strength::Required`] with a weight of `1.0` unless
/// stated otherwise. Equality and hashing are exact (bitwise on the numbers),
/// which is what the solver adapter needs to diff constraint sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    lhs: LinearExpression,
    relation: Relation,
    rhs: LinearExpression,
    strength: Strength,
    weight: f64,
}

impl Constraint {
    /// Creates a required constraint `lhs <relation> rhs`.
    pub fn new(
        lhs: impl Into<LinearExpression>,
        relation: Relation,
        rhs: impl Into<LinearExpression>,
    ) -> Self {
        Self {
            lhs: lhs.into(),
            relation,
            rhs: rhs.into(),
            strength: Strength::Required,
            weight: 1.0,
        }
    }

    /// Returns the constraint with a different strength.
    #[must_use]
    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// Returns the constraint with a different weight.
    ///
    /// The weight scales the constraint within its strength tier; it never
    /// promotes a constraint into a stronger tier.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// The left-hand side.
    #[must_use]
    pub const fn lhs(&self) -> &LinearExpression {
        &self.lhs
    }

    /// The right-hand side.
    #[must_use]
    pub const fn rhs(&self) -> &LinearExpression {
        &self.rhs
    }

    /// The relation between both sides.
    #[must_use]
    pub const fn relation(&self) -> Relation {
        self.relation
    }

    /// The strength of the constraint.
    #[must_use]
    pub const fn strength(&self) -> Strength {
        self.strength
    }

    /// The weight of the constraint within its strength tier.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// The normalized form `lhs - rhs`, to be related against zero.
    #[must_use]
    pub fn expression(&self) -> LinearExpression {
        sub(&self.lhs, &self.rhs)
    }

    /// Iterates over every variable referenced on either side.
    pub fn variables(&self) -> impl Iterator<Item = ConstraintVariable> + '_ {
        self.lhs.variables().chain(self.rhs.variables())
    }

    /// Whether both sides and the weight are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lhs.is_finite() && self.rhs.is_finite() && self.weight.is_finite()
    }

    /// Whether the weight can scale the constraint at all.
    #[must_use]
    pub fn has_positive_weight(&self) -> bool {
        self.weight > 0.0
    }

    /// Whether the constraint holds for the given assignment, within `tolerance`.
    pub fn is_satisfied(&self, value: impl Fn(ConstraintVariable) -> f64, tolerance: f64) -> bool {
        let delta = self.expression().evaluate(value);
        match self.relation {
            Relation::Eq => delta <= tolerance && delta >= -tolerance,
            Relation::Le => delta <= tolerance,
            Relation::Ge => delta >= -tolerance,
        }
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lhs.hash(state);
        self.relation.hash(state);
        self.rhs.hash(state);
        self.strength.hash(state);
        self.weight.to_bits().hash(state);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} | {}", self.lhs, self.relation, self.rhs, self.strength)?;
        if self.weight != 1.0 {
            write!(f, " x {}", self.weight)?;
        }
        Ok(())
    }
}

/// Relational sugar for anything convertible into a [`LinearExpression`].
///
/// ```rust
/// use undertow_core::{ExpressionExt, Relation, Symbols, WidgetId};
///
/// let symbols = Symbols::new(WidgetId::new(0));
/// let constraint = symbols.width().at_least(symbols.height() * 2.0);
/// assert_eq!(constraint.relation(), Relation::Ge);
/// ```
pub trait ExpressionExt: Into<LinearExpression> + Sized {
    /// `self == rhs`, required.
    fn equal_to(self, rhs: impl Into<LinearExpression>) -> Constraint {
        Constraint::new(self, Relation::Eq, rhs)
    }

    /// `self <= rhs`, required.
    fn at_most(self, rhs: impl Into<LinearExpression>) -> Constraint {
        Constraint::new(self, Relation::Le, rhs)
    }

    /// `self >= rhs`, required.
    fn at_least(self, rhs: impl Into<LinearExpression>) -> Constraint {
        Constraint::new(self, Relation::Ge, rhs)
    }
}

impl<T: Into<LinearExpression>> ExpressionExt for T {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::{Attribute, Symbols, WidgetId};

    #[test]
    fn defaults_to_required() {
        let symbols = Symbols::new(WidgetId::new(0));
        let constraint = symbols.width().equal_to(10.0);

        assert_eq!(constraint.strength(), Strength::Required);
        assert_eq!(constraint.weight(), 1.0);
    }

    #[test]
    fn expression_moves_everything_to_the_left() {
        let symbols = Symbols::new(WidgetId::new(0));
        let constraint = symbols.right().at_most(100.0);

        assert_eq!(constraint.expression(), symbols.left() + symbols.width() - 100.0);
    }

    #[test]
    fn satisfaction_respects_relation() {
        let symbols = Symbols::new(WidgetId::new(0));
        let value = |var: ConstraintVariable| match var.attribute() {
            Attribute::Width => 50.0,
            _ => 0.0,
        };

        assert!(symbols.width().at_least(40.0).is_satisfied(value, 1e-9));
        assert!(!symbols.width().at_most(40.0).is_satisfied(value, 1e-9));
        assert!(symbols.width().equal_to(50.0).is_satisfied(value, 1e-9));
    }

    #[test]
    fn strength_and_weight_take_part_in_identity() {
        let symbols = Symbols::new(WidgetId::new(0));
        let base = symbols.width().equal_to(10.0);

        assert_eq!(base, symbols.width().equal_to(10.0));
        assert_ne!(base, base.clone().with_strength(Strength::Weak));
        assert_ne!(base, base.clone().with_weight(2.0));
    }

    #[test]
    fn displays_both_sides_and_strength() {
        let symbols = Symbols::new(WidgetId::new(2));
        let constraint = symbols.width().equal_to(10.0).with_strength(Strength::Strong);

        assert_eq!(constraint.to_string(), "#2.width == 10 | strong");
    }
}
