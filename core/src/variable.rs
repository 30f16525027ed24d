//! Widget identities and the symbolic variables bound to them.

use core::{cell::OnceCell, fmt};

use crate::{LinearExpression, Padding};

/// Identifier of a widget stored inside a layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidgetId(usize);

impl WidgetId {
    /// Creates a new [`WidgetId`] from the raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The primitive attributes of a widget's box model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Attribute {
    /// Distance of the left edge from the layout origin.
    Left,
    /// Distance of the top edge from the layout origin.
    Top,
    /// Horizontal extent.
    Width,
    /// Vertical extent.
    Height,
}

impl Attribute {
    /// All primitive attributes, in declaration order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Top, Self::Width, Self::Height];

    /// The symbolic name of the attribute.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named symbol bound to exactly one attribute of one widget.
///
/// Two variables are equal when they share the same owner and attribute, so
/// expressions referring to the same widget edge from different places
/// collapse onto a single solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintVariable {
    owner: WidgetId,
    attribute: Attribute,
}

impl ConstraintVariable {
    /// Creates the variable for `attribute` of `owner`.
    #[must_use]
    pub const fn new(owner: WidgetId, attribute: Attribute) -> Self {
        Self { owner, attribute }
    }

    /// The widget owning this variable.
    #[must_use]
    pub const fn owner(self) -> WidgetId {
        self.owner
    }

    /// The attribute this variable stands for.
    #[must_use]
    pub const fn attribute(self) -> Attribute {
        self.attribute
    }

    /// The symbolic name of the variable.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.attribute.name()
    }
}

impl fmt::Display for ConstraintVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.attribute)
    }
}

/// The symbolic box model of a single widget.
///
/// The primitive variables are plain values derived from the owner. The
/// derived edges (`right`, `bottom`, `h_center`, `v_center`) are built on
/// first access and then reused for the lifetime of the widget.
#[derive(Debug, Clone)]
pub struct Symbols {
    owner: WidgetId,
    right: OnceCell<LinearExpression>,
    bottom: OnceCell<LinearExpression>,
    h_center: OnceCell<LinearExpression>,
    v_center: OnceCell<LinearExpression>,
}

impl Symbols {
    /// Creates the box model for `owner`.
    #[must_use]
    pub const fn new(owner: WidgetId) -> Self {
        Self {
            owner,
            right: OnceCell::new(),
            bottom: OnceCell::new(),
            h_center: OnceCell::new(),
            v_center: OnceCell::new(),
        }
    }

    /// The widget owning these symbols.
    #[must_use]
    pub const fn owner(&self) -> WidgetId {
        self.owner
    }

    /// The variable for the given attribute.
    #[must_use]
    pub const fn variable(&self, attribute: Attribute) -> ConstraintVariable {
        ConstraintVariable::new(self.owner, attribute)
    }

    /// The left edge.
    #[must_use]
    pub const fn left(&self) -> ConstraintVariable {
        self.variable(Attribute::Left)
    }

    /// The top edge.
    #[must_use]
    pub const fn top(&self) -> ConstraintVariable {
        self.variable(Attribute::Top)
    }

    /// The width.
    #[must_use]
    pub const fn width(&self) -> ConstraintVariable {
        self.variable(Attribute::Width)
    }

    /// The height.
    #[must_use]
    pub const fn height(&self) -> ConstraintVariable {
        self.variable(Attribute::Height)
    }

    /// `left + width`
    pub fn right(&self) -> &LinearExpression {
        self.right.get_or_init(|| self.left() + self.width())
    }

    /// `top + height`
    pub fn bottom(&self) -> &LinearExpression {
        self.bottom.get_or_init(|| self.top() + self.height())
    }

    /// `left + width / 2`
    pub fn h_center(&self) -> &LinearExpression {
        self.h_center.get_or_init(|| self.left() + self.width() / 2.0)
    }

    /// `top + height / 2`
    pub fn v_center(&self) -> &LinearExpression {
        self.v_center.get_or_init(|| self.top() + self.height() / 2.0)
    }

    /// The content box left after insetting the outer box by `padding`.
    ///
    /// Unlike the derived edges this is rebuilt on every call, because the
    /// padding of a container can change.
    #[must_use]
    pub fn inset(&self, padding: &Padding) -> ContentBox {
        ContentBox {
            left: self.left() + padding.left,
            top: self.top() + padding.top,
            right: self.right() - padding.right,
            bottom: self.bottom() - padding.bottom,
        }
    }

    /// The four primitive variables, in [`Attribute::ALL`] order.
    #[must_use]
    pub const fn variables(&self) -> [ConstraintVariable; 4] {
        [self.left(), self.top(), self.width(), self.height()]
    }
}

/// Symbolic edges of a padded content box.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBox {
    /// Leading horizontal edge.
    pub left: LinearExpression,
    /// Leading vertical edge.
    pub top: LinearExpression,
    /// Trailing horizontal edge.
    pub right: LinearExpression,
    /// Trailing vertical edge.
    pub bottom: LinearExpression,
}

impl ContentBox {
    /// `right - left`
    #[must_use]
    pub fn width(&self) -> LinearExpression {
        &self.right - &self.left
    }

    /// `bottom - top`
    #[must_use]
    pub fn height(&self) -> LinearExpression {
        &self.bottom - &self.top
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn variables_compare_by_owner_and_attribute() {
        let a = Symbols::new(WidgetId::new(1));
        let b = Symbols::new(WidgetId::new(2));

        assert_eq!(a.left(), ConstraintVariable::new(WidgetId::new(1), Attribute::Left));
        assert_ne!(a.left(), b.left());
        assert_ne!(a.left(), a.top());
    }

    #[test]
    fn derived_edges_are_cached() {
        let symbols = Symbols::new(WidgetId::new(3));
        let first: *const LinearExpression = symbols.right();
        let second: *const LinearExpression = symbols.right();
        assert!(core::ptr::eq(first, second));
    }

    #[test]
    fn derived_edges_evaluate_against_primitives() {
        let symbols = Symbols::new(WidgetId::new(4));
        let value = |var: ConstraintVariable| match var.attribute() {
            Attribute::Left => 10.0,
            Attribute::Top => 20.0,
            Attribute::Width => 100.0,
            Attribute::Height => 50.0,
        };

        assert_eq!(symbols.right().evaluate(value), 110.0);
        assert_eq!(symbols.bottom().evaluate(value), 70.0);
        assert_eq!(symbols.h_center().evaluate(value), 60.0);
        assert_eq!(symbols.v_center().evaluate(value), 45.0);
    }

    #[test]
    fn inset_follows_padding() {
        let symbols = Symbols::new(WidgetId::new(5));
        let contents = symbols.inset(&Padding::new(1.0, 2.0, 3.0, 4.0));
        let value = |var: ConstraintVariable| match var.attribute() {
            Attribute::Left | Attribute::Top => 0.0,
            Attribute::Width | Attribute::Height => 100.0,
        };

        assert_eq!(contents.left.evaluate(value), 4.0);
        assert_eq!(contents.top.evaluate(value), 1.0);
        assert_eq!(contents.right.evaluate(value), 98.0);
        assert_eq!(contents.bottom.evaluate(value), 97.0);
        assert_eq!(contents.width().evaluate(value), 94.0);
    }

    #[test]
    fn display_names_owner_and_attribute() {
        let symbols = Symbols::new(WidgetId::new(7));
        assert_eq!(symbols.height().to_string(), "#7.height");
    }
}
