//! The [`align`] helper.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    ConstraintContext, ConstraintHelper, ConstraintItem, ConstraintTypeError, ExpressionExt,
    LinearExpression, Strength, Symbols, WidgetId,
};

/// The edge, center or dimension shared by aligned widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Left edges.
    Left,
    /// Top edges.
    Top,
    /// Right edges.
    Right,
    /// Bottom edges.
    Bottom,
    /// Horizontal centers.
    HCenter,
    /// Vertical centers.
    VCenter,
    /// Widths.
    Width,
    /// Heights.
    Height,
}

impl Anchor {
    /// The expression this anchor denotes on `symbols`.
    #[must_use]
    pub fn expression(self, symbols: &Symbols) -> LinearExpression {
        match self {
            Self::Left => symbols.left().into(),
            Self::Top => symbols.top().into(),
            Self::Right => symbols.right().clone(),
            Self::Bottom => symbols.bottom().clone(),
            Self::HCenter => symbols.h_center().clone(),
            Self::VCenter => symbols.v_center().clone(),
            Self::Width => symbols.width().into(),
            Self::Height => symbols.height().into(),
        }
    }

    /// Lowercase name, as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::HCenter => "h_center",
            Self::VCenter => "v_center",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

/// Makes an anchor of several widgets equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Align {
    anchor: Anchor,
    widgets: Vec<WidgetId>,
    strength: Strength,
}

impl Align {
    /// Uses `strength` for the generated equalities instead of required.
    #[must_use]
    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "align({}", self.anchor.name())?;
        for widget in &self.widgets {
            write!(f, ", {widget}")?;
        }
        write!(f, ") | {}", self.strength)
    }
}

impl ConstraintHelper for Align {
    fn expand(
        &self,
        owner: WidgetId,
        ctx: &dyn ConstraintContext,
    ) -> Result<Vec<ConstraintItem>, ConstraintTypeError> {
        let expressions = self
            .widgets
            .iter()
            .map(|&widget| {
                ctx.symbols(widget)
                    .map(|symbols| self.anchor.expression(symbols))
                    .ok_or_else(|| {
                        ConstraintTypeError::new(
                            owner,
                            self,
                            alloc::format!("{widget} does not take part in constraints layout"),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(expressions
            .windows(2)
            .map(|pair| {
                pair[0]
                    .clone()
                    .equal_to(&pair[1])
                    .with_strength(self.strength)
                    .into()
            })
            .collect())
    }
}

impl From<Align> for ConstraintItem {
    fn from(helper: Align) -> Self {
        Self::helper(helper)
    }
}

/// Aligns `anchor` across `widgets`, chaining each widget to the next.
///
/// Fewer than two widgets produce no constraints.
pub fn align(anchor: Anchor, widgets: impl IntoIterator<Item = WidgetId>) -> Align {
    Align {
        anchor,
        widgets: widgets.into_iter().collect(),
        strength: Strength::Required,
    }
}
