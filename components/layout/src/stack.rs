//! Linear box helpers: [`vbox`] and [`hbox`].
//!
//! A box arranges widgets one after another along its axis inside the padded
//! content box of the widget that owns it, and stretches them across the
//! other axis.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    ConstraintContext, ConstraintHelper, ConstraintItem, ConstraintTypeError, ContentBox,
    ExpressionExt, LinearExpression, Padding, Strength, Symbols, WidgetId,
};

/// The axis along which a [`LinearBox`] places its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// Leading and trailing edge of `symbols` along this axis.
    fn edges(self, symbols: &Symbols) -> (LinearExpression, LinearExpression) {
        match self {
            Self::Horizontal => (symbols.left().into(), symbols.right().clone()),
            Self::Vertical => (symbols.top().into(), symbols.bottom().clone()),
        }
    }

    /// Leading and trailing edge of a content box along this axis.
    fn bounds(self, content: &ContentBox) -> (&LinearExpression, &LinearExpression) {
        match self {
            Self::Horizontal => (&content.left, &content.right),
            Self::Vertical => (&content.top, &content.bottom),
        }
    }

    const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Explicit space between two neighbours of a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacer {
    size: f64,
    flexible: bool,
}

impl Spacer {
    /// The (minimum) size of the gap.
    #[must_use]
    pub const fn size(&self) -> f64 {
        self.size
    }

    /// Whether the gap may grow beyond its size.
    #[must_use]
    pub const fn is_flexible(&self) -> bool {
        self.flexible
    }

    // Consecutive spacers add up.
    fn merge(self, other: Self) -> Self {
        Self {
            size: self.size + other.size,
            flexible: self.flexible || other.flexible,
        }
    }
}

impl fmt::Display for Spacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flexible {
            write!(f, "flex_spacer({})", self.size)
        } else {
            write!(f, "spacer({})", self.size)
        }
    }
}

/// An entry of a box helper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxItem {
    /// A widget placed by the box.
    Widget(WidgetId),
    /// A gap replacing the default spacing.
    Spacer(Spacer),
    /// Nothing, for conditional layouts.
    Skip,
}

impl From<WidgetId> for BoxItem {
    fn from(widget: WidgetId) -> Self {
        Self::Widget(widget)
    }
}

impl From<Option<WidgetId>> for BoxItem {
    fn from(widget: Option<WidgetId>) -> Self {
        widget.map_or(Self::Skip, Self::Widget)
    }
}

impl From<Spacer> for BoxItem {
    fn from(spacer: Spacer) -> Self {
        Self::Spacer(spacer)
    }
}

impl fmt::Display for BoxItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Widget(widget) => write!(f, "{widget}"),
            Self::Spacer(spacer) => write!(f, "{spacer}"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// A fixed gap of `size`.
#[must_use]
pub const fn spacer(size: f64) -> BoxItem {
    BoxItem::Spacer(Spacer {
        size,
        flexible: false,
    })
}

/// A gap of at least `min`.
#[must_use]
pub const fn flex_spacer(min: f64) -> BoxItem {
    BoxItem::Spacer(Spacer {
        size: min,
        flexible: true,
    })
}

/// Arranges widgets along an [`Axis`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearBox {
    axis: Axis,
    items: Vec<BoxItem>,
    spacing: Option<f64>,
    margins: Option<Padding>,
}

impl LinearBox {
    /// Creates a box along `axis`.
    pub fn new<I>(axis: Axis, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BoxItem>,
    {
        Self {
            axis,
            items: items.into_iter().map(Into::into).collect(),
            spacing: None,
            margins: None,
        }
    }

    /// Overrides the spacing between neighbours.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Lays the box out inside `margins` instead of the owner's padding.
    #[must_use]
    pub fn with_margins(mut self, margins: Padding) -> Self {
        self.margins = Some(margins);
        self
    }

    /// The axis of the box.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// The items of the box.
    #[must_use]
    pub fn items(&self) -> &[BoxItem] {
        &self.items
    }

    fn resolve<'a>(
        &self,
        owner: WidgetId,
        widget: WidgetId,
        ctx: &'a dyn ConstraintContext,
    ) -> Result<&'a Symbols, ConstraintTypeError> {
        if widget == owner {
            return Err(ConstraintTypeError::new(
                owner,
                self,
                "a widget cannot be placed inside its own box",
            ));
        }
        ctx.symbols(widget).ok_or_else(|| {
            ConstraintTypeError::new(
                owner,
                self,
                alloc::format!("{widget} does not take part in constraints layout"),
            )
        })
    }

    fn content(
        &self,
        owner: WidgetId,
        ctx: &dyn ConstraintContext,
    ) -> Result<ContentBox, ConstraintTypeError> {
        let symbols = ctx.symbols(owner).ok_or_else(|| {
            ConstraintTypeError::new(owner, self, "a box needs a constrainable owner")
        })?;
        let padding = self
            .margins
            .or_else(|| ctx.padding(owner))
            .unwrap_or(Padding::ZERO);
        Ok(symbols.inset(&padding))
    }
}

impl fmt::Display for LinearBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.axis {
            Axis::Horizontal => "hbox(",
            Axis::Vertical => "vbox(",
        })?;
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str(")")
    }
}

// `edge + gap` placed against `next`: exact for fixed gaps, a lower bound for
// flexible ones.
fn gap_constraint(
    edge: &LinearExpression,
    gap: Option<Spacer>,
    default: f64,
    next: LinearExpression,
) -> ConstraintItem {
    let (size, flexible) = gap.map_or((default, false), |spacer| (spacer.size, spacer.flexible));
    let start = edge + size;
    if flexible {
        next.at_least(start).into()
    } else {
        next.equal_to(start).into()
    }
}

impl ConstraintHelper for LinearBox {
    fn expand(
        &self,
        owner: WidgetId,
        ctx: &dyn ConstraintContext,
    ) -> Result<Vec<ConstraintItem>, ConstraintTypeError> {
        let content = self.content(owner, ctx)?;
        let spacing = self.spacing.unwrap_or_else(|| ctx.default_spacing());
        let (lead, trail) = self.axis.bounds(&content);
        let (cross_lead, cross_trail) = self.axis.cross().bounds(&content);

        let mut items = Vec::new();
        let mut previous: Option<LinearExpression> = None;
        let mut gap: Option<Spacer> = None;

        for item in &self.items {
            let widget = match *item {
                BoxItem::Skip => continue,
                BoxItem::Spacer(spacer) => {
                    gap = Some(gap.map_or(spacer, |current| current.merge(spacer)));
                    continue;
                }
                BoxItem::Widget(widget) => widget,
            };
            let symbols = self.resolve(owner, widget, ctx)?;
            let (leading, trailing) = self.axis.edges(symbols);

            // The first widget sits on the content edge unless a spacer
            // precedes it; later ones follow their neighbour.
            items.push(match previous.as_ref() {
                Some(edge) => gap_constraint(edge, gap.take(), spacing, leading),
                None => gap_constraint(lead, gap.take(), 0.0, leading),
            });

            let (child_cross_lead, child_cross_trail) = self.axis.cross().edges(symbols);
            items.push(child_cross_lead.equal_to(cross_lead).into());
            items.push(child_cross_trail.clone().at_most(cross_trail).into());
            items.push(
                child_cross_trail
                    .equal_to(cross_trail)
                    .with_strength(Strength::Weak)
                    .into(),
            );

            previous = Some(trailing);
        }

        if let Some(edge) = previous {
            items.push(gap_constraint(&edge, gap, 0.0, trail.clone()));
        }

        Ok(items)
    }
}

impl From<LinearBox> for ConstraintItem {
    fn from(helper: LinearBox) -> Self {
        Self::helper(helper)
    }
}

/// Stacks `items` from top to bottom.
///
/// ```rust
/// use undertow_layout::{WidgetId, spacer, vbox};
///
/// let (title, body) = (WidgetId::new(1), WidgetId::new(2));
/// let layout = vbox([title.into(), spacer(20.0), body.into()]);
/// assert_eq!(layout.to_string(), "vbox(#1, spacer(20), #2)");
/// ```
pub fn vbox<I>(items: I) -> LinearBox
where
    I: IntoIterator,
    I::Item: Into<BoxItem>,
{
    LinearBox::new(Axis::Vertical, items)
}

/// Lines `items` up from left to right.
pub fn hbox<I>(items: I) -> LinearBox
where
    I: IntoIterator,
    I::Item: Into<BoxItem>,
{
    LinearBox::new(Axis::Horizontal, items)
}
