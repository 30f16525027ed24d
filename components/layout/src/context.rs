//! The read-only view of the widget tree used while expanding constraints.

use alloc::vec::Vec;

use crate::{ConstraintItem, ContentBox, Padding, Rect, WidgetId};
use undertow_core::Symbols;

/// Spacing inserted between consecutive widgets of a box helper.
pub const DEFAULT_SPACING: f64 = 10.0;

/// How many helper levels may be nested before expansion gives up.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Everything the collector and the helpers may know about the widget tree.
///
/// Implementations dispatch on their widget kinds: the default hooks return
/// nothing, and container-like widgets override
/// [`default_constraints`](Self::default_constraints) and
/// [`component_constraints`](Self::component_constraints).
///
/// Expansion only ever reads through this trait, so it cannot mutate the
/// tree.
pub trait ConstraintContext {
    /// The box model of `widget`, or `None` if it does not take part in
    /// constraints-based layout.
    fn symbols(&self, widget: WidgetId) -> Option<&Symbols>;

    /// The padding of `widget` if it is a container.
    fn padding(&self, widget: WidgetId) -> Option<Padding>;

    /// The user-supplied constraints list of `widget`.
    fn constraints(&self, widget: WidgetId) -> Vec<ConstraintItem>;

    /// Constraints used when the user list is empty.
    fn default_constraints(&self, _widget: WidgetId) -> Vec<ConstraintItem> {
        Vec::new()
    }

    /// Constraints a widget kind always adds on top of the user list.
    fn component_constraints(&self, _widget: WidgetId) -> Vec<ConstraintItem> {
        Vec::new()
    }

    /// The most recently applied geometry of `widget`.
    fn geometry(&self, _widget: WidgetId) -> Option<Rect> {
        None
    }

    /// Spacing between consecutive box items.
    fn default_spacing(&self) -> f64 {
        DEFAULT_SPACING
    }

    /// Maximum helper nesting.
    fn max_expansion_depth(&self) -> usize {
        DEFAULT_MAX_DEPTH
    }
}

/// The padded content box of `widget`.
///
/// Widgets without padding use their outer box.
pub fn content_box(ctx: &dyn ConstraintContext, widget: WidgetId) -> Option<ContentBox> {
    let symbols = ctx.symbols(widget)?;
    let padding = ctx.padding(widget).unwrap_or(Padding::ZERO);
    Some(symbols.inset(&padding))
}
