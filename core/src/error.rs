//! Errors raised while turning constraint lists into primitive constraints.

use alloc::string::{String, ToString};

use crate::WidgetId;

/// A constraints list contained an entry that cannot become a primitive
/// constraint.
///
/// This is a programming error in the declaration of the widget, so it is
/// reported as soon as the list is collected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid constraint entry `{value}` on widget {widget}: {reason}")]
pub struct ConstraintTypeError {
    widget: WidgetId,
    value: String,
    reason: String,
}

impl ConstraintTypeError {
    /// Creates a new error for `value`, declared on `widget`.
    pub fn new(widget: WidgetId, value: impl ToString, reason: impl Into<String>) -> Self {
        Self {
            widget,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// The widget whose constraints list held the entry.
    #[must_use]
    pub const fn widget(&self) -> WidgetId {
        self.widget
    }

    /// A rendering of the offending entry.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Why the entry was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
