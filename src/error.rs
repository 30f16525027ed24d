//! Errors raised while solving layouts.

use alloc::{string::String, vec::Vec};

use crate::{ConstraintTypeError, WidgetId};

/// An error raised while solving the layout of a boundary.
///
/// Solving is all-or-nothing: whenever one of these is returned, no geometry
/// has been written for the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The required constraints of a boundary cannot all hold at once.
    #[error("layout of {boundary} is unsatisfiable: {}", .constraints.join(", "))]
    Unsatisfiable {
        /// The widget owning the boundary.
        boundary: WidgetId,
        /// Renderings of the constraints the solver rejected.
        constraints: Vec<String>,
    },
    /// A constraint refers to a widget outside of the boundary being solved.
    #[error("constraint `{constraint}` refers to {widget} outside the boundary of {boundary}")]
    BoundaryViolation {
        /// The widget owning the boundary.
        boundary: WidgetId,
        /// A rendering of the offending constraint.
        constraint: String,
        /// The foreign widget.
        widget: WidgetId,
    },
    /// A constraints list could not be collected.
    #[error(transparent)]
    Collect(#[from] ConstraintTypeError),
    /// The solver reached an invalid internal state.
    #[error("solver failure in the boundary of {boundary}: {message}")]
    Solver {
        /// The widget owning the boundary.
        boundary: WidgetId,
        /// The solver's own description of the failure.
        message: String,
    },
    /// The widget does not exist or has been removed.
    #[error("unknown widget {0}")]
    UnknownWidget(WidgetId),
    /// The operation needs a widget that takes part in constraints layout.
    #[error("{0} does not take part in constraints layout")]
    NotConstrainable(WidgetId),
    /// The operation needs a container.
    #[error("{0} is not a container")]
    NotAContainer(WidgetId),
}

impl LayoutError {
    /// The widget owning the boundary the error was raised in, if any.
    #[must_use]
    pub const fn boundary(&self) -> Option<WidgetId> {
        match self {
            Self::Unsatisfiable { boundary, .. }
            | Self::BoundaryViolation { boundary, .. }
            | Self::Solver { boundary, .. } => Some(*boundary),
            Self::Collect(_)
            | Self::UnknownWidget(_)
            | Self::NotConstrainable(_)
            | Self::NotAContainer(_) => None,
        }
    }
}
