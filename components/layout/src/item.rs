//! Entries of a widget's constraints list.

use alloc::{rc::Rc, vec::Vec};
use core::fmt::{self, Debug};

use crate::{ConstraintContext, ConstraintTypeError, WidgetId};
use undertow_core::Constraint;

/// An object that generates constraints on demand.
///
/// Helpers are expanded every time their owner is collected, against the
/// current state of the tree. Expansion must be deterministic and must not
/// have side effects.
pub trait ConstraintHelper: Debug {
    /// Produces the items this helper stands for.
    ///
    /// `owner` is the widget whose constraints list holds the helper. The
    /// returned items may themselves be helpers; they are expanded in turn.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintTypeError`] if the helper refers to something that
    /// cannot take part in layout.
    fn expand(
        &self,
        owner: WidgetId,
        ctx: &dyn ConstraintContext,
    ) -> Result<Vec<ConstraintItem>, ConstraintTypeError>;
}

/// A single entry of a constraints list.
#[derive(Clone)]
pub enum ConstraintItem {
    /// A primitive constraint, used verbatim.
    Constraint(Constraint),
    /// A helper expanded at collection time.
    Helper(Rc<dyn ConstraintHelper>),
    /// A disabled entry, see [`when`].
    Skip,
}

impl ConstraintItem {
    /// Wraps a helper.
    pub fn helper(helper: impl ConstraintHelper + 'static) -> Self {
        Self::Helper(Rc::new(helper))
    }

    /// Returns this item if `switch` is true, [`ConstraintItem::Skip`]
    /// otherwise.
    #[must_use]
    pub fn when(self, switch: bool) -> Self {
        if switch { self } else { Self::Skip }
    }
}

impl Debug for ConstraintItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constraint(constraint) => write!(f, "{constraint}"),
            Self::Helper(helper) => write!(f, "{helper:?}"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

impl From<Constraint> for ConstraintItem {
    fn from(constraint: Constraint) -> Self {
        Self::Constraint(constraint)
    }
}

impl From<Option<Constraint>> for ConstraintItem {
    fn from(constraint: Option<Constraint>) -> Self {
        constraint.map_or(Self::Skip, Self::Constraint)
    }
}

/// `item` if `switch` is true, a skipped entry otherwise.
///
/// Useful to toggle parts of a layout without rebuilding the whole list.
pub fn when(switch: bool, item: impl Into<ConstraintItem>) -> ConstraintItem {
    item.into().when(switch)
}
