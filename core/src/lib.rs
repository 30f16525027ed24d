#![no_std]
//! Symbolic box-model algebra for the `Undertow` constraint layout engine.
//!
//! Every widget taking part in constraints-based layout owns four primitive
//! [`ConstraintVariable`]s (`left`, `top`, `width`, `height`). Combining them
//! yields [`LinearExpression`]s, and relating two expressions yields a
//! [`Constraint`] tagged with a [`Strength`].
//!
//! This crate only describes the algebra. Collecting constraints from a widget
//! tree lives in `undertow-layout`, solving them lives in `undertow`.
//!
//! # Example
//!
//! ```rust
//! use undertow_core::{ExpressionExt, Strength, Symbols, WidgetId};
//!
//! let button = Symbols::new(WidgetId::new(1));
//! let label = Symbols::new(WidgetId::new(2));
//!
//! // The label sits 8 points to the right of the button.
//! let spacing = label.left().equal_to(button.right() + 8.0);
//! // Prefer a 120 point wide button, but let other constraints win.
//! let preferred = button.width().equal_to(120.0).with_strength(Strength::Medium);
//! # let _ = (spacing, preferred);
//! ```

extern crate alloc;

pub mod constraint;
pub mod error;
pub mod expression;
pub mod geometry;
pub mod strength;
pub mod variable;

pub use constraint::{Constraint, ExpressionExt, Relation};
pub use error::ConstraintTypeError;
pub use expression::{LinearExpression, Term, add, plus, scale, sub};
pub use geometry::{Padding, Rect, Size};
pub use strength::{ParseStrengthError, Strength};
pub use variable::{Attribute, ConstraintVariable, ContentBox, Symbols, WidgetId};
