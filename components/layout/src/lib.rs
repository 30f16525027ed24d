#![no_std]
//! Constraint helpers and constraint collection for `Undertow`.
//!
//! A widget's `constraints` list holds [`ConstraintItem`]s: primitive
//! constraints built from the symbolic algebra of `undertow-core`, or
//! helpers such as [`vbox`], [`hbox`] and [`align`] that generate primitive
//! constraints from the current state of the widget tree. This crate contains:
//!
//! - the [`ConstraintContext`] seam through which helpers read the tree,
//! - the helpers themselves,
//! - [`collect`], which turns a widget's list (or its defaults) into
//!   primitive constraints.
//!
//! # Example
//!
//! ```rust,ignore
//! use undertow_layout::{ConstraintItem, hbox, spacer, vbox};
//!
//! let items: Vec<ConstraintItem> = vec![
//!     vbox([title.into(), spacer(20.0), body.into()]).into(),
//!     hbox([ok, cancel]).with_spacing(8.0).into(),
//! ];
//! ```

extern crate alloc;

pub use undertow_core::*;

pub mod align;
pub mod collect;
pub mod context;
pub mod item;
pub mod stack;

pub use align::{Align, Anchor, align};
pub use collect::{collect, expand};
pub use context::{ConstraintContext, DEFAULT_MAX_DEPTH, DEFAULT_SPACING, content_box};
pub use item::{ConstraintHelper, ConstraintItem, when};
pub use stack::{Axis, BoxItem, LinearBox, Spacer, flex_spacer, hbox, spacer, vbox};
