#![doc = include_str!("../README.md")]

extern crate alloc;

pub mod config;
pub mod cycle;
pub mod dock;
pub mod error;
pub mod logging;
pub mod policy;
pub mod props;
pub mod proxy;
pub mod scheduler;
pub mod solver;
pub mod tree;

#[doc(inline)]
pub use undertow_layout::*;

pub use config::{ConfigError, LayoutConfig};
pub use cycle::{Completion, FrameQueue, ScheduledTask, Task, TaskHandle, TaskId, UpdateCycle};
pub use dock::{DockArea, DockLayout, DockLayoutWarning, Orientation};
pub use error::LayoutError;
pub use policy::StrengthPolicy;
pub use props::LayoutProperties;
pub use proxy::{LayoutProxy, ProxyEvent, RecordingProxy};
pub use scheduler::{LayoutScheduler, Liveness, SuspendGuard};
pub use solver::{BoundarySolver, Edit, SolveFailure, SolveStats};
pub use tree::{CycleReport, LayoutTree, WidgetKind};

/// The `tracing` crate, for hosts that want to subscribe to layout events.
pub use tracing as log;

pub mod prelude {
    //! A collection of commonly used traits and types for easy importing.
    //!
    //! ```rust
    //! use undertow::prelude::*;
    //!
    //! let mut tree = LayoutTree::new();
    //! let root = tree.insert_root(WidgetKind::Container);
    //! let symbols = tree.symbols(root).unwrap().clone();
    //! tree.set_constraints(root, [symbols.width().equal_to(200.0).into()]).unwrap();
    //! ```
    pub use crate::{
        ConstraintItem, ExpressionExt, LayoutConfig, LayoutError, LayoutTree, Padding, Rect, Size,
        Strength, StrengthPolicy, Symbols, WidgetId, WidgetKind, align, flex_spacer, hbox, spacer,
        vbox, when,
    };
}
