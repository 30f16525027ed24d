//! The seam between the layout engine and a platform backend.

use alloc::{rc::Rc, vec::Vec};
use core::{cell::RefCell, fmt::Debug};

use crate::Rect;

/// The platform-side counterpart of a widget.
///
/// A solve computes every rectangle of a boundary first and only then calls
/// the proxies, so a proxy never observes a half-applied layout.
///
/// Proxies are called while the tree is borrowed mutably. Anything they want
/// to change in the layout must go through reactive bindings, which defer to
/// the scheduler.
pub trait LayoutProxy: Debug {
    /// Moves and resizes the native widget. `rect` is relative to the parent.
    fn apply_geometry(&mut self, rect: Rect);

    /// Lets the backend recompute anything derived from the geometry.
    fn relayout(&mut self) {}
}

/// A proxy recording every call, for tests and headless hosts.
#[derive(Debug, Default, Clone)]
pub struct RecordingProxy {
    log: Rc<RefCell<Vec<ProxyEvent>>>,
}

/// A call received by a [`RecordingProxy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProxyEvent {
    /// `apply_geometry` was called.
    Geometry(Rect),
    /// `relayout` was called.
    Relayout,
}

impl RecordingProxy {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far. Clones of a recorder share their log.
    #[must_use]
    pub fn events(&self) -> Vec<ProxyEvent> {
        self.log.borrow().clone()
    }

    /// The last geometry applied, if any.
    #[must_use]
    pub fn last_geometry(&self) -> Option<Rect> {
        self.log.borrow().iter().rev().find_map(|event| match event {
            ProxyEvent::Geometry(rect) => Some(*rect),
            ProxyEvent::Relayout => None,
        })
    }
}

impl LayoutProxy for RecordingProxy {
    fn apply_geometry(&mut self, rect: Rect) {
        self.log.borrow_mut().push(ProxyEvent::Geometry(rect));
    }

    fn relayout(&mut self) {
        self.log.borrow_mut().push(ProxyEvent::Relayout);
    }
}
