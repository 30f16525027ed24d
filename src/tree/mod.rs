//! The widget arena and its layout state.
//!
//! [`LayoutTree`] stores widgets in a flat arena addressed by [`WidgetId`].
//! Removed widgets keep their slot as a tombstone so stale ids can be told
//! apart from live ones.

mod boundary;

use alloc::{boxed::Box, rc::Rc, vec, vec::Vec};

use nami::Signal;

use crate::props::{PropertyDefaults, RelayoutTrigger};
use crate::{
    BoundarySolver, ConstraintContext, ConstraintItem, ContentBox, ExpressionExt, FrameQueue,
    LayoutConfig, LayoutError, LayoutProperties, LayoutProxy, LayoutScheduler, Liveness, Padding,
    Rect, Size, StrengthPolicy, Symbols, UpdateCycle, WidgetId, content_box, vbox,
};

/// What part a widget plays in constraints layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Not laid out by constraints; skipped by helpers and boundaries.
    Plain,
    /// A leaf with a box model.
    Constrained,
    /// A widget laying out its constrained children.
    Container,
}

impl WidgetKind {
    /// Whether widgets of this kind have a box model.
    #[must_use]
    pub const fn is_constrainable(self) -> bool {
        matches!(self, Self::Constrained | Self::Container)
    }
}

#[derive(Debug)]
struct LayoutState {
    symbols: Symbols,
    props: LayoutProperties,
    geometry: Rect,
    known_size: Option<Size>,
    /// Smallest size the contents of a container fit in, from its own solve.
    content_size: Option<Size>,
    proxy: Option<Box<dyn LayoutProxy>>,
    solver: Option<BoundarySolver>,
}

impl LayoutState {
    fn policy(&self) -> StrengthPolicy {
        StrengthPolicy {
            hug_width: self.props.hug_width().get(),
            hug_height: self.props.hug_height().get(),
            resist_width: self.props.resist_width().get(),
            resist_height: self.props.resist_height().get(),
        }
    }
}

#[derive(Debug)]
struct WidgetEntry {
    kind: WidgetKind,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    liveness: Liveness,
    removed: bool,
    layout: Option<LayoutState>,
}

/// What one update cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Cycles run, more than one only for [`LayoutTree::flush`].
    pub cycles: usize,
    /// Tasks executed.
    pub tasks: usize,
    /// Boundaries solved, in order.
    pub solved: Vec<WidgetId>,
    /// Failed tasks. Other tasks of the cycle still ran.
    pub errors: Vec<LayoutError>,
}

impl CycleReport {
    fn merge(&mut self, other: Self) {
        self.cycles += other.cycles;
        self.tasks += other.tasks;
        self.solved.extend(other.solved);
        self.errors.extend(other.errors);
    }
}

/// A tree of widgets laid out by constraints.
///
/// ```rust
/// use undertow::{LayoutTree, Size, WidgetKind};
///
/// let mut tree = LayoutTree::new();
/// let root = tree.insert_root(WidgetKind::Container);
/// let label = tree.insert_child(root, WidgetKind::Constrained).unwrap();
/// tree.set_size_hint(label, Some(Size::new(80.0, 20.0))).unwrap();
///
/// let report = tree.flush();
/// assert!(report.errors.is_empty());
/// assert!((tree.geometry(label).unwrap().width - 80.0).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct LayoutTree {
    entries: Vec<WidgetEntry>,
    config: LayoutConfig,
    scheduler: LayoutScheduler,
    /// Boundaries solved in the running cycle, with the request clock at
    /// the start of each solve.
    cycle_solves: Option<Vec<(WidgetId, u64)>>,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    /// Creates an empty tree with the default configuration, driven by a
    /// [`FrameQueue`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Creates an empty tree driven by a [`FrameQueue`].
    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        Self::with_cycle(config, Rc::new(FrameQueue::new()))
    }

    /// Creates an empty tree whose relayouts are queued on `cycle`.
    #[must_use]
    pub fn with_cycle(config: LayoutConfig, cycle: Rc<dyn UpdateCycle>) -> Self {
        Self {
            entries: Vec::new(),
            config,
            scheduler: LayoutScheduler::new(cycle),
            cycle_solves: None,
        }
    }

    /// The configuration of the tree.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The scheduler coalescing relayout requests.
    #[must_use]
    pub const fn scheduler(&self) -> &LayoutScheduler {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    fn push_entry(&mut self, kind: WidgetKind, parent: Option<WidgetId>) -> WidgetId {
        let id = WidgetId::new(self.entries.len());
        let liveness = Liveness::new(parent.is_none_or(|parent| self.is_active(parent)));
        let layout = kind.is_constrainable().then(|| {
            let trigger = RelayoutTrigger::new(self.scheduler.clone(), id, liveness.clone());
            let defaults = if kind == WidgetKind::Container {
                PropertyDefaults {
                    hug: StrengthPolicy::CONTAINER.hug_width,
                    resist: StrengthPolicy::CONTAINER.resist_width,
                    padding: Some(self.config.default_padding),
                }
            } else {
                let policy = StrengthPolicy::default();
                PropertyDefaults {
                    hug: policy.hug_width,
                    resist: policy.resist_width,
                    padding: None,
                }
            };
            LayoutState {
                symbols: Symbols::new(id),
                props: LayoutProperties::new(defaults, &trigger),
                geometry: Rect::default(),
                known_size: None,
                content_size: None,
                proxy: None,
                solver: None,
            }
        });
        self.entries.push(WidgetEntry {
            kind,
            parent,
            children: Vec::new(),
            liveness,
            removed: false,
            layout,
        });
        id
    }

    /// Adds a widget without a parent.
    pub fn insert_root(&mut self, kind: WidgetKind) -> WidgetId {
        let id = self.push_entry(kind, None);
        if kind.is_constrainable() {
            self.request(id);
        }
        id
    }

    /// Adds a widget as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownWidget`] if `parent` is not part of the
    /// tree.
    pub fn insert_child(
        &mut self,
        parent: WidgetId,
        kind: WidgetKind,
    ) -> Result<WidgetId, LayoutError> {
        self.entry(parent)?;
        let id = self.push_entry(kind, Some(parent));
        self.entries[parent.index()].children.push(id);
        self.child_added(parent, id);
        Ok(id)
    }

    /// Removes `widget` and its descendants.
    ///
    /// Pending relayouts of removed widgets become no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownWidget`] if `widget` is not part of the
    /// tree.
    pub fn remove(&mut self, widget: WidgetId) -> Result<(), LayoutError> {
        let parent = self.entry(widget)?.parent;
        for id in self.subtree(widget) {
            let entry = &mut self.entries[id.index()];
            entry.removed = true;
            entry.liveness.set(false);
            if let Some(layout) = entry.layout.as_mut() {
                layout.proxy = None;
                layout.solver = None;
            }
        }
        if let Some(parent) = parent {
            self.entries[parent.index()]
                .children
                .retain(|&child| child != widget);
            self.child_removed(parent, widget);
        }
        tracing::debug!(%widget, "widget removed");
        Ok(())
    }

    fn child_added(&self, parent: WidgetId, child: WidgetId) {
        if self.needs_parent_relayout(parent, child) {
            self.request(parent);
        }
    }

    fn child_removed(&self, parent: WidgetId, child: WidgetId) {
        if self.needs_parent_relayout(parent, child) {
            self.request(parent);
        }
    }

    fn needs_parent_relayout(&self, parent: WidgetId, child: WidgetId) -> bool {
        self.entries[parent.index()].kind == WidgetKind::Container
            && self.entries[child.index()].kind.is_constrainable()
    }

    /// `widget` followed by its descendants, depth first.
    fn subtree(&self, widget: WidgetId) -> Vec<WidgetId> {
        let mut order = Vec::new();
        let mut stack = vec![widget];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.entries[id.index()].children.iter().rev().copied());
        }
        order
    }

    fn entry(&self, widget: WidgetId) -> Result<&WidgetEntry, LayoutError> {
        self.entries
            .get(widget.index())
            .filter(|entry| !entry.removed)
            .ok_or(LayoutError::UnknownWidget(widget))
    }

    fn layout(&self, widget: WidgetId) -> Result<&LayoutState, LayoutError> {
        self.entry(widget)?
            .layout
            .as_ref()
            .ok_or(LayoutError::NotConstrainable(widget))
    }

    fn layout_mut(&mut self, widget: WidgetId) -> Result<&mut LayoutState, LayoutError> {
        self.entries
            .get_mut(widget.index())
            .filter(|entry| !entry.removed)
            .ok_or(LayoutError::UnknownWidget(widget))?
            .layout
            .as_mut()
            .ok_or(LayoutError::NotConstrainable(widget))
    }

    fn live_layout(&self, widget: WidgetId) -> Option<&LayoutState> {
        self.layout(widget).ok()
    }

    /// Whether `widget` is part of the tree.
    #[must_use]
    pub fn contains(&self, widget: WidgetId) -> bool {
        self.entry(widget).is_ok()
    }

    /// The kind of `widget`.
    #[must_use]
    pub fn kind(&self, widget: WidgetId) -> Option<WidgetKind> {
        self.entry(widget).ok().map(|entry| entry.kind)
    }

    /// The parent of `widget`.
    #[must_use]
    pub fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        self.entry(widget).ok().and_then(|entry| entry.parent)
    }

    /// The children of `widget`, in insertion order.
    #[must_use]
    pub fn children(&self, widget: WidgetId) -> &[WidgetId] {
        self.entry(widget)
            .map_or(&[], |entry| entry.children.as_slice())
    }

    fn constrainable_children(&self, widget: WidgetId) -> Vec<WidgetId> {
        self.children(widget)
            .iter()
            .copied()
            .filter(|&child| self.kind(child).is_some_and(WidgetKind::is_constrainable))
            .collect()
    }

    // ------------------------------------------------------------------
    // Liveness
    // ------------------------------------------------------------------

    /// Whether `widget` is part of the tree and active.
    #[must_use]
    pub fn is_active(&self, widget: WidgetId) -> bool {
        self.entry(widget)
            .is_ok_and(|entry| entry.liveness.is_active())
    }

    /// Activates `widget` and its descendants, and requests a relayout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownWidget`] if `widget` is not part of the
    /// tree.
    pub fn activate(&mut self, widget: WidgetId) -> Result<(), LayoutError> {
        self.set_active(widget, true)?;
        if self.entry(widget)?.kind.is_constrainable() {
            self.request(widget);
        }
        Ok(())
    }

    /// Deactivates `widget` and its descendants. Their pending relayouts
    /// become no-ops and new requests are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownWidget`] if `widget` is not part of the
    /// tree.
    pub fn deactivate(&mut self, widget: WidgetId) -> Result<(), LayoutError> {
        self.set_active(widget, false)
    }

    fn set_active(&self, widget: WidgetId, active: bool) -> Result<(), LayoutError> {
        self.entry(widget)?;
        for id in self.subtree(widget) {
            self.entries[id.index()].liveness.set(active);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout state
    // ------------------------------------------------------------------

    /// The reactive layout properties of `widget`.
    #[must_use]
    pub fn props(&self, widget: WidgetId) -> Option<&LayoutProperties> {
        self.live_layout(widget).map(|layout| &layout.props)
    }

    /// The box model of `widget`.
    #[must_use]
    pub fn symbols(&self, widget: WidgetId) -> Option<&Symbols> {
        self.live_layout(widget).map(|layout| &layout.symbols)
    }

    /// The padded content box of a container, computed from its current
    /// padding.
    #[must_use]
    pub fn contents(&self, widget: WidgetId) -> Option<ContentBox> {
        content_box(self, widget)
    }

    /// The geometry applied by the last successful solve, relative to the
    /// parent.
    #[must_use]
    pub fn geometry(&self, widget: WidgetId) -> Option<Rect> {
        self.live_layout(widget).map(|layout| layout.geometry)
    }

    /// The solver owned by `widget`, if it owns a boundary that has been
    /// solved.
    #[must_use]
    pub fn solver(&self, widget: WidgetId) -> Option<&BoundarySolver> {
        self.live_layout(widget)?.solver.as_ref()
    }

    /// The strength policy of `widget`.
    #[must_use]
    pub fn policy(&self, widget: WidgetId) -> Option<StrengthPolicy> {
        self.live_layout(widget).map(LayoutState::policy)
    }

    /// Attaches the platform proxy of `widget`.
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn set_proxy(
        &mut self,
        widget: WidgetId,
        proxy: impl LayoutProxy + 'static,
    ) -> Result<(), LayoutError> {
        self.layout_mut(widget)?.proxy = Some(Box::new(proxy));
        Ok(())
    }

    /// Gives `widget` an externally decided size and requests a relayout.
    ///
    /// Only boundary owners honour it: they are held at this size with the
    /// configured [`size_strength`](LayoutConfig::size_strength).
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn resize(&mut self, widget: WidgetId, size: Size) -> Result<(), LayoutError> {
        let layout = self.layout_mut(widget)?;
        layout.known_size = Some(size);
        layout.geometry = layout.geometry.with_size(size);
        self.request(widget);
        Ok(())
    }

    /// Moves `widget` without relaying it out. The position of a top-level
    /// owner is never changed by a solve.
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn move_to(&mut self, widget: WidgetId, x: f64, y: f64) -> Result<(), LayoutError> {
        let layout = self.layout_mut(widget)?;
        layout.geometry.x = x;
        layout.geometry.y = y;
        Ok(())
    }

    /// Replaces the constraints list of `widget`.
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn set_constraints(
        &self,
        widget: WidgetId,
        items: impl IntoIterator<Item = ConstraintItem>,
    ) -> Result<(), LayoutError> {
        let items: Vec<ConstraintItem> = items.into_iter().collect();
        self.layout(widget)?.props.constraints().set(items);
        Ok(())
    }

    /// Replaces the size hint of `widget`.
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn set_size_hint(&self, widget: WidgetId, hint: Option<Size>) -> Result<(), LayoutError> {
        self.layout(widget)?.props.size_hint().set(hint);
        Ok(())
    }

    /// Replaces the four strengths of `widget`.
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn set_policy(&self, widget: WidgetId, policy: StrengthPolicy) -> Result<(), LayoutError> {
        let props = &self.layout(widget)?.props;
        props.hug_width().set(policy.hug_width);
        props.hug_height().set(policy.hug_height);
        props.resist_width().set(policy.resist_width);
        props.resist_height().set(policy.resist_height);
        Ok(())
    }

    /// Lets a container join the layout of its parent container.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotAContainer`] for widgets that are not
    /// containers.
    pub fn set_share_layout(&self, widget: WidgetId, share: bool) -> Result<(), LayoutError> {
        self.layout(widget)?
            .props
            .share_layout()
            .ok_or(LayoutError::NotAContainer(widget))?
            .set(share);
        // The parent boundary gains or loses this container's interior.
        if let Some(parent) = self
            .parent(widget)
            .filter(|&parent| self.kind(parent) == Some(WidgetKind::Container))
        {
            self.request(parent);
        }
        Ok(())
    }

    /// Replaces the padding of a container.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotAContainer`] for widgets that are not
    /// containers.
    pub fn set_padding(&self, widget: WidgetId, padding: Padding) -> Result<(), LayoutError> {
        self.layout(widget)?
            .props
            .padding()
            .ok_or(LayoutError::NotAContainer(widget))?
            .set(padding);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    fn request(&self, widget: WidgetId) -> bool {
        self.entry(widget)
            .is_ok_and(|entry| self.scheduler.relayout(widget, &entry.liveness))
    }

    /// Requests a deferred relayout of `widget`.
    ///
    /// Returns `true` if a task was queued, `false` if the request was
    /// coalesced into a pending one, deferred by [`batch`](Self::batch) or
    /// ignored because the widget is inactive.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownWidget`] if `widget` is not part of the
    /// tree.
    pub fn relayout(&self, widget: WidgetId) -> Result<bool, LayoutError> {
        self.entry(widget)?;
        Ok(self.request(widget))
    }

    /// Runs `f` with relayout requests held back, then dispatches each
    /// distinct request once.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let _suspended = self.scheduler.suspend_guard();
        f(self)
    }

    /// Body of a scheduled relayout task.
    pub(crate) fn run_layout_task(&mut self, widget: WidgetId) -> Result<(), LayoutError> {
        self.scheduler.start(widget);
        if !self.is_active(widget) {
            tracing::debug!(%widget, "relayout skipped, widget is no longer active");
            return Ok(());
        }
        let owner = self.layout_owner(widget)?;
        let Some(solved) = self.cycle_solves.as_ref() else {
            return self.solve_boundary(owner);
        };
        if let Some(&(_, stamp)) = solved.iter().find(|(id, _)| *id == owner) {
            if self.scheduler.requested_since(widget, stamp) {
                tracing::trace!(%widget, %owner, "changed after its boundary was solved");
                self.request(widget);
            } else {
                tracing::trace!(%widget, %owner, "boundary already solved in this cycle");
            }
            return Ok(());
        }
        let stamp = self.scheduler.clock();
        if let Some(solved) = self.cycle_solves.as_mut() {
            solved.push((owner, stamp));
        }
        self.solve_boundary(owner)
    }

    /// Runs every task queued before this call.
    ///
    /// Each boundary is solved at most once. Tasks queued while the cycle
    /// runs are left for the next one, and so are widgets changed after
    /// their boundary was solved.
    pub fn run_cycle(&mut self) -> CycleReport {
        let tasks = self.scheduler.cycle().take_ready();
        let mut report = CycleReport {
            cycles: 1,
            ..CycleReport::default()
        };
        self.cycle_solves = Some(Vec::new());
        for task in tasks {
            report.tasks += 1;
            if let Err(error) = task.run(self) {
                tracing::warn!(%error, "layout task failed");
                report.errors.push(error);
            }
        }
        report.solved = self
            .cycle_solves
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|(owner, _)| owner)
            .collect();
        tracing::debug!(
            tasks = report.tasks,
            solved = report.solved.len(),
            errors = report.errors.len(),
            "update cycle finished"
        );
        report
    }

    /// Runs update cycles until nothing is queued, up to
    /// [`max_flush_cycles`](LayoutConfig::max_flush_cycles).
    pub fn flush(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        for _ in 0..self.config.max_flush_cycles {
            if self.scheduler.cycle().is_idle() {
                return report;
            }
            report.merge(self.run_cycle());
        }
        if !self.scheduler.cycle().is_idle() {
            tracing::warn!(
                cycles = self.config.max_flush_cycles,
                "layout did not settle"
            );
        }
        report
    }
}

impl ConstraintContext for LayoutTree {
    fn symbols(&self, widget: WidgetId) -> Option<&Symbols> {
        self.live_layout(widget).map(|layout| &layout.symbols)
    }

    fn padding(&self, widget: WidgetId) -> Option<Padding> {
        self.live_layout(widget)?.props.current_padding()
    }

    fn constraints(&self, widget: WidgetId) -> Vec<ConstraintItem> {
        self.live_layout(widget)
            .map(|layout| layout.props.constraints().get())
            .unwrap_or_default()
    }

    fn default_constraints(&self, widget: WidgetId) -> Vec<ConstraintItem> {
        match self.kind(widget) {
            Some(WidgetKind::Container) => vec![vbox(self.constrainable_children(widget)).into()],
            _ => Vec::new(),
        }
    }

    fn component_constraints(&self, widget: WidgetId) -> Vec<ConstraintItem> {
        let Some(layout) = self.live_layout(widget) else {
            return Vec::new();
        };
        let Some(padding) = layout.props.current_padding() else {
            return Vec::new();
        };
        let symbols = &layout.symbols;
        vec![
            symbols.width().at_least(padding.horizontal()).into(),
            symbols.height().at_least(padding.vertical()).into(),
        ]
    }

    fn geometry(&self, widget: WidgetId) -> Option<Rect> {
        self.live_layout(widget).map(|layout| layout.geometry)
    }

    fn default_spacing(&self) -> f64 {
        self.config.default_spacing
    }

    fn max_expansion_depth(&self) -> usize {
        self.config.max_expansion_depth
    }
}

#[cfg(test)]
mod tests;
