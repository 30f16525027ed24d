//! Solving the layout of one boundary.
//!
//! A boundary is the set of widgets solved together: an owner, its
//! constrained children, and recursively the children of every container
//! sharing the owner's layout. Containers that do not share are members with
//! an opaque interior; they are sized here and solve their own contents in a
//! later task. Their padding minimum and the smallest size their contents fit
//! in, measured by that later solve, still take part here.

use alloc::{string::ToString, vec, vec::Vec};
use std::collections::{HashMap, HashSet};

use super::{LayoutTree, WidgetKind};
use crate::{
    BoundarySolver, Constraint, ConstraintContext, ConstraintVariable, Edit, ExpressionExt,
    LayoutError, Rect, Size, SolveFailure, Symbols, WidgetId, collect, expand,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Member {
    id: WidgetId,
    opaque: bool,
}

const SIZE_TOLERANCE: f64 = 1e-6;

fn same_size(a: Size, b: Size) -> bool {
    (a.width - b.width).abs() < SIZE_TOLERANCE && (a.height - b.height).abs() < SIZE_TOLERANCE
}

/// Keeps every box non-negative and on-screen relative to the owner.
fn hard_constraints(symbols: &Symbols) -> [Constraint; 4] {
    [
        symbols.left().at_least(0.0),
        symbols.top().at_least(0.0),
        symbols.width().at_least(0.0),
        symbols.height().at_least(0.0),
    ]
}

impl LayoutTree {
    /// The widget whose boundary `widget` is solved in.
    ///
    /// A constrained leaf belongs to its parent container, a sharing
    /// container to its parent container's owner. Everything else owns
    /// itself.
    ///
    /// # Errors
    ///
    /// Fails if `widget` is unknown or has no box model.
    pub fn layout_owner(&self, widget: WidgetId) -> Result<WidgetId, LayoutError> {
        let mut current = widget;
        loop {
            let entry = self.entry(current)?;
            let layout = entry
                .layout
                .as_ref()
                .ok_or(LayoutError::NotConstrainable(current))?;
            let container_parent = entry
                .parent
                .filter(|&parent| self.kind(parent) == Some(WidgetKind::Container));
            current = match (entry.kind, container_parent) {
                (WidgetKind::Constrained, Some(parent)) => parent,
                (WidgetKind::Container, Some(parent)) if layout.props.is_sharing() => parent,
                _ => return Ok(current),
            };
        }
    }

    fn is_top_level(&self, widget: WidgetId) -> bool {
        self.parent(widget)
            .is_none_or(|parent| self.kind(parent) != Some(WidgetKind::Container))
    }

    /// The members of the boundary of `owner`, parents before children.
    fn members(&self, owner: WidgetId) -> Vec<Member> {
        let mut members = vec![Member {
            id: owner,
            opaque: false,
        }];
        if self.kind(owner) == Some(WidgetKind::Container) {
            self.collect_members(owner, &mut members);
        }
        members
    }

    fn collect_members(&self, container: WidgetId, members: &mut Vec<Member>) {
        for &child in self.children(container) {
            let Ok(entry) = self.entry(child) else {
                continue;
            };
            match entry.kind {
                WidgetKind::Plain => {}
                WidgetKind::Constrained => members.push(Member {
                    id: child,
                    opaque: false,
                }),
                WidgetKind::Container => {
                    let sharing = entry
                        .layout
                        .as_ref()
                        .is_some_and(|layout| layout.props.is_sharing());
                    members.push(Member {
                        id: child,
                        opaque: !sharing,
                    });
                    if sharing {
                        self.collect_members(child, members);
                    }
                }
            }
        }
    }

    /// Every constraint of the boundary of `owner`.
    fn aggregate(
        &self,
        owner: WidgetId,
        members: &[Member],
    ) -> Result<Vec<Constraint>, LayoutError> {
        let mut constraints = Vec::new();
        for member in members {
            let layout = self.layout(member.id)?;
            let symbols = &layout.symbols;
            constraints.extend(hard_constraints(symbols));
            if member.id == owner {
                constraints.push(symbols.left().equal_to(0.0));
                constraints.push(symbols.top().equal_to(0.0));
            } else if let Some(hint) = layout.props.size_hint().get() {
                constraints.extend(layout.policy().constraints(symbols, hint));
            }
            if member.opaque {
                constraints.extend(expand(
                    self,
                    member.id,
                    self.component_constraints(member.id),
                )?);
                if let Some(contents) = layout.content_size {
                    constraints.extend(layout.policy().constraints(symbols, contents));
                }
            } else {
                constraints.extend(collect(self, member.id)?);
            }
        }

        let inside: HashSet<WidgetId> = members.iter().map(|member| member.id).collect();
        for constraint in &constraints {
            if let Some(widget) = constraint
                .variables()
                .map(|variable| variable.owner())
                .find(|widget| !inside.contains(widget))
            {
                return Err(LayoutError::BoundaryViolation {
                    boundary: owner,
                    constraint: constraint.to_string(),
                    widget,
                });
            }
        }
        Ok(constraints)
    }

    /// Holds the owner at its known size. A nested owner not sized by its
    /// parent yet is pulled towards zero.
    fn owner_edits(&self, owner: WidgetId) -> Result<Vec<Edit>, LayoutError> {
        let layout = self.layout(owner)?;
        let strength = self.config.size_strength;
        let size = layout
            .known_size
            .or_else(|| (!self.is_top_level(owner)).then_some(Size::new(0.0, 0.0)));
        Ok(size
            .map(|size| {
                vec![
                    Edit {
                        variable: layout.symbols.width(),
                        value: size.width,
                        strength,
                    },
                    Edit {
                        variable: layout.symbols.height(),
                        value: size.height,
                        strength,
                    },
                ]
            })
            .unwrap_or_default())
    }

    /// Solves the boundary owned by the layout owner of `widget` right away.
    ///
    /// # Errors
    ///
    /// Returns the reason the boundary could not be solved. Geometry is then
    /// left exactly as it was.
    pub fn solve(&mut self, widget: WidgetId) -> Result<(), LayoutError> {
        let owner = self.layout_owner(widget)?;
        self.solve_boundary(owner)
    }

    pub(super) fn solve_boundary(&mut self, owner: WidgetId) -> Result<(), LayoutError> {
        let members = self.members(owner);
        let constraints = self.aggregate(owner, &members)?;
        let edits = self.owner_edits(owner)?;

        let mut solver = self.layout_mut(owner)?.solver.take().unwrap_or_default();
        let outcome = match solver.update(&constraints, &edits) {
            Ok(stats) => {
                tracing::debug!(
                    %owner,
                    members = members.len(),
                    added = stats.added,
                    removed = stats.removed,
                    installed = stats.installed,
                    "boundary solved"
                );
                let rects = self.solved_rects(owner, &members, |variable| solver.value(variable));
                Ok((rects, self.measure_contents(owner, &mut solver)))
            }
            Err(SolveFailure::Unsatisfiable(rejected)) => Err(LayoutError::Unsatisfiable {
                boundary: owner,
                constraints: rejected.iter().map(ToString::to_string).collect(),
            }),
            Err(SolveFailure::Internal(message)) => Err(LayoutError::Solver {
                boundary: owner,
                message,
            }),
        };
        self.layout_mut(owner)?.solver = Some(solver);

        let (rects, contents) = outcome?;
        self.release_shared_solvers(owner, &members);
        self.apply_rects(&members, &rects);
        if let Some(contents) = contents {
            self.publish_contents(owner, contents);
        }
        Ok(())
    }

    /// The smallest size a nested container's contents fit in. `None` for
    /// top-level owners, whose solved size is already their own.
    fn measure_contents(&self, owner: WidgetId, solver: &mut BoundarySolver) -> Option<Size> {
        if self.kind(owner) != Some(WidgetKind::Container) || self.is_top_level(owner) {
            return None;
        }
        let symbols = &self.layout(owner).ok()?.symbols;
        match solver.minimum(&[symbols.width(), symbols.height()]).as_deref() {
            Ok(&[width, height]) => Some(Size::new(width, height)),
            Ok(_) => None,
            Err(failure) => {
                tracing::warn!(%owner, ?failure, "could not measure container contents");
                None
            }
        }
    }

    /// Hands the measured contents of `container` to the boundary it is an
    /// opaque member of.
    fn publish_contents(&mut self, container: WidgetId, contents: Size) {
        let Ok(layout) = self.layout_mut(container) else {
            return;
        };
        if layout
            .content_size
            .is_some_and(|previous| same_size(previous, contents))
        {
            return;
        }
        layout.content_size = Some(contents);
        tracing::debug!(widget = %container, ?contents, "container contents resized");
        if let Some(parent) = self.parent(container) {
            self.request(parent);
        }
    }

    /// Parent-relative rectangles of the members. The owner keeps its
    /// position, and only a top-level owner takes its solved size.
    fn solved_rects(
        &self,
        owner: WidgetId,
        members: &[Member],
        value: impl Fn(ConstraintVariable) -> f64,
    ) -> Vec<(WidgetId, Rect)> {
        let mut origins: HashMap<WidgetId, (f64, f64)> = HashMap::with_capacity(members.len());
        let mut rects = Vec::with_capacity(members.len());
        for member in members {
            let Ok(layout) = self.layout(member.id) else {
                continue;
            };
            let symbols = &layout.symbols;
            let (left, top) = (value(symbols.left()), value(symbols.top()));
            let (width, height) = (value(symbols.width()), value(symbols.height()));
            origins.insert(member.id, (left, top));

            let rect = if member.id == owner {
                if self.is_top_level(owner) {
                    Rect::new(layout.geometry.x, layout.geometry.y, width, height)
                } else {
                    layout.geometry
                }
            } else {
                let (x, y) = self
                    .parent(member.id)
                    .and_then(|parent| origins.get(&parent).copied())
                    .unwrap_or_default();
                Rect::new(left - x, top - y, width, height)
            };
            rects.push((member.id, rect));
        }
        rects
    }

    /// Sharing containers are solved by their owner from now on.
    fn release_shared_solvers(&mut self, owner: WidgetId, members: &[Member]) {
        for member in members.iter().filter(|member| member.id != owner && !member.opaque) {
            if let Ok(layout) = self.layout_mut(member.id) {
                layout.content_size = None;
                if layout.solver.take().is_some() {
                    tracing::debug!(
                        widget = %member.id,
                        %owner,
                        "solver released to sharing owner"
                    );
                }
            }
        }
    }

    fn apply_rects(&mut self, members: &[Member], rects: &[(WidgetId, Rect)]) {
        let opaque: HashSet<WidgetId> = members
            .iter()
            .filter(|member| member.opaque)
            .map(|member| member.id)
            .collect();
        let mut resized = Vec::new();

        for &(widget, rect) in rects {
            let Ok(layout) = self.layout_mut(widget) else {
                continue;
            };
            if layout.geometry != rect {
                tracing::trace!(%widget, ?rect, "geometry updated");
            }
            layout.geometry = rect;
            if opaque.contains(&widget) && layout.known_size != Some(rect.size()) {
                layout.known_size = Some(rect.size());
                resized.push(widget);
            }
        }

        for &(widget, rect) in rects {
            if let Some(proxy) = self
                .layout_mut(widget)
                .ok()
                .and_then(|layout| layout.proxy.as_mut())
            {
                proxy.apply_geometry(rect);
                proxy.relayout();
            }
        }

        for widget in resized {
            self.request(widget);
        }
    }
}
