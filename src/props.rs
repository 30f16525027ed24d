//! Reactive layout properties.
//!
//! Every property is a `nami` [`Binding`]. The tree registers a watcher on
//! each of them that asks the scheduler for a relayout of the owning widget,
//! so writing a binding is all it takes to invalidate a layout.

use alloc::{rc::Rc, vec::Vec};
use core::{cell::Cell, fmt};

use nami::{Binding, Signal};

use crate::{ConstraintItem, LayoutScheduler, Liveness, Padding, Size, Strength, WidgetId};

/// Requests a relayout of one widget.
#[derive(Debug, Clone)]
pub(crate) struct RelayoutTrigger {
    scheduler: LayoutScheduler,
    widget: WidgetId,
    liveness: Liveness,
}

impl RelayoutTrigger {
    pub(crate) const fn new(
        scheduler: LayoutScheduler,
        widget: WidgetId,
        liveness: Liveness,
    ) -> Self {
        Self {
            scheduler,
            widget,
            liveness,
        }
    }

    fn fire(&self) {
        self.scheduler.relayout(self.widget, &self.liveness);
    }
}

/// A binding together with the watcher that invalidates its widget.
struct Property<T: Clone + 'static> {
    binding: Binding<T>,
    _guard: <Binding<T> as Signal>::Guard,
}

impl<T: Clone + 'static> Property<T> {
    fn new(value: T, trigger: &RelayoutTrigger) -> Self {
        let binding = Binding::container(value);

        // Some bindings report their current value while the watcher is being
        // installed; that is not a change.
        let is_setting_up = Rc::new(Cell::new(true));
        let guard = {
            let is_setting_up = is_setting_up.clone();
            let trigger = trigger.clone();
            binding.watch(move |_| {
                if is_setting_up.get() {
                    return;
                }
                trigger.fire();
            })
        };
        is_setting_up.set(false);

        Self {
            binding,
            _guard: guard,
        }
    }
}

/// The observable layout state of a constrained widget.
pub struct LayoutProperties {
    constraints: Property<Vec<ConstraintItem>>,
    hug_width: Property<Strength>,
    hug_height: Property<Strength>,
    resist_width: Property<Strength>,
    resist_height: Property<Strength>,
    size_hint: Property<Option<Size>>,
    container: Option<ContainerProperties>,
}

/// The observable state specific to containers.
struct ContainerProperties {
    share_layout: Property<bool>,
    padding: Property<Padding>,
}

/// Initial values of [`LayoutProperties`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PropertyDefaults {
    pub hug: Strength,
    pub resist: Strength,
    pub padding: Option<Padding>,
}

impl LayoutProperties {
    pub(crate) fn new(defaults: PropertyDefaults, trigger: &RelayoutTrigger) -> Self {
        Self {
            constraints: Property::new(Vec::new(), trigger),
            hug_width: Property::new(defaults.hug, trigger),
            hug_height: Property::new(defaults.hug, trigger),
            resist_width: Property::new(defaults.resist, trigger),
            resist_height: Property::new(defaults.resist, trigger),
            size_hint: Property::new(None, trigger),
            container: defaults.padding.map(|padding| ContainerProperties {
                share_layout: Property::new(false, trigger),
                padding: Property::new(padding, trigger),
            }),
        }
    }

    /// The user constraints list. Empty means "use the defaults".
    #[must_use]
    pub const fn constraints(&self) -> &Binding<Vec<ConstraintItem>> {
        &self.constraints.binding
    }

    /// How strongly the widget keeps its hinted width.
    #[must_use]
    pub const fn hug_width(&self) -> &Binding<Strength> {
        &self.hug_width.binding
    }

    /// How strongly the widget keeps its hinted height.
    #[must_use]
    pub const fn hug_height(&self) -> &Binding<Strength> {
        &self.hug_height.binding
    }

    /// How strongly the widget resists shrinking below its hinted width.
    #[must_use]
    pub const fn resist_width(&self) -> &Binding<Strength> {
        &self.resist_width.binding
    }

    /// How strongly the widget resists shrinking below its hinted height.
    #[must_use]
    pub const fn resist_height(&self) -> &Binding<Strength> {
        &self.resist_height.binding
    }

    /// The natural size reported by the backend, if any.
    #[must_use]
    pub const fn size_hint(&self) -> &Binding<Option<Size>> {
        &self.size_hint.binding
    }

    /// Whether a container joins the layout of its parent container.
    /// `None` for widgets that are not containers.
    #[must_use]
    pub fn share_layout(&self) -> Option<&Binding<bool>> {
        self.container
            .as_ref()
            .map(|container| &container.share_layout.binding)
    }

    /// The padding of a container. `None` for widgets that are not
    /// containers.
    #[must_use]
    pub fn padding(&self) -> Option<&Binding<Padding>> {
        self.container
            .as_ref()
            .map(|container| &container.padding.binding)
    }

    /// Current value of [`share_layout`](Self::share_layout), `false` for
    /// non-containers.
    #[must_use]
    pub fn is_sharing(&self) -> bool {
        self.share_layout().is_some_and(|binding| binding.get())
    }

    /// Current padding, `None` for non-containers.
    #[must_use]
    pub fn current_padding(&self) -> Option<Padding> {
        self.padding().map(|binding| binding.get())
    }
}

impl fmt::Debug for LayoutProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LayoutProperties");
        debug
            .field("constraints", &self.constraints().get())
            .field("hug_width", &self.hug_width().get())
            .field("hug_height", &self.hug_height().get())
            .field("resist_width", &self.resist_width().get())
            .field("resist_height", &self.resist_height().get())
            .field("size_hint", &self.size_hint().get());
        if let Some(container) = &self.container {
            debug
                .field("share_layout", &container.share_layout.binding.get())
                .field("padding", &container.padding.binding.get());
        }
        debug.finish()
    }
}
