//! Dock area layouts and their validation.
//!
//! A dock layout arranges named dock items in nested splits and tab groups.
//! Layouts are checked against the items actually present before they are
//! applied; a layout raising warnings is rejected and the area keeps the one
//! it had.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Direction in which a split lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Side by side.
    Horizontal,
    /// Stacked.
    Vertical,
}

/// The arrangement of a dock area.
///
/// Saved layouts are JSON documents tagged by `kind`:
///
/// ```rust
/// use undertow::DockLayout;
///
/// let layout = DockLayout::hsplit([
///     DockLayout::item("files"),
///     DockLayout::tabbed(["log", "shell"]),
/// ]);
/// let json = serde_json::to_string(&layout).unwrap();
/// assert!(json.starts_with(r#"{"kind":"split","orientation":"horizontal""#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DockLayout {
    /// A single dock item.
    Item {
        /// Name of the item.
        name: String,
    },
    /// Children laid out next to each other.
    Split {
        /// Direction of the split.
        orientation: Orientation,
        /// The children, in order.
        items: Vec<DockLayout>,
    },
    /// Items sharing one area, one tab each.
    Tabbed {
        /// Names of the items, in tab order.
        items: Vec<String>,
    },
}

impl DockLayout {
    /// A single item.
    pub fn item(name: impl Into<String>) -> Self {
        Self::Item { name: name.into() }
    }

    /// A horizontal split.
    pub fn hsplit(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Split {
            orientation: Orientation::Horizontal,
            items: items.into_iter().collect(),
        }
    }

    /// A vertical split.
    pub fn vsplit(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Split {
            orientation: Orientation::Vertical,
            items: items.into_iter().collect(),
        }
    }

    /// A tab group.
    pub fn tabbed<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::Tabbed {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Names of every item referenced, depth first.
    #[must_use]
    pub fn item_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.visit_names(&mut names);
        names
    }

    fn visit_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Item { name } => names.push(name),
            Self::Split { items, .. } => {
                for item in items {
                    item.visit_names(names);
                }
            }
            Self::Tabbed { items } => names.extend(items.iter().map(String::as_str)),
        }
    }
}

impl fmt::Display for DockLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item { name } => write!(f, "'{name}'"),
            Self::Split { orientation, items } => {
                let prefix = match orientation {
                    Orientation::Horizontal => "hsplit",
                    Orientation::Vertical => "vsplit",
                };
                write!(f, "{prefix}(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Tabbed { items } => {
                f.write_str("tabbed(")?;
                for (index, name) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{name}'")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A reason a dock layout cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DockLayoutWarning {
    /// The layout names an item the area does not have.
    #[error("dock layout references unknown item `{0}`")]
    UnknownItem(String),
    /// The layout places the same item twice.
    #[error("dock item `{0}` appears more than once in the layout")]
    DuplicateItem(String),
    /// A split or tab group has no children.
    #[error("dock layout contains an empty {0}")]
    EmptyContainer(&'static str),
    /// A saved layout could not be read.
    #[error("saved dock layout is malformed: {0}")]
    Malformed(String),
}

/// Checks `layout` against the names of the items present.
///
/// Validation has no side effects; an empty result means the layout can be
/// applied.
pub fn validate<S: AsRef<str>>(layout: &DockLayout, known: &[S]) -> Vec<DockLayoutWarning> {
    let known: HashSet<&str> = known.iter().map(|name| name.as_ref()).collect();
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    validate_into(layout, &known, &mut seen, &mut warnings);
    warnings
}

fn validate_into<'a>(
    layout: &'a DockLayout,
    known: &HashSet<&str>,
    seen: &mut HashSet<&'a str>,
    warnings: &mut Vec<DockLayoutWarning>,
) {
    match layout {
        DockLayout::Item { name } => check_name(name, known, seen, warnings),
        DockLayout::Tabbed { items } => {
            if items.is_empty() {
                warnings.push(DockLayoutWarning::EmptyContainer("tab group"));
            }
            for name in items {
                check_name(name, known, seen, warnings);
            }
        }
        DockLayout::Split { items, .. } => {
            if items.is_empty() {
                warnings.push(DockLayoutWarning::EmptyContainer("split"));
            }
            for item in items {
                validate_into(item, known, seen, warnings);
            }
        }
    }
}

fn check_name<'a>(
    name: &'a str,
    known: &HashSet<&str>,
    seen: &mut HashSet<&'a str>,
    warnings: &mut Vec<DockLayoutWarning>,
) {
    if !known.contains(name) {
        warnings.push(DockLayoutWarning::UnknownItem(name.to_string()));
    } else if !seen.insert(name) {
        warnings.push(DockLayoutWarning::DuplicateItem(name.to_string()));
    }
}

/// A set of named dock items and their current arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockArea {
    items: Vec<String>,
    layout: DockLayout,
}

impl DockArea {
    /// Creates an area stacking `items` vertically, in order.
    pub fn new<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let layout = DockLayout::vsplit(items.iter().cloned().map(DockLayout::item));
        Self { items, layout }
    }

    /// Names of the items of the area.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The layout currently applied.
    #[must_use]
    pub const fn layout(&self) -> &DockLayout {
        &self.layout
    }

    /// Adds an item. Returns `false` if an item of that name exists.
    ///
    /// The current layout is left alone; the item is placed by the next
    /// layout that names it.
    pub fn add_item(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.items.contains(&name) {
            return false;
        }
        self.items.push(name);
        true
    }

    /// Applies `layout` if it is valid.
    ///
    /// Otherwise every warning is logged, returned, and the previous layout
    /// stays in place.
    pub fn set_layout(&mut self, layout: DockLayout) -> Vec<DockLayoutWarning> {
        let warnings = validate(&layout, &self.items);
        if warnings.is_empty() {
            tracing::debug!(%layout, "dock layout applied");
            self.layout = layout;
        } else {
            for warning in &warnings {
                tracing::warn!(%warning, %layout, "dock layout rejected");
            }
        }
        warnings
    }

    /// The current layout as JSON.
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn save(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.layout)
    }

    /// Applies a layout produced by [`save`](Self::save).
    pub fn restore(&mut self, saved: &str) -> Vec<DockLayoutWarning> {
        match serde_json::from_str::<DockLayout>(saved) {
            Ok(layout) => self.set_layout(layout),
            Err(error) => {
                let warning = DockLayoutWarning::Malformed(error.to_string());
                tracing::warn!(%warning, "dock layout rejected");
                alloc::vec![warning]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> DockArea {
        let mut area = DockArea::new(["item1", "item2"]);
        let warnings = area.set_layout(DockLayout::vsplit([
            DockLayout::item("item1"),
            DockLayout::item("item2"),
        ]));
        assert!(warnings.is_empty());
        area
    }

    #[test]
    fn valid_layout_is_applied_silently() {
        let mut area = area();
        let layout = DockLayout::hsplit([DockLayout::item("item1"), DockLayout::item("item2")]);

        assert!(area.set_layout(layout.clone()).is_empty());
        assert_eq!(area.layout(), &layout);
    }

    #[test]
    fn unknown_item_warns_and_keeps_layout() {
        let mut area = area();
        let before = area.clone();

        let warnings = area.set_layout(DockLayout::hsplit([
            DockLayout::item("item1"),
            DockLayout::item("item2"),
            DockLayout::item("item3"),
        ]));

        assert_eq!(warnings, vec![DockLayoutWarning::UnknownItem("item3".into())]);
        assert_eq!(area, before);
    }

    #[test]
    fn duplicates_and_empty_groups_are_reported() {
        let layout = DockLayout::vsplit([
            DockLayout::tabbed(["a", "b"]),
            DockLayout::item("a"),
            DockLayout::hsplit([]),
        ]);

        let warnings = validate(&layout, &["a", "b"]);

        assert_eq!(
            warnings,
            vec![
                DockLayoutWarning::DuplicateItem("a".into()),
                DockLayoutWarning::EmptyContainer("split"),
            ]
        );
    }

    #[test]
    fn validation_does_not_touch_its_inputs() {
        let layout = DockLayout::hsplit([DockLayout::item("x")]);
        let known = ["y".to_string()];

        let first = validate(&layout, &known);
        let second = validate(&layout, &known);

        assert_eq!(first, second);
        assert_eq!(layout, DockLayout::hsplit([DockLayout::item("x")]));
    }

    #[test]
    fn saved_layouts_restore() {
        let mut area = area();
        area.set_layout(DockLayout::tabbed(["item2", "item1"]));
        let saved = area.save().unwrap();

        let mut other = DockArea::new(["item1", "item2"]);
        assert!(other.restore(&saved).is_empty());
        assert_eq!(other.layout(), &DockLayout::tabbed(["item2", "item1"]));
    }

    #[test]
    fn malformed_saves_are_rejected() {
        let mut area = area();
        let before = area.layout().clone();

        let warnings = area.restore(r#"{"kind":"spiral"}"#);

        assert!(matches!(warnings.as_slice(), [DockLayoutWarning::Malformed(_)]));
        assert_eq!(area.layout(), &before);
    }

    #[test]
    fn layouts_display_like_their_constructors() {
        let layout = DockLayout::hsplit([DockLayout::item("a"), DockLayout::tabbed(["b", "c"])]);
        assert_eq!(layout.to_string(), "hsplit('a', tabbed('b', 'c'))");
        assert_eq!(layout.item_names(), vec!["a", "b", "c"]);
    }
}
