//! Widget arena tests: structure, ownership and the constraint context.

use super::*;
use crate::{Constraint, Relation, Strength, collect};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A container root with `leaves` constrained children, all queued work done.
fn stack(leaves: usize) -> (LayoutTree, WidgetId, Vec<WidgetId>) {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    let children = (0..leaves)
        .map(|_| tree.insert_child(root, WidgetKind::Constrained).unwrap())
        .collect();
    tree.flush();
    (tree, root, children)
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_insert_links_parent_and_children() {
    let (tree, root, children) = stack(2);

    assert_eq!(tree.children(root), children.as_slice());
    assert_eq!(tree.parent(children[0]), Some(root));
    assert_eq!(tree.parent(root), None);
    assert_eq!(tree.kind(children[1]), Some(WidgetKind::Constrained));
}

#[test]
fn test_unknown_parent_is_rejected() {
    let mut tree = LayoutTree::new();
    let missing = WidgetId::new(42);

    assert_eq!(
        tree.insert_child(missing, WidgetKind::Constrained),
        Err(LayoutError::UnknownWidget(missing))
    );
}

#[test]
fn test_remove_drops_the_whole_subtree() {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    let inner = tree.insert_child(root, WidgetKind::Container).unwrap();
    let leaf = tree.insert_child(inner, WidgetKind::Constrained).unwrap();

    tree.remove(inner).unwrap();

    assert!(tree.children(root).is_empty());
    assert!(!tree.contains(inner));
    assert!(!tree.contains(leaf));
    assert!(!tree.is_active(leaf));
    assert_eq!(tree.geometry(leaf), None);
    assert_eq!(tree.remove(leaf), Err(LayoutError::UnknownWidget(leaf)));
}

#[test]
fn test_plain_widgets_have_no_layout_state() {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    let plain = tree.insert_child(root, WidgetKind::Plain).unwrap();

    assert!(tree.props(plain).is_none());
    assert!(tree.symbols(plain).is_none());
    assert_eq!(
        tree.layout_owner(plain),
        Err(LayoutError::NotConstrainable(plain))
    );
    assert_eq!(
        tree.set_size_hint(plain, None),
        Err(LayoutError::NotConstrainable(plain))
    );
}

#[test]
fn test_new_widgets_inherit_inactivity() {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    tree.deactivate(root).unwrap();

    let leaf = tree.insert_child(root, WidgetKind::Constrained).unwrap();
    assert!(!tree.is_active(leaf));

    tree.activate(root).unwrap();
    assert!(tree.is_active(leaf));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_container_and_leaf_defaults() {
    let (tree, root, children) = stack(1);

    assert_eq!(tree.policy(root), Some(StrengthPolicy::CONTAINER));
    assert_eq!(tree.policy(children[0]), Some(StrengthPolicy::default()));

    let props = tree.props(root).unwrap();
    assert!(!props.is_sharing());
    assert_eq!(props.current_padding(), Some(Padding::uniform(10.0)));
    assert!(tree.props(children[0]).unwrap().padding().is_none());
}

#[test]
fn test_leaves_cannot_share_or_pad() {
    let (tree, _, children) = stack(1);
    let leaf = children[0];

    assert_eq!(
        tree.set_share_layout(leaf, true),
        Err(LayoutError::NotAContainer(leaf))
    );
    assert_eq!(
        tree.set_padding(leaf, Padding::ZERO),
        Err(LayoutError::NotAContainer(leaf))
    );
}

#[test]
fn test_set_policy_updates_all_four_strengths() {
    let (tree, _, children) = stack(1);
    let policy = StrengthPolicy::uniform(Strength::Weak, Strength::Medium);

    tree.set_policy(children[0], policy).unwrap();

    assert_eq!(tree.policy(children[0]), Some(policy));
}

// ============================================================================
// Ownership
// ============================================================================

#[test]
fn test_leaves_belong_to_their_container() {
    let (tree, root, children) = stack(2);

    assert_eq!(tree.layout_owner(children[0]), Ok(root));
    assert_eq!(tree.layout_owner(root), Ok(root));
}

#[test]
fn test_leaves_outside_containers_own_themselves() {
    let mut tree = LayoutTree::new();
    let window = tree.insert_root(WidgetKind::Plain);
    let leaf = tree.insert_child(window, WidgetKind::Constrained).unwrap();

    assert_eq!(tree.layout_owner(leaf), Ok(leaf));
}

#[test]
fn test_sharing_is_followed_to_the_outermost_container() {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    let outer = tree.insert_child(root, WidgetKind::Container).unwrap();
    let inner = tree.insert_child(outer, WidgetKind::Container).unwrap();
    let leaf = tree.insert_child(inner, WidgetKind::Constrained).unwrap();

    assert_eq!(tree.layout_owner(leaf), Ok(inner));

    tree.set_share_layout(inner, true).unwrap();
    assert_eq!(tree.layout_owner(leaf), Ok(outer));

    tree.set_share_layout(outer, true).unwrap();
    assert_eq!(tree.layout_owner(leaf), Ok(root));
    assert_eq!(tree.layout_owner(inner), Ok(root));
}

#[test]
fn test_sharing_root_still_owns_itself() {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    tree.set_share_layout(root, true).unwrap();

    assert_eq!(tree.layout_owner(root), Ok(root));
}

// ============================================================================
// Constraint Context
// ============================================================================

#[test]
fn test_default_stack_skips_plain_children() {
    let mut tree = LayoutTree::new();
    let root = tree.insert_root(WidgetKind::Container);
    let first = tree.insert_child(root, WidgetKind::Constrained).unwrap();
    let plain = tree.insert_child(root, WidgetKind::Plain).unwrap();
    let second = tree.insert_child(root, WidgetKind::Constrained).unwrap();

    assert_eq!(tree.default_constraints(root).len(), 1);
    assert!(tree.default_constraints(first).is_empty());

    let constraints = collect(&tree, root).unwrap();
    let owners: Vec<WidgetId> = constraints
        .iter()
        .flat_map(Constraint::variables)
        .map(|variable| variable.owner())
        .collect();
    assert!(owners.contains(&first));
    assert!(owners.contains(&second));
    assert!(!owners.contains(&plain));
}

#[test]
fn test_user_constraints_replace_the_default_stack() {
    let (tree, root, children) = stack(2);
    let symbols = tree.symbols(root).unwrap().clone();

    tree.set_constraints(root, [symbols.width().equal_to(300.0).into()])
        .unwrap();

    let constraints = collect(&tree, root).unwrap();
    // The user constraint plus the two padding minimums.
    assert_eq!(constraints.len(), 3);
    assert!(
        constraints
            .iter()
            .flat_map(Constraint::variables)
            .all(|variable| variable.owner() == root)
    );
    assert_eq!(children.len(), 2);
}

#[test]
fn test_component_constraints_follow_padding() {
    let (tree, root, _) = stack(0);
    tree.set_padding(root, Padding::new(1.0, 2.0, 3.0, 4.0)).unwrap();

    let components = tree.component_constraints(root);
    let symbols = tree.symbols(root).unwrap();

    assert_eq!(components.len(), 2);
    assert!(matches!(
        &components[0],
        ConstraintItem::Constraint(c) if *c == symbols.width().at_least(6.0)
    ));
    assert!(matches!(
        &components[1],
        ConstraintItem::Constraint(c)
            if *c == symbols.height().at_least(4.0) && c.relation() == Relation::Ge
    ));
}

#[test]
fn test_contents_track_current_padding() {
    let (tree, root, _) = stack(0);
    assert!(tree.contents(root).is_some());

    tree.set_padding(root, Padding::uniform(3.0)).unwrap();
    let contents = tree.contents(root).unwrap();
    let symbols = tree.symbols(root).unwrap();

    assert_eq!(contents.width(), symbols.width() - 6.0);
}

// ============================================================================
// Scheduling Hooks
// ============================================================================

#[test]
fn test_constrained_children_invalidate_their_container() {
    let (mut tree, root, _) = stack(0);
    assert!(!tree.scheduler().is_pending(root));

    tree.insert_child(root, WidgetKind::Plain).unwrap();
    assert!(!tree.scheduler().is_pending(root));

    tree.insert_child(root, WidgetKind::Constrained).unwrap();
    assert!(tree.scheduler().is_pending(root));
}

#[test]
fn test_removing_a_child_invalidates_its_container() {
    let (mut tree, root, children) = stack(2);

    tree.remove(children[0]).unwrap();

    assert!(tree.scheduler().is_pending(root));
}

#[test]
fn test_property_writes_request_a_relayout() {
    let (tree, _, children) = stack(1);
    let leaf = children[0];

    tree.set_size_hint(leaf, Some(Size::new(5.0, 5.0))).unwrap();

    assert!(tree.scheduler().is_pending(leaf));
    assert_eq!(tree.relayout(leaf), Ok(false));
}

#[test]
fn test_relayout_of_unknown_widget_fails() {
    let tree = LayoutTree::new();
    let missing = WidgetId::new(3);

    assert_eq!(tree.relayout(missing), Err(LayoutError::UnknownWidget(missing)));
}
