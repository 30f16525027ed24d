//! Turning constraints lists into primitive constraints.

use alloc::vec::Vec;

use crate::{Constraint, ConstraintContext, ConstraintItem, ConstraintTypeError, WidgetId};

/// Collects the primitive constraints of `widget`.
///
/// The user list is used if it is non-empty, the widget's default constraints
/// otherwise. Component constraints are always appended. Helpers are expanded
/// against `ctx`, skipped entries are dropped.
///
/// # Errors
///
/// Returns [`ConstraintTypeError`] if a helper rejects its arguments, if
/// helpers nest deeper than [`ConstraintContext::max_expansion_depth`], if a
/// constraint contains a non-finite number or if its weight is not positive.
pub fn collect(
    ctx: &dyn ConstraintContext,
    widget: WidgetId,
) -> Result<Vec<Constraint>, ConstraintTypeError> {
    let mut items = ctx.constraints(widget);
    if items.is_empty() {
        items = ctx.default_constraints(widget);
    }
    items.extend(ctx.component_constraints(widget));
    expand(ctx, widget, items)
}

/// Expands `items`, declared on `owner`, into primitive constraints.
///
/// # Errors
///
/// See [`collect`].
pub fn expand(
    ctx: &dyn ConstraintContext,
    owner: WidgetId,
    items: impl IntoIterator<Item = ConstraintItem>,
) -> Result<Vec<Constraint>, ConstraintTypeError> {
    let mut output = Vec::new();
    for item in items {
        expand_into(ctx, owner, item, 0, &mut output)?;
    }
    Ok(output)
}

fn expand_into(
    ctx: &dyn ConstraintContext,
    owner: WidgetId,
    item: ConstraintItem,
    depth: usize,
    output: &mut Vec<Constraint>,
) -> Result<(), ConstraintTypeError> {
    match item {
        ConstraintItem::Skip => Ok(()),
        ConstraintItem::Constraint(constraint) => {
            if !constraint.is_finite() {
                return Err(ConstraintTypeError::new(
                    owner,
                    &constraint,
                    "constraints must only contain finite numbers",
                ));
            }
            if !constraint.has_positive_weight() {
                return Err(ConstraintTypeError::new(
                    owner,
                    &constraint,
                    "constraint weights must be positive",
                ));
            }
            output.push(constraint);
            Ok(())
        }
        ConstraintItem::Helper(helper) => {
            if depth >= ctx.max_expansion_depth() {
                return Err(ConstraintTypeError::new(
                    owner,
                    alloc::format!("{helper:?}"),
                    "helpers are nested too deeply",
                ));
            }
            for nested in helper.expand(owner, ctx)? {
                expand_into(ctx, owner, nested, depth + 1, output)?;
            }
            Ok(())
        }
    }
}
