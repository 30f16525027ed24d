//! Size-hint constraints and the strengths that bias them.

use alloc::vec::Vec;

use crate::{Constraint, ExpressionExt, Size, Strength, Symbols};

/// How strongly a widget holds on to its size hint.
///
/// *Hugging* keeps a widget from growing past its hint, *resisting* keeps it
/// from shrinking below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrengthPolicy {
    /// Strength of `width == hint.width`.
    pub hug_width: Strength,
    /// Strength of `height == hint.height`.
    pub hug_height: Strength,
    /// Strength of `width >= hint.width`.
    pub resist_width: Strength,
    /// Strength of `height >= hint.height`.
    pub resist_height: Strength,
}

impl Default for StrengthPolicy {
    fn default() -> Self {
        Self::uniform(Strength::Strong, Strength::Strong)
    }
}

impl StrengthPolicy {
    /// The policy of containers: free to grow, reluctant to shrink.
    pub const CONTAINER: Self = Self::uniform(Strength::Ignore, Strength::Strong);

    /// The same hugging and resisting on both axes.
    #[must_use]
    pub const fn uniform(hug: Strength, resist: Strength) -> Self {
        Self {
            hug_width: hug,
            hug_height: hug,
            resist_width: resist,
            resist_height: resist,
        }
    }

    /// The constraints expressing `hint` for `symbols`.
    ///
    /// Constraints at [`Strength::Ignore`] are left out.
    #[must_use]
    pub fn constraints(&self, symbols: &Symbols, hint: Size) -> Vec<Constraint> {
        [
            (symbols.width().equal_to(hint.width), self.hug_width),
            (symbols.height().equal_to(hint.height), self.hug_height),
            (symbols.width().at_least(hint.width), self.resist_width),
            (symbols.height().at_least(hint.height), self.resist_height),
        ]
        .into_iter()
        .filter(|(_, strength)| *strength != Strength::Ignore)
        .map(|(constraint, strength)| constraint.with_strength(strength))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Relation, WidgetId};

    #[test]
    fn default_policy_hugs_and_resists() {
        let symbols = Symbols::new(WidgetId::new(1));
        let constraints = StrengthPolicy::default().constraints(&symbols, Size::new(100.0, 20.0));

        assert_eq!(constraints.len(), 4);
        assert!(constraints.iter().all(|c| c.strength() == Strength::Strong));
    }

    #[test]
    fn containers_only_resist() {
        let symbols = Symbols::new(WidgetId::new(1));
        let constraints = StrengthPolicy::CONTAINER.constraints(&symbols, Size::new(100.0, 20.0));

        assert_eq!(constraints.len(), 2);
        assert!(constraints.iter().all(|c| c.relation() == Relation::Ge));
    }

    #[test]
    fn mixed_strengths_are_kept_per_constraint() {
        let symbols = Symbols::new(WidgetId::new(1));
        let policy = StrengthPolicy {
            hug_width: Strength::Weak,
            hug_height: Strength::Ignore,
            resist_width: Strength::Required,
            resist_height: Strength::Medium,
        };

        let constraints = policy.constraints(&symbols, Size::new(10.0, 5.0));

        assert_eq!(
            constraints,
            vec![
                symbols.width().equal_to(10.0).with_strength(Strength::Weak),
                symbols.width().at_least(10.0),
                symbols.height().at_least(5.0).with_strength(Strength::Medium),
            ]
        );
    }
}
