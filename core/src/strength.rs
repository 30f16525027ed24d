//! Constraint strengths and their solver weights.

use core::{fmt, str::FromStr};

/// Priority of a constraint, from `Ignore` (never enforced) to `Required`.
///
/// The ordering of the variants is the ordering of the strengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strength {
    /// The constraint is dropped before solving.
    Ignore,
    /// Satisfied only when nothing else cares.
    Weak,
    /// Between weak and strong.
    Medium,
    /// The default for size-hint policies.
    #[default]
    Strong,
    /// Must hold exactly, or the solve fails.
    Required,
}

impl Strength {
    /// Every strength, weakest first.
    pub const ALL: [Self; 5] = [
        Self::Ignore,
        Self::Weak,
        Self::Medium,
        Self::Strong,
        Self::Required,
    ];

    /// The nominal solver weight of the strength.
    ///
    /// `Required` maps to infinity: it is a hard constraint rather than a
    /// weighted preference.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Ignore => 0.0,
            Self::Weak => 1.0,
            Self::Medium => 1e3,
            Self::Strong => 1e6,
            Self::Required => f64::INFINITY,
        }
    }

    /// Whether constraints of this strength must hold exactly.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }

    /// The lowercase name of the strength.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
            Self::Required => "required",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown strength name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strength `{name}`, expected one of ignore, weak, medium, strong or required")]
pub struct ParseStrengthError {
    name: alloc::string::String,
}

impl FromStr for Strength {
    type Err = ParseStrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strength| strength.name() == s)
            .ok_or_else(|| ParseStrengthError { name: s.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_monotonic() {
        for pair in Strength::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].weight() < pair[1].weight());
        }
    }

    #[test]
    fn default_is_strong() {
        assert_eq!(Strength::default(), Strength::Strong);
    }

    #[test]
    fn parses_names() {
        assert_eq!("medium".parse::<Strength>(), Ok(Strength::Medium));
        assert!("sturdy".parse::<Strength>().is_err());
        for strength in Strength::ALL {
            assert_eq!(strength.name().parse::<Strength>(), Ok(strength));
        }
    }
}
