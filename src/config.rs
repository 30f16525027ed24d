//! Tunables of the layout engine.

use serde::{Deserialize, Serialize};

use crate::{Padding, Strength};

/// Settings shared by every widget of a [`LayoutTree`](crate::LayoutTree).
///
/// Missing fields fall back to their defaults when deserialized:
///
/// ```rust
/// use undertow::LayoutConfig;
///
/// let config = LayoutConfig::from_json(r#"{ "default_spacing": 4.0 }"#).unwrap();
/// assert_eq!(config.default_spacing, 4.0);
/// assert_eq!(config.max_expansion_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Padding given to new containers.
    pub default_padding: Padding,
    /// Gap between consecutive items of a box helper.
    pub default_spacing: f64,
    /// Maximum nesting of constraint helpers.
    pub max_expansion_depth: usize,
    /// Strength with which a boundary owner is held at its externally given
    /// size. Must not be required.
    pub size_strength: Strength,
    /// How many update cycles [`flush`](crate::LayoutTree::flush) runs before
    /// giving up on reaching a quiescent tree.
    pub max_flush_cycles: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_padding: Padding::default(),
            default_spacing: undertow_layout::DEFAULT_SPACING,
            max_expansion_depth: undertow_layout::DEFAULT_MAX_DEPTH,
            size_strength: Strength::Strong,
            max_flush_cycles: 16,
        }
    }
}

impl LayoutConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid JSON, does not match
    /// the configuration schema, or asks for a required size strength.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.size_strength.is_required() {
            return Err(ConfigError::RequiredSizeStrength);
        }
        Ok(config)
    }

    /// Sets [`default_padding`](Self::default_padding).
    #[must_use]
    pub const fn with_default_padding(mut self, padding: Padding) -> Self {
        self.default_padding = padding;
        self
    }

    /// Sets [`default_spacing`](Self::default_spacing).
    #[must_use]
    pub const fn with_default_spacing(mut self, spacing: f64) -> Self {
        self.default_spacing = spacing;
        self
    }

    /// Sets [`max_expansion_depth`](Self::max_expansion_depth).
    #[must_use]
    pub const fn with_max_expansion_depth(mut self, depth: usize) -> Self {
        self.max_expansion_depth = depth;
        self
    }

    /// Sets [`size_strength`](Self::size_strength). Required is clamped to
    /// strong.
    #[must_use]
    pub const fn with_size_strength(mut self, strength: Strength) -> Self {
        self.size_strength = match strength {
            Strength::Required => Strength::Strong,
            other => other,
        };
        self
    }

    /// Sets [`max_flush_cycles`](Self::max_flush_cycles).
    #[must_use]
    pub const fn with_max_flush_cycles(mut self, cycles: usize) -> Self {
        self.max_flush_cycles = cycles;
        self
    }
}

/// Failure to load a [`LayoutConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The text is not a valid configuration.
    #[error("invalid layout configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Owners cannot be pinned to their size with a required constraint.
    #[error("size_strength cannot be `required`")]
    RequiredSizeStrength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_container_defaults() {
        let config = LayoutConfig::default();

        assert_eq!(config.default_padding, Padding::uniform(10.0));
        assert_eq!(config.default_spacing, 10.0);
        assert_eq!(config.size_strength, Strength::Strong);
    }

    #[test]
    fn parses_partial_json() {
        let config = LayoutConfig::from_json(
            r#"{
                "default_padding": { "top": 1.0, "right": 2.0, "bottom": 3.0, "left": 4.0 },
                "size_strength": "medium"
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_padding, Padding::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(config.size_strength, Strength::Medium);
        assert_eq!(config.max_flush_cycles, 16);
    }

    #[test]
    fn rejects_required_size_strength() {
        let error = LayoutConfig::from_json(r#"{ "size_strength": "required" }"#).unwrap_err();

        assert!(matches!(error, ConfigError::RequiredSizeStrength));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            LayoutConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn builder_clamps_required_strength() {
        let config = LayoutConfig::default().with_size_strength(Strength::Required);

        assert_eq!(config.size_strength, Strength::Strong);
    }
}
