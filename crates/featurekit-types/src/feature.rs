//! Feature override types.
//!
//! A class may override any feature it (or an ancestor) provides: disable it
//! outright, patch its configuration, toggle its enabled state, or patch the
//! set of properties its module contributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::property::PropertyDescriptor;

/// Opaque, deep-mergeable key-value configuration.
pub type ConfigBag = Map<String, Value>;

/// Per-property change applied to a module's declared schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PropertyPatch {
    /// Strip the property from the published schema.
    Disable,
    /// Replace the module's descriptor, or add a new property.
    Replace(PropertyDescriptor),
}

impl PropertyPatch {
    pub fn is_disable(&self) -> bool {
        matches!(self, Self::Disable)
    }
}

/// The patch half of an override entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverridePatch {
    /// Explicit enable/disable toggle; `None` keeps the provision's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: ConfigBag,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyPatch>,
}

impl OverridePatch {
    pub fn enable() -> Self {
        Self {
            enabled: Some(true),
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_config(mut self, config: ConfigBag) -> Self {
        self.config = config;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, patch: PropertyPatch) -> Self {
        self.properties.insert(name.into(), patch);
        self
    }

    pub fn disable_property(self, name: impl Into<String>) -> Self {
        self.with_property(name, PropertyPatch::Disable)
    }
}

/// A class-level override for one feature name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FeatureOverride {
    /// Terminal disable: no ancestor declaration can re-enable the feature.
    Disabled,
    Patch(OverridePatch),
}

impl FeatureOverride {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn patch(&self) -> Option<&OverridePatch> {
        match self {
            Self::Disabled => None,
            Self::Patch(patch) => Some(patch),
        }
    }
}

impl From<OverridePatch> for FeatureOverride {
    fn from(patch: OverridePatch) -> Self {
        Self::Patch(patch)
    }
}

impl fmt::Display for FeatureOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Patch(patch) => {
                let mut parts = Vec::new();
                if let Some(enabled) = patch.enabled {
                    parts.push(format!("enabled={enabled}"));
                }
                if !patch.config.is_empty() {
                    parts.push(format!("config[{}]", patch.config.len()));
                }
                if !patch.properties.is_empty() {
                    parts.push(format!("properties[{}]", patch.properties.len()));
                }
                if parts.is_empty() {
                    write!(f, "patch")
                } else {
                    write!(f, "patch({})", parts.join(", "))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_override_display() {
        assert_eq!(FeatureOverride::Disabled.to_string(), "disabled");

        let patch = OverridePatch::enable().disable_property("p");
        assert_eq!(
            FeatureOverride::from(patch).to_string(),
            "patch(enabled=true, properties[1])"
        );

        let empty = FeatureOverride::Patch(OverridePatch::default());
        assert_eq!(empty.to_string(), "patch");
    }

    #[test]
    fn test_patch_builders() {
        let mut config = ConfigBag::new();
        config.insert("b".to_string(), json!(3));

        let patch = OverridePatch::default()
            .with_enabled(false)
            .with_config(config)
            .disable_property("p");

        assert_eq!(patch.enabled, Some(false));
        assert_eq!(patch.config.get("b"), Some(&json!(3)));
        assert!(patch.properties["p"].is_disable());
    }

    #[test]
    fn test_disabled_has_no_patch() {
        assert!(FeatureOverride::Disabled.patch().is_none());
        assert!(FeatureOverride::Disabled.is_disabled());
    }
}
