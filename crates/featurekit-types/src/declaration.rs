//! Hierarchy declaration file format.
//!
//! A declaration file describes capability modules by their property schema
//! and a set of host classes with their provisions and overrides. Classes
//! reference their parent by name and may appear in any order.
//!
//! Provisions and overrides inside one class are keyed tables that keep
//! their document order, so a loaded class resolves (and dispatches) its
//! features in the order the file declares them.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::feature::{FeatureOverride, OverridePatch, PropertyPatch};
use crate::property::PropertyDescriptor;

/// Root of a declaration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HierarchyFile {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleDecl>,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

/// A module known only by its declared schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ModuleDecl {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescriptor>,
    /// Config keys that must be present in the merged config at construction.
    #[serde(default)]
    pub required_config: Vec<String>,
}

/// One host class.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescriptor>,
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, ProvisionDecl>")]
    pub provides: NamedEntries<ProvisionDecl>,
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, OverrideDecl>")]
    pub overrides: NamedEntries<OverrideDecl>,
}

/// A keyed table that keeps its entries in document order.
///
/// Serialized as a map. Repeating a key is a parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntries<T>(Vec<(String, T)>);

impl<T> NamedEntries<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry, replacing the value in place when `name` exists.
    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.0.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for NamedEntries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<&str> for NamedEntries<T> {
    type Output = T;

    fn index(&self, name: &str) -> &T {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no entry named '{name}'"),
        }
    }
}

impl<T> FromIterator<(String, T)> for NamedEntries<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut entries = Self::new();
        for (name, value) in iter {
            entries.insert(name, value);
        }
        entries
    }
}

impl<T: Serialize> Serialize for NamedEntries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NamedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = NamedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of named entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, T>()? {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate entry '{name}'"
                        )));
                    }
                    entries.push((name, value));
                }
                Ok(NamedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProvisionDecl {
    /// Name of the module implementing the feature.
    pub module: String,
    #[serde(default)]
    pub default_config: Map<String, Value>,
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisabledMarker {
    Disabled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisableMarker {
    Disable,
}

/// `"disabled"` or a patch table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OverrideDecl {
    Disabled(DisabledMarker),
    Patch(OverridePatchDecl),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OverridePatchDecl {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyPatchDecl>,
}

/// `"disable"` or a replacement descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PropertyPatchDecl {
    Disable(DisableMarker),
    Replace(PropertyDescriptor),
}

impl From<PropertyPatchDecl> for PropertyPatch {
    fn from(decl: PropertyPatchDecl) -> Self {
        match decl {
            PropertyPatchDecl::Disable(_) => Self::Disable,
            PropertyPatchDecl::Replace(descriptor) => Self::Replace(descriptor),
        }
    }
}

impl From<OverrideDecl> for FeatureOverride {
    fn from(decl: OverrideDecl) -> Self {
        match decl {
            OverrideDecl::Disabled(_) => Self::Disabled,
            OverrideDecl::Patch(patch) => Self::Patch(OverridePatch {
                enabled: patch.enabled,
                config: patch.config,
                properties: patch
                    .properties
                    .into_iter()
                    .map(|(name, patch)| (name, patch.into()))
                    .collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyKind;
    use serde_json::json;

    const SAMPLE: &str = r#"
[modules.layout]
description = "layout"
[modules.layout.properties.layout]
kind = "string"
reflect = true
initial = "classic"

[modules.focus.properties.focused]
kind = "boolean"

[[classes]]
name = "Root"
[classes.provides.layout]
module = "layout"
default_config = { layout = "classic" }

[[classes]]
name = "Mid"
extends = "Root"
[classes.provides.focus]
module = "focus"
enabled_by_default = false

[[classes]]
name = "Leaf"
extends = "Mid"
[classes.overrides]
focus = { enabled = true }
layout = { properties = { layout = "disable" } }
ghost = "disabled"
"#;

    #[test]
    fn test_parse_toml_hierarchy() {
        let file: HierarchyFile = toml::from_str(SAMPLE).unwrap();

        assert_eq!(file.modules.len(), 2);
        assert_eq!(
            file.modules["layout"].properties["layout"].kind,
            PropertyKind::String
        );
        assert_eq!(file.classes.len(), 3);

        let root = &file.classes[0];
        assert_eq!(root.provides["layout"].default_config["layout"], json!("classic"));
        assert!(root.provides["layout"].enabled_by_default);

        let mid = &file.classes[1];
        assert_eq!(mid.extends.as_deref(), Some("Root"));
        assert!(!mid.provides["focus"].enabled_by_default);
    }

    #[test]
    fn test_override_decl_converts_sentinels() {
        let file: HierarchyFile = toml::from_str(SAMPLE).unwrap();
        let leaf = &file.classes[2];

        let ghost: FeatureOverride = leaf.overrides["ghost"].clone().into();
        assert!(ghost.is_disabled());

        let focus: FeatureOverride = leaf.overrides["focus"].clone().into();
        assert_eq!(focus.patch().and_then(|p| p.enabled), Some(true));

        let layout: FeatureOverride = leaf.overrides["layout"].clone().into();
        let patch = layout.patch().unwrap();
        assert!(patch.properties["layout"].is_disable());
    }

    #[test]
    fn test_provides_keep_document_order() {
        let file: HierarchyFile = toml::from_str(
            r#"
[[classes]]
name = "Root"
[classes.provides.zoom]
module = "zoom"
[classes.provides.anchor]
module = "anchor"
[classes.provides.menu]
module = "menu"
"#,
        )
        .unwrap();

        let names: Vec<_> = file.classes[0].provides.names().collect();
        assert_eq!(names, vec!["zoom", "anchor", "menu"]);

        let yaml = "classes:\n  - name: Root\n    overrides:\n      zoom: disabled\n      anchor: disabled\n";
        let file: HierarchyFile = serde_yaml_ng::from_str(yaml).unwrap();
        let names: Vec<_> = file.classes[0].overrides.names().collect();
        assert_eq!(names, vec!["zoom", "anchor"]);
    }

    #[test]
    fn test_named_entries_reject_duplicate_keys() {
        let yaml = "classes:\n  - name: Root\n    overrides:\n      zoom: disabled\n      zoom: disabled\n";
        let err = serde_yaml_ng::from_str::<HierarchyFile>(yaml).unwrap_err();
        assert!(err.to_string().contains("zoom"));
    }

    #[test]
    fn test_named_entries_serialize_as_map() {
        let entries: NamedEntries<u32> =
            [("b".to_string(), 1), ("a".to_string(), 2)].into_iter().collect();
        assert_eq!(serde_json::to_string(&entries).unwrap(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_parse_yaml_property_replacement() {
        let yaml = r#"
classes:
  - name: Button
    overrides:
      ripple:
        config:
          color: red
        properties:
          pressed:
            kind: boolean
            reflect: true
"#;
        let file: HierarchyFile = serde_yaml_ng::from_str(yaml).unwrap();
        let ov: FeatureOverride = file.classes[0].overrides["ripple"].clone().into();
        let patch = ov.patch().unwrap();
        assert_eq!(patch.config["color"], json!("red"));
        match &patch.properties["pressed"] {
            PropertyPatch::Replace(desc) => {
                assert_eq!(desc.kind, PropertyKind::Boolean);
                assert!(desc.reflect);
            }
            other => panic!("expected replacement, got {other:?}"),
        }
    }
}
