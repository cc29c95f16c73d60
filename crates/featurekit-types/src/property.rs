//! Reactive property descriptors.
//!
//! A capability module declares the properties it contributes to its host as
//! a [`PropertySchema`]. The host publishes the union of its own schema and
//! every enabled module's (patched) schema to its reactive-property system.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property name -> descriptor. Ordered so published schemas are reproducible.
pub type PropertySchema = BTreeMap<String, PropertyDescriptor>;

/// The value type a reactive property holds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
    #[default]
    Any,
}

impl PropertyKind {
    /// Whether `value` is acceptable for a property of this kind.
    ///
    /// `null` is accepted for every kind (an unset property).
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (Self::Any, _) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Object, Value::Object(_)) => true,
            (Self::Array, Value::Array(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Object => write!(f, "object"),
            Self::Array => write!(f, "array"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Declaration of a single reactive property.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PropertyDescriptor {
    #[serde(default)]
    pub kind: PropertyKind,
    /// Mirror the value to a host attribute.
    #[serde(default)]
    pub reflect: bool,
    /// Attribute name when it differs from the property name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Value seeded onto the host before the module is first used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn reflected(mut self) -> Self {
        self.reflect = true;
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_initial(mut self, initial: Value) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Who a published property belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "owner", content = "feature", rename_all = "snake_case")]
pub enum PropertyOwner {
    /// Declared directly on the host class.
    Host,
    /// Contributed by the named feature's module.
    Feature(String),
}

impl fmt::Display for PropertyOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Feature(name) => write!(f, "feature:{name}"),
        }
    }
}

/// An entry of a class's published schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishedProperty {
    pub descriptor: PropertyDescriptor,
    pub owner: PropertyOwner,
}
