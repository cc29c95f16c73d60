//! Capability module contract.
//!
//! A feature is implemented by a [`ModuleFactory`] that declares the
//! properties it contributes and builds one [`CapabilityModule`] per host.
//! Modules advertise the hooks they handle through
//! [`CapabilityModule::supports`]; the dispatcher never calls a hook a module
//! did not ask for.

use std::any::Any;
use std::fmt;

use serde_json::Value;
use uuid::Uuid;

use featurekit_types::error::{HookError, ModuleError};
use featurekit_types::feature::ConfigBag;
use featurekit_types::lifecycle::Hook;
use featurekit_types::property::{PropertyOwner, PropertySchema, PublishedProperty};

use crate::host::PropertyStore;
use crate::resolved::PublishedSchema;

/// Builds capability modules for hosts.
pub trait ModuleFactory: Send + Sync + fmt::Debug {
    /// Identity of the implementing module. Two provisions backed by the
    /// same id may contribute the same property without conflict.
    fn module_id(&self) -> &str;

    /// Properties every instance of this module contributes to its host.
    fn schema(&self) -> PropertySchema {
        PropertySchema::new()
    }

    /// Construct the module bound to one host with its merged config.
    fn create(&self, ctx: &mut ModuleContext<'_>)
    -> Result<Box<dyn CapabilityModule>, ModuleError>;
}

/// A module instance owned by exactly one host.
pub trait CapabilityModule: Any + Send + fmt::Debug {
    /// Whether this module handles `hook`. Unsupported hooks are skipped.
    fn supports(&self, _hook: Hook) -> bool {
        false
    }

    fn on_hook(&mut self, _hook: Hook, _ctx: &mut HookContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Helper to allow downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Everything a module constructor receives: the host it binds to and the
/// feature's merged config.
pub struct ModuleContext<'a> {
    pub(crate) host_id: Uuid,
    pub(crate) class: &'a str,
    pub(crate) feature: &'a str,
    pub(crate) config: &'a ConfigBag,
    pub(crate) published: &'a PublishedSchema,
    pub(crate) properties: &'a mut PropertyStore,
}

impl<'a> ModuleContext<'a> {
    pub fn host_id(&self) -> Uuid {
        self.host_id
    }

    pub fn class_name(&self) -> &str {
        self.class
    }

    pub fn feature(&self) -> &str {
        self.feature
    }

    pub fn config(&self) -> &ConfigBag {
        self.config
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Write one of this feature's own properties onto the host.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), HookError> {
        write_owned(self.published, self.properties, self.feature, name, value)
    }
}

/// What a hook sees while it runs.
pub struct HookContext<'a> {
    pub(crate) hook: Hook,
    pub(crate) args: &'a [Value],
    pub(crate) class: &'a str,
    pub(crate) feature: &'a str,
    pub(crate) published: &'a PublishedSchema,
    pub(crate) properties: &'a mut PropertyStore,
}

impl<'a> HookContext<'a> {
    pub fn hook(&self) -> Hook {
        self.hook
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub fn class_name(&self) -> &str {
        self.class
    }

    pub fn feature(&self) -> &str {
        self.feature
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Mirror a new value of one of this feature's properties onto the host.
    ///
    /// The module stays the source of truth for the properties it owns, so
    /// writes to host-owned or other features' properties are rejected.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), HookError> {
        write_owned(self.published, self.properties, self.feature, name, value)
    }
}

fn write_owned(
    published: &PublishedSchema,
    properties: &mut PropertyStore,
    feature: &str,
    name: &str,
    value: Value,
) -> Result<(), HookError> {
    let entry = published
        .get(name)
        .ok_or_else(|| HookError::UnknownProperty(name.to_string()))?;

    match &entry.owner {
        PropertyOwner::Feature(owner) if owner == feature => {
            check_kind(entry, name, &value)?;
            properties.set(name, value);
            Ok(())
        }
        _ => Err(HookError::NotOwner {
            property: name.to_string(),
            feature: feature.to_string(),
        }),
    }
}

pub(crate) fn check_kind(
    entry: &PublishedProperty,
    name: &str,
    value: &Value,
) -> Result<(), HookError> {
    if entry.descriptor.kind.accepts(value) {
        Ok(())
    } else {
        Err(HookError::KindMismatch {
            property: name.to_string(),
            expected: entry.descriptor.kind,
        })
    }
}
