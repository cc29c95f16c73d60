//! Composed hosts.
//!
//! A [`Host`] owns the module instances built for it and the mirror of its
//! reactive property values. Nothing in a host is shared with another host.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use featurekit_types::error::{FeatureError, HookError};
use featurekit_types::lifecycle::{Hook, LifecycleEvent};
use featurekit_types::property::PropertyOwner;

use crate::class::HostClass;
use crate::compose::{compose_modules, ModuleInstance};
use crate::dispatch::{dispatch, DispatchTarget};
use crate::module::{check_kind, CapabilityModule};
use crate::resolved::ResolvedClass;

/// Host-side mirror of reactive property values.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: BTreeMap<String, Value>,
    changed: BTreeSet<String>,
}

impl PropertyStore {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Store a value and mark the property changed when the value differs.
    pub fn set(&mut self, name: &str, value: Value) {
        if self.values.get(name) == Some(&value) {
            return;
        }
        self.values.insert(name.to_string(), value);
        self.changed.insert(name.to_string());
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn is_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    /// Drain the names changed since the last drain, in name order.
    pub fn take_changed(&mut self) -> Vec<String> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }
}

/// A composed object: one instance of a registered host class.
#[derive(Debug)]
pub struct Host {
    id: Uuid,
    class: Arc<HostClass>,
    resolved: Arc<ResolvedClass>,
    properties: PropertyStore,
    modules: Vec<ModuleInstance>,
}

impl Host {
    /// Build a host of an already resolved class.
    ///
    /// Host-declared initial values are seeded first, then each enabled
    /// feature's module is constructed in first-resolution order.
    pub(crate) fn compose(
        class: Arc<HostClass>,
        resolved: Arc<ResolvedClass>,
    ) -> Result<Self, FeatureError> {
        let id = Uuid::now_v7();
        let mut properties = PropertyStore::default();

        for (name, published) in &resolved.schema {
            if published.owner != PropertyOwner::Host {
                continue;
            }
            if let Some(initial) = &published.descriptor.initial {
                properties.set(name, initial.clone());
            }
        }

        let modules = compose_modules(id, &resolved, &mut properties)?;

        Ok(Self {
            id,
            class,
            resolved,
            properties,
            modules,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn class(&self) -> &Arc<HostClass> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn resolved(&self) -> &ResolvedClass {
        &self.resolved
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Write a property the host class declares itself.
    ///
    /// Properties contributed by features are written by their modules only.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), HookError> {
        let published = self
            .resolved
            .schema
            .get(name)
            .ok_or_else(|| HookError::UnknownProperty(name.to_string()))?;

        match &published.owner {
            PropertyOwner::Host => {
                check_kind(published, name, &value)?;
                self.properties.set(name, value);
                Ok(())
            }
            PropertyOwner::Feature(feature) => Err(HookError::NotOwner {
                property: name.to_string(),
                feature: feature.clone(),
            }),
        }
    }

    pub fn module_instance(&self, name: &str) -> Option<&dyn CapabilityModule> {
        let instance = self.modules.iter().find(|m| m.name == name)?;
        Some(instance.module.as_ref())
    }

    pub fn module_instance_mut(&mut self, name: &str) -> Option<&mut dyn CapabilityModule> {
        let instance = self.modules.iter_mut().find(|m| m.name == name)?;
        Some(instance.module.as_mut())
    }

    /// Typed access to a feature's module.
    pub fn module_as<T: CapabilityModule>(&self, name: &str) -> Option<&T> {
        self.module_instance(name)?.as_any().downcast_ref::<T>()
    }

    pub fn module_as_mut<T: CapabilityModule>(&mut self, name: &str) -> Option<&mut T> {
        self.module_instance_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// Feature names of the composed modules, in dispatch order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Invoke a single hook on every module supporting it.
    pub fn dispatch(&mut self, hook: impl Into<Hook>, args: &[Value]) -> Result<usize, FeatureError> {
        let target = DispatchTarget {
            class: self.class.name(),
            published: &self.resolved.schema,
            properties: &mut self.properties,
        };
        dispatch(&mut self.modules, target, hook.into(), args)
    }

    /// Run one lifecycle event: before hooks, then the host's own handling,
    /// then the event hooks, then the after hooks.
    pub fn run_lifecycle<F>(
        &mut self,
        event: LifecycleEvent,
        args: &[Value],
        own: F,
    ) -> Result<(), FeatureError>
    where
        F: FnOnce(&mut PropertyStore) -> Result<(), HookError>,
    {
        let _span = tracing::debug_span!("lifecycle", class = %self.class.name(), %event).entered();

        self.dispatch(Hook::before(event), args)?;
        own(&mut self.properties).map_err(|source| FeatureError::HostHandler {
            hook: Hook::on(event),
            source,
        })?;
        self.dispatch(Hook::on(event), args)?;
        self.dispatch(Hook::after(event), args)?;
        Ok(())
    }

    pub fn connect(&mut self) -> Result<(), FeatureError> {
        self.run_lifecycle(LifecycleEvent::Connected, &[], |_| Ok(()))
    }

    pub fn disconnect(&mut self) -> Result<(), FeatureError> {
        self.run_lifecycle(LifecycleEvent::Disconnected, &[], |_| Ok(()))
    }

    /// Drain the changed property names and run `Updated` with them as the
    /// first argument, followed by `extra`.
    pub fn updated(&mut self, extra: &[Value]) -> Result<Vec<String>, FeatureError> {
        let changed = self.properties.take_changed();
        let mut args = Vec::with_capacity(extra.len() + 1);
        args.push(Value::from(changed.clone()));
        args.extend_from_slice(extra);
        self.run_lifecycle(LifecycleEvent::Updated, &args, |_| Ok(()))?;
        Ok(changed)
    }
}
