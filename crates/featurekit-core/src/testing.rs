//! Test doubles shared by the unit tests of this crate.

use std::any::Any;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use featurekit_types::error::{HookError, ModuleError};
use featurekit_types::feature::ConfigBag;
use featurekit_types::lifecycle::Hook;
use featurekit_types::property::{PropertyDescriptor, PropertySchema};

use crate::module::{CapabilityModule, HookContext, ModuleContext, ModuleFactory};

/// Shared, ordered record of constructions and hook calls.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub fn config(value: Value) -> ConfigBag {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Factory whose modules log every call as `new:{feature}` and
/// `{hook}:{feature}`.
#[derive(Debug, Clone)]
pub struct RecordingFactory {
    id: String,
    log: EventLog,
    schema: PropertySchema,
    hooks: Vec<Hook>,
    fail_create: bool,
    fail_on: Option<Hook>,
    writes: Vec<(Hook, String, Value)>,
}

impl RecordingFactory {
    pub fn new(id: &str, log: &EventLog) -> Self {
        Self {
            id: id.to_string(),
            log: log.clone(),
            schema: PropertySchema::new(),
            hooks: Vec::new(),
            fail_create: false,
            fail_on: None,
            writes: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: &str, descriptor: PropertyDescriptor) -> Self {
        self.schema.insert(name.to_string(), descriptor);
        self
    }

    pub fn with_hooks(mut self, hooks: &[Hook]) -> Self {
        self.hooks.extend_from_slice(hooks);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_on(mut self, hook: Hook) -> Self {
        if !self.hooks.contains(&hook) {
            self.hooks.push(hook);
        }
        self.fail_on = Some(hook);
        self
    }

    /// Write `value` to `property` whenever `hook` runs.
    pub fn writes_on(mut self, hook: Hook, property: &str, value: Value) -> Self {
        if !self.hooks.contains(&hook) {
            self.hooks.push(hook);
        }
        self.writes.push((hook, property.to_string(), value));
        self
    }

    pub fn into_arc(self) -> Arc<dyn ModuleFactory> {
        Arc::new(self)
    }
}

impl ModuleFactory for RecordingFactory {
    fn module_id(&self) -> &str {
        &self.id
    }

    fn schema(&self) -> PropertySchema {
        self.schema.clone()
    }

    fn create(
        &self,
        ctx: &mut ModuleContext<'_>,
    ) -> Result<Box<dyn CapabilityModule>, ModuleError> {
        if self.fail_create {
            return Err(ModuleError::Failed(format!("{} refused", ctx.feature())));
        }
        self.log.push(format!("new:{}", ctx.feature()));
        Ok(Box::new(RecordingModule {
            feature: ctx.feature().to_string(),
            config: ctx.config().clone(),
            log: self.log.clone(),
            hooks: self.hooks.clone(),
            fail_on: self.fail_on,
            writes: self.writes.clone(),
            calls: 0,
        }))
    }
}

#[derive(Debug)]
pub struct RecordingModule {
    pub feature: String,
    pub config: ConfigBag,
    log: EventLog,
    hooks: Vec<Hook>,
    fail_on: Option<Hook>,
    writes: Vec<(Hook, String, Value)>,
    pub calls: usize,
}

impl CapabilityModule for RecordingModule {
    fn supports(&self, hook: Hook) -> bool {
        self.hooks.contains(&hook)
    }

    fn on_hook(&mut self, hook: Hook, ctx: &mut HookContext<'_>) -> Result<(), HookError> {
        self.calls += 1;
        self.log.push(format!("{hook}:{}", self.feature));
        for (on, property, value) in &self.writes {
            if *on == hook {
                ctx.set_property(property, value.clone())?;
            }
        }
        if self.fail_on == Some(hook) {
            return Err(HookError::Failed(format!("{hook} broke")));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
