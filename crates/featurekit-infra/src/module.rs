//! Modules defined entirely by a declaration file.
//!
//! A [`DeclaredModule`] publishes the schema its `[modules.*]` entry lists,
//! checks the merged config for required keys, and handles no hooks. Hosts
//! composed from declaration files therefore exercise resolution, schema
//! publication, and initial value seeding without any compiled module code.

use std::any::Any;

use featurekit_core::module::{CapabilityModule, ModuleContext, ModuleFactory};
use featurekit_types::declaration::ModuleDecl;
use featurekit_types::error::ModuleError;
use featurekit_types::feature::ConfigBag;
use featurekit_types::property::PropertySchema;

#[derive(Debug, Clone)]
pub struct DeclaredModule {
    name: String,
    decl: ModuleDecl,
}

impl DeclaredModule {
    pub fn new(name: impl Into<String>, decl: ModuleDecl) -> Self {
        Self {
            name: name.into(),
            decl,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.decl.description.as_deref()
    }
}

impl ModuleFactory for DeclaredModule {
    fn module_id(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> PropertySchema {
        self.decl.properties.clone()
    }

    fn create(
        &self,
        ctx: &mut ModuleContext<'_>,
    ) -> Result<Box<dyn CapabilityModule>, ModuleError> {
        for key in &self.decl.required_config {
            if ctx.config_value(key).is_none() {
                return Err(ModuleError::InvalidConfig {
                    key: key.clone(),
                    reason: format!("required by module '{}'", self.name),
                });
            }
        }

        Ok(Box::new(DeclaredInstance {
            module: self.name.clone(),
            feature: ctx.feature().to_string(),
            config: ctx.config().clone(),
        }))
    }
}

/// Instance of a [`DeclaredModule`] bound to one host.
#[derive(Debug, Clone)]
pub struct DeclaredInstance {
    pub module: String,
    pub feature: String,
    pub config: ConfigBag,
}

impl CapabilityModule for DeclaredInstance {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
