//! Instance composition.
//!
//! Builds one module per enabled feature of a resolved class, in
//! first-resolution order. That order is the dispatch order for the host's
//! whole lifetime.

use uuid::Uuid;

use featurekit_types::error::FeatureError;
use featurekit_types::property::PropertyOwner;

use crate::host::PropertyStore;
use crate::module::{CapabilityModule, ModuleContext};
use crate::resolved::ResolvedClass;

/// A constructed module bound to one host.
#[derive(Debug)]
pub struct ModuleInstance {
    pub name: String,
    pub module_id: String,
    pub module: Box<dyn CapabilityModule>,
}

/// Construct the modules of every enabled feature of `resolved`.
///
/// Before each module is constructed, the initial values of the properties
/// its feature owns are seeded onto `properties` unless a value is already
/// present. A constructor failure aborts composition; modules built before
/// it are dropped with the returned error.
pub fn compose_modules(
    host_id: Uuid,
    resolved: &ResolvedClass,
    properties: &mut PropertyStore,
) -> Result<Vec<ModuleInstance>, FeatureError> {
    let mut instances = Vec::new();

    for feature in resolved.features.enabled() {
        let name = feature.name();

        for (property, published) in &resolved.schema {
            let owned = matches!(&published.owner, PropertyOwner::Feature(owner) if owner == name);
            if !owned || properties.get(property).is_some() {
                continue;
            }
            if let Some(initial) = &published.descriptor.initial {
                properties.set(property, initial.clone());
            }
        }

        let mut ctx = ModuleContext {
            host_id,
            class: &resolved.class,
            feature: name,
            config: &feature.config,
            published: &resolved.schema,
            properties: &mut *properties,
        };

        let module = feature
            .provision
            .factory
            .create(&mut ctx)
            .map_err(|source| FeatureError::Construction {
                feature: name.to_string(),
                source,
            })?;

        tracing::trace!(feature = %name, module = %feature.module_id(), "Module constructed");

        instances.push(ModuleInstance {
            name: name.to_string(),
            module_id: feature.module_id().to_string(),
            module,
        });
    }

    Ok(instances)
}
