//! Lifecycle dispatch.

use serde_json::Value;

use featurekit_types::error::FeatureError;
use featurekit_types::lifecycle::Hook;

use crate::compose::ModuleInstance;
use crate::host::PropertyStore;
use crate::module::HookContext;
use crate::resolved::PublishedSchema;

/// Shared state every hook of one dispatch call sees.
pub struct DispatchTarget<'a> {
    pub class: &'a str,
    pub published: &'a PublishedSchema,
    pub properties: &'a mut PropertyStore,
}

/// Invoke `hook` on every module that supports it, in composition order.
///
/// Modules that do not support the hook are skipped. The first failing hook
/// aborts the rest of the call; the failing module stays in place for later
/// calls. Returns the number of modules invoked.
pub fn dispatch(
    modules: &mut [ModuleInstance],
    mut target: DispatchTarget<'_>,
    hook: Hook,
    args: &[Value],
) -> Result<usize, FeatureError> {
    let mut invoked = 0;

    for instance in modules.iter_mut() {
        if !instance.module.supports(hook) {
            tracing::trace!(feature = %instance.name, %hook, "Hook not supported, skipping");
            continue;
        }

        let mut ctx = HookContext {
            hook,
            args,
            class: target.class,
            feature: &instance.name,
            published: target.published,
            properties: &mut *target.properties,
        };

        instance
            .module
            .on_hook(hook, &mut ctx)
            .map_err(|source| FeatureError::Hook {
                feature: instance.name.clone(),
                hook,
                source,
            })?;
        invoked += 1;
    }

    Ok(invoked)
}
