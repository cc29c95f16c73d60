//! Class registration and host composition entry point.
//!
//! [`FeatureManager::register`] is the only place a class's resolution is
//! computed and cached. Everything downstream (schema publication, module
//! composition, dispatch) reads the cached [`ResolvedClass`].

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use featurekit_types::config::EngineConfig;
use featurekit_types::error::{Diagnostic, FeatureError};
use featurekit_types::feature::FeatureOverride;

use crate::class::HostClass;
use crate::host::Host;
use crate::merge::merged;
use crate::overrides::resolve_overrides;
use crate::provision::resolve_provisions;
use crate::resolved::{ResolvedClass, ResolvedFeature, ResolvedFeatureSet};
use crate::schema::{collect_schema, inherited_properties, patch_schema};

/// Registers host classes and composes hosts from them.
#[derive(Debug, Default)]
pub struct FeatureManager {
    config: EngineConfig,
    classes: DashMap<String, Arc<HostClass>>,
}

impl FeatureManager {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            classes: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a class once and cache the result on its descriptor.
    ///
    /// Repeat calls return the cached resolution, checked against this
    /// manager's config since another manager may have produced it. On error
    /// nothing is cached and the class stays unregistered with this manager.
    pub fn register(&self, class: &Arc<HostClass>) -> Result<Arc<ResolvedClass>, FeatureError> {
        if let Some(resolved) = class.resolved() {
            let resolved = Arc::clone(resolved);
            self.admit(&resolved)?;
            self.index(class)?;
            return Ok(resolved);
        }

        let _span = tracing::info_span!("register", class = %class.name()).entered();

        let resolved = self.resolve(class)?;
        self.index(class)?;
        let cached = class.cache_resolution(Arc::new(resolved));

        tracing::debug!(
            features = cached.features.len(),
            enabled = cached.features.enabled().count(),
            properties = cached.schema.len(),
            "Class registered"
        );

        Ok(cached)
    }

    /// Register `class` if needed, then build a host of it.
    pub fn compose(&self, class: &Arc<HostClass>) -> Result<Host, FeatureError> {
        let resolved = self.register(class)?;

        let _span = tracing::info_span!("compose", class = %class.name()).entered();
        let host = Host::compose(Arc::clone(class), resolved)?;
        tracing::debug!(
            host_id = %host.id(),
            modules = host.module_count(),
            "Host composed"
        );

        Ok(host)
    }

    /// Compose a host of a class registered earlier.
    pub fn compose_by_name(&self, name: &str) -> Result<Host, FeatureError> {
        let class = self
            .class(name)
            .ok_or_else(|| FeatureError::UnknownClass(name.to_string()))?;
        self.compose(&class)
    }

    pub fn class(&self, name: &str) -> Option<Arc<HostClass>> {
        self.classes.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of registered classes, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Apply the depth limit and strict override policy to a resolution
    /// cached by an earlier registration.
    fn admit(&self, resolved: &ResolvedClass) -> Result<(), FeatureError> {
        let max = self.config.max_chain_depth;
        if resolved.chain.len() > max {
            return Err(FeatureError::ChainTooDeep {
                class: resolved.class.clone(),
                max,
            });
        }

        match resolved.diagnostics.first() {
            Some(Diagnostic::MissingModule { feature, .. }) if self.config.strict_overrides => {
                Err(FeatureError::MissingModule {
                    class: resolved.class.clone(),
                    feature: feature.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Index `class` by name. A name already taken by another class is an error.
    fn index(&self, class: &Arc<HostClass>) -> Result<(), FeatureError> {
        match self.classes.entry(class.name().to_string()) {
            Entry::Occupied(entry) if !Arc::ptr_eq(entry.get(), class) => {
                tracing::warn!(class = %class.name(), "Class name already registered by another class");
                Err(FeatureError::DuplicateClass(class.name().to_string()))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(class));
                Ok(())
            }
        }
    }

    fn resolve(&self, class: &HostClass) -> Result<ResolvedClass, FeatureError> {
        let max = self.config.max_chain_depth;
        let chain: Vec<&HostClass> = class.chain().take(max + 1).collect();
        if chain.len() > max {
            return Err(FeatureError::ChainTooDeep {
                class: class.name().to_string(),
                max,
            });
        }

        let provisions = resolve_provisions(chain.iter().copied());
        let mut overrides = resolve_overrides(chain.iter().copied());

        let mut diagnostics = Vec::new();
        for (feature, effective) in &overrides {
            if provisions.iter().any(|p| &p.name == feature) {
                continue;
            }
            if self.config.strict_overrides {
                return Err(FeatureError::MissingModule {
                    class: class.name().to_string(),
                    feature: feature.clone(),
                });
            }
            tracing::warn!(
                class = %class.name(),
                feature = %feature,
                declared_by = %effective.declared_by,
                "Override targets a feature no class in the chain provides"
            );
            diagnostics.push(Diagnostic::MissingModule {
                class: class.name().to_string(),
                feature: feature.clone(),
                declared_by: effective.declared_by.clone(),
            });
        }

        let mut features = ResolvedFeatureSet::default();
        for provision in provisions {
            let effective = overrides.remove(&provision.name);
            let patch = effective.as_ref().and_then(|e| e.entry.patch());

            let enabled = match effective.as_ref().map(|e| &e.entry) {
                Some(FeatureOverride::Disabled) => false,
                Some(FeatureOverride::Patch(p)) => p.enabled.unwrap_or(provision.enabled_by_default),
                None => provision.enabled_by_default,
            };
            let config = match patch {
                Some(p) => merged(&provision.default_config, &p.config),
                None => provision.default_config.clone(),
            };
            let schema = patch_schema(provision.factory.schema(), patch);

            tracing::trace!(
                feature = %provision.name,
                declared_by = %provision.declared_by,
                enabled,
                "Feature resolved"
            );

            let (override_entry, override_declared_by) = match effective {
                Some(e) => (Some(e.entry), Some(e.declared_by)),
                None => (None, None),
            };

            features.push(ResolvedFeature {
                provision,
                override_entry,
                override_declared_by,
                enabled,
                config,
                schema,
            });
        }

        let host_properties = inherited_properties(chain.iter().copied());
        let schema = collect_schema(class.name(), &host_properties, &features)?;

        Ok(ResolvedClass {
            class: class.name().to_string(),
            chain: chain.iter().map(|c| c.name().to_string()).collect(),
            features,
            schema,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Provision;
    use crate::testing::{config, EventLog, RecordingFactory, RecordingModule};
    use featurekit_types::feature::OverridePatch;
    use featurekit_types::property::{PropertyDescriptor, PropertyKind};
    use serde_json::{json, Value};

    fn scenario_a(log: &EventLog) -> (Arc<HostClass>, Arc<HostClass>) {
        let root = HostClass::builder("Root")
            .provide(
                "layout",
                Provision::new(RecordingFactory::new("layout", log).into_arc())
                    .with_config(config(json!({"layout": "classic"}))),
            )
            .build();
        let mid = HostClass::builder("Mid")
            .extends(&root)
            .provide(
                "focus",
                Provision::new(RecordingFactory::new("focus", log).into_arc())
                    .enabled_by_default(false),
            )
            .build();
        let leaf = HostClass::builder("Leaf")
            .extends(&mid)
            .override_feature("focus", OverridePatch::enable())
            .build();
        (mid, leaf)
    }

    #[test]
    fn test_scenario_a_override_enables_feature() {
        let log = EventLog::default();
        let (mid, leaf) = scenario_a(&log);
        let manager = FeatureManager::default();

        let leaf_host = manager.compose(&leaf).unwrap();
        let mut leaf_modules = leaf_host.module_names();
        leaf_modules.sort();
        assert_eq!(leaf_modules, vec!["focus", "layout"]);

        let mid_host = manager.compose(&mid).unwrap();
        assert_eq!(mid_host.module_names(), vec!["layout"]);

        let layout = leaf_host.module_as::<RecordingModule>("layout").unwrap();
        assert_eq!(layout.config, config(json!({"layout": "classic"})));
    }

    #[test]
    fn test_scenario_b_config_patch_merges_over_default() {
        let log = EventLog::default();
        let a = HostClass::builder("A")
            .provide(
                "x",
                Provision::new(RecordingFactory::new("x", &log).into_arc())
                    .with_config(config(json!({"a": 1, "b": 2}))),
            )
            .build();
        let b = HostClass::builder("B")
            .extends(&a)
            .override_feature("x", OverridePatch::default().with_config(config(json!({"b": 3}))))
            .build();

        let manager = FeatureManager::default();
        let resolved = manager.register(&b).unwrap();
        assert_eq!(
            Value::Object(resolved.feature("x").unwrap().config.clone()),
            json!({"a": 1, "b": 3})
        );

        let host = manager.compose(&b).unwrap();
        let x = host.module_as::<RecordingModule>("x").unwrap();
        assert_eq!(x.config, config(json!({"a": 1, "b": 3})));
    }

    #[test]
    fn test_scenario_c_disabled_property_absent_from_host() {
        let log = EventLog::default();
        let a = HostClass::builder("A")
            .provide(
                "x",
                RecordingFactory::new("x", &log)
                    .with_property(
                        "p",
                        PropertyDescriptor::new(PropertyKind::String).with_initial(json!("v")),
                    )
                    .into_arc(),
            )
            .build();
        let b = HostClass::builder("B")
            .extends(&a)
            .override_feature("x", OverridePatch::default().disable_property("p"))
            .build();

        let host = FeatureManager::default().compose(&b).unwrap();
        assert!(!host.resolved().schema.contains_key("p"));
        assert!(host.property("p").is_none());
        assert_eq!(host.module_names(), vec!["x"]);
    }

    #[test]
    fn test_disabled_feature_never_instantiated() {
        let log = EventLog::default();
        let root = HostClass::builder("Root")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .provide("b", RecordingFactory::new("b", &log).into_arc())
            .build();
        let leaf = HostClass::builder("Leaf")
            .extends(&root)
            .disable_feature("a")
            .override_feature("b", OverridePatch::default().with_enabled(false))
            .build();

        let host = FeatureManager::default().compose(&leaf).unwrap();
        assert_eq!(host.module_count(), 0);
        assert!(log.entries().is_empty());
        assert!(!host.resolved().feature("a").unwrap().enabled);
    }

    #[test]
    fn test_descendant_cannot_reenable_ancestor_disable() {
        let log = EventLog::default();
        let root = HostClass::builder("Root")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let mid = HostClass::builder("Mid").extends(&root).disable_feature("a").build();
        let leaf = HostClass::builder("Leaf")
            .extends(&mid)
            .override_feature("a", OverridePatch::enable())
            .build();

        let resolved = FeatureManager::default().register(&leaf).unwrap();
        assert!(!resolved.feature("a").unwrap().enabled);
    }

    #[test]
    fn test_zero_enabled_entries_yield_no_modules() {
        let empty = HostClass::builder("Empty").build();
        let host = FeatureManager::default().compose(&empty).unwrap();
        assert_eq!(host.module_count(), 0);
        assert!(host.resolved().features.is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let log = EventLog::default();
        let class = HostClass::builder("Widget")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let manager = FeatureManager::default();

        let first = manager.register(&class).unwrap();
        let second = manager.register(&class).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(class.is_registered());
        assert_eq!(manager.registered(), vec!["Widget"]);
    }

    #[test]
    fn test_concurrent_first_registration_agrees() {
        let log = EventLog::default();
        let class = HostClass::builder("Widget")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let manager = FeatureManager::default();

        let results: Vec<Arc<ResolvedClass>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| manager.register(&class).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for resolved in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], resolved));
        }
    }

    #[test]
    fn test_chain_too_deep() {
        let mut class = HostClass::builder("C0").build();
        for i in 1..5 {
            class = HostClass::builder(format!("C{i}")).extends(&class).build();
        }

        let manager = FeatureManager::new(EngineConfig {
            max_chain_depth: 4,
            ..EngineConfig::default()
        });
        let err = manager.register(&class).unwrap_err();
        assert!(matches!(err, FeatureError::ChainTooDeep { max: 4, .. }));
        assert!(!class.is_registered());

        let parent = class.parent().unwrap();
        assert_eq!(manager.register(parent).unwrap().chain.len(), 4);
    }

    #[test]
    fn test_missing_module_is_diagnostic_by_default() {
        let log = EventLog::default();
        let root = HostClass::builder("Root")
            .override_feature("ghost", OverridePatch::enable())
            .provide("real", RecordingFactory::new("real", &log).into_arc())
            .build();
        let leaf = HostClass::builder("Leaf").extends(&root).build();

        let resolved = FeatureManager::default().register(&leaf).unwrap();
        assert_eq!(
            resolved.diagnostics,
            vec![Diagnostic::MissingModule {
                class: "Leaf".to_string(),
                feature: "ghost".to_string(),
                declared_by: "Root".to_string(),
            }]
        );
        assert_eq!(resolved.missing_modules().count(), 1);
        assert!(!resolved.features.contains("ghost"));
        assert_eq!(resolved.enabled_names(), vec!["real"]);
    }

    #[test]
    fn test_missing_module_is_fatal_when_strict() {
        let leaf = HostClass::builder("Leaf").disable_feature("ghost").build();
        let manager = FeatureManager::new(EngineConfig {
            strict_overrides: true,
            ..EngineConfig::default()
        });

        let err = manager.register(&leaf).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingModule { ref feature, .. } if feature == "ghost"
        ));
    }

    #[test]
    fn test_compose_by_name() {
        let log = EventLog::default();
        let class = HostClass::builder("Widget")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let manager = FeatureManager::default();

        assert!(matches!(
            manager.compose_by_name("Widget"),
            Err(FeatureError::UnknownClass(_))
        ));
        manager.register(&class).unwrap();
        let host = manager.compose_by_name("Widget").unwrap();
        assert_eq!(host.module_names(), vec!["a"]);
        assert!(manager.class("Widget").is_some());
    }

    #[test]
    fn test_hosts_do_not_share_state() {
        let log = EventLog::default();
        let class = HostClass::builder("Widget")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let manager = FeatureManager::default();

        let mut first = manager.compose(&class).unwrap();
        let second = manager.compose(&class).unwrap();
        assert_ne!(first.id(), second.id());

        first.module_as_mut::<RecordingModule>("a").unwrap().calls = 3;
        assert_eq!(second.module_as::<RecordingModule>("a").unwrap().calls, 0);
        assert_eq!(log.entries(), vec!["new:a", "new:a"]);
    }

    #[test]
    fn test_cached_resolution_checked_against_strict_config() {
        let leaf = HostClass::builder("Leaf").disable_feature("ghost").build();

        let lenient = FeatureManager::default();
        assert_eq!(lenient.register(&leaf).unwrap().diagnostics.len(), 1);
        assert!(leaf.is_registered());

        let strict = FeatureManager::new(EngineConfig {
            strict_overrides: true,
            ..EngineConfig::default()
        });
        let err = strict.register(&leaf).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingModule { ref feature, .. } if feature == "ghost"
        ));
        assert!(strict.registered().is_empty());
    }

    #[test]
    fn test_cached_resolution_checked_against_depth_limit() {
        let mut class = HostClass::builder("C0").build();
        for i in 1..5 {
            class = HostClass::builder(format!("C{i}")).extends(&class).build();
        }
        FeatureManager::default().register(&class).unwrap();

        let shallow = FeatureManager::new(EngineConfig {
            max_chain_depth: 3,
            ..EngineConfig::default()
        });
        let err = shallow.register(&class).unwrap_err();
        assert!(matches!(err, FeatureError::ChainTooDeep { max: 3, .. }));
    }

    #[test]
    fn test_second_manager_indexes_cached_class() {
        let log = EventLog::default();
        let class = HostClass::builder("Widget")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let first = FeatureManager::default();
        let second = FeatureManager::default();

        let resolved = first.register(&class).unwrap();
        assert!(Arc::ptr_eq(&resolved, &second.register(&class).unwrap()));
        assert_eq!(second.registered(), vec!["Widget"]);
        assert_eq!(second.compose_by_name("Widget").unwrap().module_names(), vec!["a"]);
    }

    #[test]
    fn test_name_taken_by_other_class_rejected() {
        let log = EventLog::default();
        let first = HostClass::builder("W")
            .provide("a", RecordingFactory::new("a", &log).into_arc())
            .build();
        let second = HostClass::builder("W").build();
        let manager = FeatureManager::default();

        manager.register(&first).unwrap();
        let err = manager.register(&second).unwrap_err();
        assert!(matches!(err, FeatureError::DuplicateClass(ref name) if name == "W"));
        assert!(!second.is_registered());
        assert_eq!(manager.compose_by_name("W").unwrap().module_names(), vec!["a"]);
    }
}
