//! Host class descriptors.
//!
//! A [`HostClass`] is one link of a host's ancestor chain: its local
//! provisions, its local overrides, the properties it declares itself, and a
//! link to its parent. Descriptors are immutable once built and shared by
//! `Arc`; the only interior state is the one-time resolution cache written by
//! [`crate::FeatureManager::register`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use featurekit_types::feature::{ConfigBag, FeatureOverride};
use featurekit_types::property::{PropertyDescriptor, PropertySchema};

use crate::chain::ChainWalker;
use crate::module::ModuleFactory;
use crate::resolved::ResolvedClass;

/// A feature made available by a class to itself and its descendants.
#[derive(Debug, Clone)]
pub struct ProvisionEntry {
    pub name: String,
    pub factory: Arc<dyn ModuleFactory>,
    pub default_config: ConfigBag,
    pub enabled_by_default: bool,
    /// Name of the class that declared this provision.
    pub declared_by: String,
}

impl ProvisionEntry {
    pub fn module_id(&self) -> &str {
        self.factory.module_id()
    }
}

/// Provision arguments accepted by [`HostClassBuilder::provide`].
#[derive(Debug, Clone)]
pub struct Provision {
    factory: Arc<dyn ModuleFactory>,
    default_config: ConfigBag,
    enabled_by_default: bool,
}

impl Provision {
    pub fn new(factory: Arc<dyn ModuleFactory>) -> Self {
        Self {
            factory,
            default_config: ConfigBag::new(),
            enabled_by_default: true,
        }
    }

    pub fn with_config(mut self, default_config: ConfigBag) -> Self {
        self.default_config = default_config;
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }
}

impl From<Arc<dyn ModuleFactory>> for Provision {
    fn from(factory: Arc<dyn ModuleFactory>) -> Self {
        Self::new(factory)
    }
}

pub struct HostClass {
    name: String,
    parent: Option<Arc<HostClass>>,
    provides: Vec<ProvisionEntry>,
    overrides: Vec<(String, FeatureOverride)>,
    properties: PropertySchema,
    resolved: OnceLock<Arc<ResolvedClass>>,
}

impl HostClass {
    pub fn builder(name: impl Into<String>) -> HostClassBuilder {
        HostClassBuilder {
            name: name.into(),
            parent: None,
            provides: Vec::new(),
            overrides: Vec::new(),
            properties: PropertySchema::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<HostClass>> {
        self.parent.as_ref()
    }

    /// Local provisions in declaration order.
    pub fn provides(&self) -> &[ProvisionEntry] {
        &self.provides
    }

    /// Local overrides in declaration order.
    pub fn overrides(&self) -> &[(String, FeatureOverride)] {
        &self.overrides
    }

    /// Properties declared directly on this class.
    pub fn properties(&self) -> &PropertySchema {
        &self.properties
    }

    /// Walk from this class to the root of its chain.
    pub fn chain(&self) -> ChainWalker<'_> {
        ChainWalker::new(self)
    }

    /// Whether this class was registered already.
    pub fn is_registered(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn resolved(&self) -> Option<&Arc<ResolvedClass>> {
        self.resolved.get()
    }

    /// Store the resolution if none is cached yet and return the cached one.
    pub(crate) fn cache_resolution(&self, resolved: Arc<ResolvedClass>) -> Arc<ResolvedClass> {
        self.resolved.get_or_init(|| resolved).clone()
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field(
                "provides",
                &self.provides.iter().map(|p| &p.name).collect::<Vec<_>>(),
            )
            .field(
                "overrides",
                &self.overrides.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Builder for [`HostClass`].
///
/// Declaring the same feature name twice on one class keeps the position of
/// the first declaration and the contents of the last.
pub struct HostClassBuilder {
    name: String,
    parent: Option<Arc<HostClass>>,
    provides: Vec<ProvisionEntry>,
    overrides: Vec<(String, FeatureOverride)>,
    properties: PropertySchema,
}

impl HostClassBuilder {
    pub fn extends(mut self, parent: &Arc<HostClass>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    pub fn provide(mut self, name: impl Into<String>, provision: impl Into<Provision>) -> Self {
        let name = name.into();
        let provision = provision.into();
        let entry = ProvisionEntry {
            name: name.clone(),
            factory: provision.factory,
            default_config: provision.default_config,
            enabled_by_default: provision.enabled_by_default,
            declared_by: self.name.clone(),
        };
        match self.provides.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = entry,
            None => self.provides.push(entry),
        }
        self
    }

    pub fn override_feature(
        mut self,
        name: impl Into<String>,
        entry: impl Into<FeatureOverride>,
    ) -> Self {
        let name = name.into();
        let entry = entry.into();
        match self.overrides.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = entry,
            None => self.overrides.push((name, entry)),
        }
        self
    }

    pub fn disable_feature(self, name: impl Into<String>) -> Self {
        self.override_feature(name, FeatureOverride::Disabled)
    }

    pub fn property(mut self, name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.properties.insert(name.into(), descriptor);
        self
    }

    pub fn build(self) -> Arc<HostClass> {
        Arc::new(HostClass {
            name: self.name,
            parent: self.parent,
            provides: self.provides,
            overrides: self.overrides,
            properties: self.properties,
            resolved: OnceLock::new(),
        })
    }
}
