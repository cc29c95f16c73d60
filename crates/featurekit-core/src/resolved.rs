//! Per-class resolution results.
//!
//! Computed once per class by [`crate::FeatureManager::register`], cached on
//! the class descriptor, and never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use featurekit_types::error::Diagnostic;
use featurekit_types::feature::{ConfigBag, FeatureOverride};
use featurekit_types::property::{PropertySchema, PublishedProperty};

use crate::class::ProvisionEntry;

/// Property name -> published property, as handed to the host's reactive
/// property system.
pub type PublishedSchema = BTreeMap<String, PublishedProperty>;

/// One feature after provisions and overrides have been folded.
#[derive(Debug, Clone)]
pub struct ResolvedFeature {
    pub provision: ProvisionEntry,
    /// Effective override, if any class in the chain declared one.
    pub override_entry: Option<FeatureOverride>,
    /// Class that declared the closest override.
    pub override_declared_by: Option<String>,
    pub enabled: bool,
    /// Provision default config with the override's config merged over it.
    pub config: ConfigBag,
    /// Module schema with the override's property patches applied.
    pub schema: PropertySchema,
}

impl ResolvedFeature {
    pub fn name(&self) -> &str {
        &self.provision.name
    }

    pub fn module_id(&self) -> &str {
        self.provision.module_id()
    }
}

/// Features keyed by name, kept in first-resolution order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFeatureSet {
    entries: Vec<ResolvedFeature>,
    index: HashMap<String, usize>,
}

impl ResolvedFeatureSet {
    /// Append a feature. Names are unique; a repeated name replaces the
    /// earlier entry in place.
    pub(crate) fn push(&mut self, feature: ResolvedFeature) {
        match self.index.get(feature.name()) {
            Some(&i) => self.entries[i] = feature,
            None => {
                self.index.insert(feature.name().to_string(), self.entries.len());
                self.entries.push(feature);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedFeature> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedFeature> {
        self.entries.iter()
    }

    /// Enabled features in first-resolution order.
    pub fn enabled(&self) -> impl Iterator<Item = &ResolvedFeature> {
        self.entries.iter().filter(|f| f.enabled)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the engine derives from one class declaration.
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    pub class: String,
    /// Class names from leaf to root.
    pub chain: Vec<String>,
    pub features: ResolvedFeatureSet,
    pub schema: PublishedSchema,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedClass {
    pub fn feature(&self, name: &str) -> Option<&ResolvedFeature> {
        self.features.get(name)
    }

    pub fn enabled_names(&self) -> Vec<&str> {
        self.features.enabled().map(|f| f.name()).collect()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn missing_modules(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::MissingModule { .. }))
    }
}
