//! Override resolution.
//!
//! Folds the overrides of an ancestor chain, leaf to root, into one
//! effective override per feature name:
//!
//! 1. The first declaration seen is stored as is.
//! 2. A stored `Disabled` is terminal; ancestor declarations are ignored.
//! 3. An ancestor's `Disabled` replaces whatever was stored.
//! 4. Otherwise the ancestor's patch is folded under the stored one.
//!
//! Folding keeps the closer-to-leaf value at every depth: the `enabled`
//! toggle, each nested config key, and each property patch. Property
//! `Disable` markers stay in the accumulated map so schema collection can
//! strip the property later.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use featurekit_types::feature::{FeatureOverride, OverridePatch};

use crate::class::HostClass;
use crate::merge::deep_merge_missing;

/// The folded override for one feature name.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveOverride {
    pub entry: FeatureOverride,
    /// The most derived class that declared an override for the name.
    pub declared_by: String,
}

/// Resolve overrides over a leaf-to-root chain.
pub fn resolve_overrides<'a>(
    chain: impl IntoIterator<Item = &'a HostClass>,
) -> BTreeMap<String, EffectiveOverride> {
    let mut resolved: BTreeMap<String, EffectiveOverride> = BTreeMap::new();

    for class in chain {
        for (name, incoming) in class.overrides() {
            match resolved.entry(name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(EffectiveOverride {
                        entry: incoming.clone(),
                        declared_by: class.name().to_string(),
                    });
                }
                Entry::Occupied(mut slot) => {
                    let stored = &mut slot.get_mut().entry;
                    match (stored, incoming) {
                        (FeatureOverride::Disabled, _) => {
                            tracing::trace!(
                                feature = %name,
                                class = %class.name(),
                                "Feature already disabled by a descendant; ancestor override ignored"
                            );
                        }
                        (stored, FeatureOverride::Disabled) => {
                            *stored = FeatureOverride::Disabled;
                        }
                        (FeatureOverride::Patch(accumulated), FeatureOverride::Patch(ancestor)) => {
                            fold_patch(accumulated, ancestor);
                        }
                    }
                }
            }
        }
    }

    resolved
}

/// Fold an ancestor's patch under one accumulated from more derived classes.
fn fold_patch(accumulated: &mut OverridePatch, ancestor: &OverridePatch) {
    if accumulated.enabled.is_none() {
        accumulated.enabled = ancestor.enabled;
    }

    deep_merge_missing(&mut accumulated.config, &ancestor.config);

    for (property, patch) in &ancestor.properties {
        accumulated
            .properties
            .entry(property.clone())
            .or_insert_with(|| patch.clone());
    }
}
