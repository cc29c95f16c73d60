//! Published property schema collection.
//!
//! Unions the host class's own properties with the (patched) schemas of its
//! enabled features. Host-declared properties always take precedence. Two
//! different modules contributing the same property name is a configuration
//! error; the same module behind two feature names is not.

use featurekit_types::error::FeatureError;
use featurekit_types::feature::{OverridePatch, PropertyPatch};
use featurekit_types::property::{PropertyOwner, PropertySchema, PublishedProperty};

use crate::class::HostClass;
use crate::resolved::{PublishedSchema, ResolvedFeatureSet};

/// Union the properties each class in the chain declares on itself.
///
/// `chain` runs leaf to root; the declaration closest to the leaf wins.
pub fn inherited_properties<'a>(chain: impl IntoIterator<Item = &'a HostClass>) -> PropertySchema {
    let mut properties = PropertySchema::new();
    for class in chain {
        for (name, descriptor) in class.properties() {
            if properties.contains_key(name) {
                tracing::trace!(
                    property = %name,
                    class = %class.name(),
                    "Host property redeclared closer to the leaf"
                );
                continue;
            }
            properties.insert(name.clone(), descriptor.clone());
        }
    }
    properties
}

/// Apply an override's property patches to a module's declared schema.
///
/// `Disable` removes the property; `Replace` replaces it or adds it.
pub fn patch_schema(mut declared: PropertySchema, patch: Option<&OverridePatch>) -> PropertySchema {
    let Some(patch) = patch else {
        return declared;
    };

    for (name, property_patch) in &patch.properties {
        match property_patch {
            PropertyPatch::Disable => {
                declared.remove(name);
            }
            PropertyPatch::Replace(descriptor) => {
                declared.insert(name.clone(), descriptor.clone());
            }
        }
    }

    declared
}

/// Build the schema a class publishes from its own properties and its
/// enabled features, processed in first-resolution order.
pub fn collect_schema(
    class: &str,
    host_properties: &PropertySchema,
    features: &ResolvedFeatureSet,
) -> Result<PublishedSchema, FeatureError> {
    let mut published: PublishedSchema = host_properties
        .iter()
        .map(|(name, descriptor)| {
            (
                name.clone(),
                PublishedProperty {
                    descriptor: descriptor.clone(),
                    owner: PropertyOwner::Host,
                },
            )
        })
        .collect();

    for feature in features.enabled() {
        for (name, descriptor) in &feature.schema {
            let Some(existing) = published.get(name) else {
                published.insert(
                    name.clone(),
                    PublishedProperty {
                        descriptor: descriptor.clone(),
                        owner: PropertyOwner::Feature(feature.name().to_string()),
                    },
                );
                continue;
            };

            match &existing.owner {
                PropertyOwner::Host => {
                    tracing::trace!(
                        property = %name,
                        feature = %feature.name(),
                        "Host-declared property shadows module property"
                    );
                }
                PropertyOwner::Feature(first) => {
                    let first_module = features.get(first).map(|f| f.module_id());
                    if first_module == Some(feature.module_id()) {
                        tracing::debug!(
                            property = %name,
                            first = %first,
                            second = %feature.name(),
                            "Same module contributes property twice; first feature keeps it"
                        );
                    } else {
                        return Err(FeatureError::Configuration {
                            class: class.to_string(),
                            property: name.clone(),
                            first: first.clone(),
                            second: feature.name().to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(published)
}
