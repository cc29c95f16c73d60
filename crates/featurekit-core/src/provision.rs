//! Provision resolution.
//!
//! Folds the provisions of an ancestor chain into one entry per feature
//! name. The walk runs leaf to root and the first declaration of a name wins
//! outright: an ancestor's declaration of the same name is discarded whole,
//! never merged field by field. Only the override channel is patchable.

use std::collections::HashSet;

use crate::class::{HostClass, ProvisionEntry};

/// Resolve provisions over a leaf-to-root chain.
///
/// The result is ordered by first resolution: the leaf's provisions in
/// declaration order, then each ancestor's new names in turn.
pub fn resolve_provisions<'a>(chain: impl IntoIterator<Item = &'a HostClass>) -> Vec<ProvisionEntry> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for class in chain {
        for entry in class.provides() {
            if seen.insert(entry.name.clone()) {
                resolved.push(entry.clone());
            } else {
                tracing::trace!(
                    feature = %entry.name,
                    class = %class.name(),
                    "Provision shadowed by a more derived class"
                );
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Provision;
    use crate::testing::{config, EventLog, RecordingFactory};
    use serde_json::json;

    #[test]
    fn test_most_derived_declaration_wins_outright() {
        let log = EventLog::default();
        let root = HostClass::builder("Root")
            .provide(
                "x",
                Provision::new(RecordingFactory::new("root-x", &log).into_arc())
                    .with_config(config(json!({"a": 1, "b": 2}))),
            )
            .build();
        let leaf = HostClass::builder("Leaf")
            .extends(&root)
            .provide(
                "x",
                Provision::new(RecordingFactory::new("leaf-x", &log).into_arc())
                    .with_config(config(json!({"b": 9})))
                    .enabled_by_default(false),
            )
            .build();

        let resolved = resolve_provisions(leaf.chain());

        assert_eq!(resolved.len(), 1);
        let x = &resolved[0];
        assert_eq!(x.module_id(), "leaf-x");
        assert_eq!(x.declared_by, "Leaf");
        assert!(!x.enabled_by_default);
        // No field-by-field merge with the ancestor's config.
        assert_eq!(x.default_config, config(json!({"b": 9})));
    }

    #[test]
    fn test_exactly_one_entry_per_name_in_first_resolution_order() {
        let log = EventLog::default();
        let root = HostClass::builder("Root")
            .provide("layout", RecordingFactory::new("layout", &log).into_arc())
            .provide("focus", RecordingFactory::new("focus", &log).into_arc())
            .build();
        let mid = HostClass::builder("Mid")
            .extends(&root)
            .provide("counter", RecordingFactory::new("counter", &log).into_arc())
            .provide("focus", RecordingFactory::new("focus2", &log).into_arc())
            .build();
        let leaf = HostClass::builder("Leaf").extends(&mid).build();

        let names: Vec<_> = resolve_provisions(leaf.chain())
            .into_iter()
            .map(|p| (p.name, p.declared_by))
            .collect();

        assert_eq!(
            names,
            vec![
                ("counter".to_string(), "Mid".to_string()),
                ("focus".to_string(), "Mid".to_string()),
                ("layout".to_string(), "Root".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_chain_resolves_nothing() {
        let root = HostClass::builder("Root").build();
        assert!(resolve_provisions(root.chain()).is_empty());
    }
}
