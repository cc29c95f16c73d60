//! Deep merge of configuration bags.
//!
//! Plain objects merge key by key, recursively. Any other value (arrays
//! included) replaces outright. The preferred side wins at every depth.

use serde_json::Value;

use featurekit_types::feature::ConfigBag;

/// Merge `overlay` into `base`; `overlay` wins on conflicts at every depth.
pub fn deep_merge(base: &mut ConfigBag, overlay: &ConfigBag) {
    for (key, incoming) in overlay {
        match (base.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Fill keys of `preferred` that are missing, recursively, from `fallback`.
///
/// Used when folding an ancestor's patch into one accumulated from more
/// derived classes: values already present are never replaced.
pub fn deep_merge_missing(preferred: &mut ConfigBag, fallback: &ConfigBag) {
    for (key, candidate) in fallback {
        match (preferred.get_mut(key), candidate) {
            (None, _) => {
                preferred.insert(key.clone(), candidate.clone());
            }
            (Some(Value::Object(existing)), Value::Object(candidate)) => {
                deep_merge_missing(existing, candidate);
            }
            (Some(_), _) => {}
        }
    }
}

/// `base` with `overlay` merged over it.
pub fn merged(base: &ConfigBag, overlay: &ConfigBag) -> ConfigBag {
    let mut out = base.clone();
    deep_merge(&mut out, overlay);
    out
}
