use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::Hook;

/// Errors raised by a module constructor.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("invalid config key '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

/// Errors raised by a lifecycle hook or by the host's own event handling.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("feature '{feature}' does not own property '{property}'")]
    NotOwner { property: String, feature: String },

    #[error("property '{0}' is not in the published schema")]
    UnknownProperty(String),

    #[error("property '{property}' expects a {expected} value")]
    KindMismatch {
        property: String,
        expected: crate::property::PropertyKind,
    },
}

/// Errors from class registration, composition, and dispatch.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(
        "property '{property}' on class '{class}' is contributed by both '{first}' and '{second}'"
    )]
    Configuration {
        class: String,
        property: String,
        first: String,
        second: String,
    },

    #[error("class '{class}' overrides feature '{feature}' which no class in its chain provides")]
    MissingModule { class: String, feature: String },

    #[error("module for feature '{feature}' failed to construct: {source}")]
    Construction {
        feature: String,
        #[source]
        source: ModuleError,
    },

    #[error("hook '{hook}' of feature '{feature}' failed: {source}")]
    Hook {
        feature: String,
        hook: Hook,
        #[source]
        source: HookError,
    },

    #[error("host handling of '{hook}' failed: {source}")]
    HostHandler {
        hook: Hook,
        #[source]
        source: HookError,
    },

    #[error("ancestor chain of '{class}' exceeds {max} classes")]
    ChainTooDeep { class: String, max: usize },

    #[error("class '{0}' is not registered")]
    UnknownClass(String),

    #[error("a different class named '{0}' is already registered")]
    DuplicateClass(String),
}

/// Non-fatal findings recorded while resolving a class.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An override targets a feature absent from the merged provisions.
    MissingModule {
        class: String,
        feature: String,
        declared_by: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModule {
                class,
                feature,
                declared_by,
            } => write!(
                f,
                "override of '{feature}' declared by '{declared_by}' has no provision in the chain of '{class}'"
            ),
        }
    }
}
