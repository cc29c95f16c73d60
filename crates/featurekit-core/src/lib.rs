//! Feature resolution and host composition engine.
//!
//! A host class declares capability provisions and overrides; this crate
//! walks the class's ancestor chain, folds those declarations into one
//! resolved feature set, publishes the merged property schema, builds one
//! module instance per enabled feature for each host, and fans lifecycle
//! hooks out to them. It depends only on `featurekit-types` -- never on
//! `featurekit-infra` or any file/IO crate.

pub mod catalog;
pub mod chain;
pub mod class;
pub mod compose;
pub mod dispatch;
pub mod host;
pub mod manager;
pub mod merge;
pub mod module;
pub mod overrides;
pub mod provision;
pub mod resolved;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::ModuleCatalog;
pub use class::{HostClass, HostClassBuilder, Provision, ProvisionEntry};
pub use compose::ModuleInstance;
pub use host::{Host, PropertyStore};
pub use manager::FeatureManager;
pub use resolved::{PublishedSchema, ResolvedClass, ResolvedFeature, ResolvedFeatureSet};
pub use module::{CapabilityModule, HookContext, ModuleContext, ModuleFactory};
