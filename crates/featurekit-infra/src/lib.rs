//! Infrastructure layer for featurekit.
//!
//! Loads engine configuration and hierarchy declaration files from disk and
//! turns them into linked `HostClass` descriptors for `featurekit-core`.

pub mod config;
pub mod declaration;
pub mod module;
