//! Shared domain types for featurekit.
//!
//! This crate contains the data the composition engine operates on:
//! overrides and property patches, property descriptors, the lifecycle
//! vocabulary, declaration-file shapes, engine configuration, and errors.
//!
//! Zero engine logic -- only serde, serde_json, thiserror, schemars.

pub mod config;
pub mod declaration;
pub mod error;
pub mod feature;
pub mod lifecycle;
pub mod property;
