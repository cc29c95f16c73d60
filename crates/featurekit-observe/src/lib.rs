//! Observability setup for featurekit.

pub mod attrs;
pub mod tracing_setup;
