//! Span names and recorded values shared by featurekit command spans.
//!
//! All constants are string slices usable as `tracing::info_span!` names and
//! as field values recorded on them.

// --- Span names ---

/// Span wrapping one CLI command.
pub const SPAN_COMMAND: &str = "featurekit.command";

// --- Command name values ---

pub const CMD_INSPECT: &str = "inspect";
pub const CMD_SCHEMA: &str = "schema";
pub const CMD_COMPOSE: &str = "compose";
pub const CMD_CHECK: &str = "check";
