//! CLI command definitions for the `fkit` binary.
//!
//! Uses clap derive macros for argument parsing. Every command that reads a
//! declaration file takes its path as the first positional argument.

pub mod check;
pub mod compose;
pub mod format_schema;
pub mod inspect;
pub mod schema;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use featurekit_core::ResolvedFeature;

/// Inspect and compose capability hierarchies.
#[derive(Parser)]
#[command(name = "fkit", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// featurekit directory holding config.toml.
    #[arg(long, global = true, env = "FEATUREKIT_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a class's chain, resolved features, merged config, and diagnostics.
    Inspect {
        /// Declaration file (.toml, .yaml, .yml).
        file: PathBuf,
        /// Host class to inspect.
        class: String,
    },

    /// Show the property schema a class publishes.
    Schema {
        /// Declaration file (.toml, .yaml, .yml).
        file: PathBuf,
        /// Host class whose schema to show.
        class: String,
    },

    /// Compose a host and list its modules in dispatch order.
    Compose {
        /// Declaration file (.toml, .yaml, .yml).
        file: PathBuf,
        /// Host class to compose.
        class: String,
    },

    /// Register every declared class and report problems.
    Check {
        /// Declaration file (.toml, .yaml, .yml).
        file: PathBuf,
    },

    /// Print the JSON Schema of the declaration file format.
    #[command(name = "format-schema")]
    FormatSchema,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Short label for a feature's effective override.
pub(crate) fn override_label(feature: &ResolvedFeature) -> String {
    match (&feature.override_entry, &feature.override_declared_by) {
        (Some(entry), Some(by)) => format!("{entry} ({by})"),
        (Some(entry), None) => entry.to_string(),
        _ => "-".to_string(),
    }
}

pub(crate) fn check_mark(ok: bool) -> String {
    if ok {
        format!("{}", style("✓").green())
    } else {
        format!("{}", style("✗").red())
    }
}
