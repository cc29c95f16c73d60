//! `fkit check`: register every declared class and report the outcome.

use std::path::Path;

use anyhow::{bail, Result};
use console::style;
use featurekit_core::FeatureManager;
use featurekit_infra::declaration::LoadedHierarchy;
use featurekit_observe::attrs;
use featurekit_types::error::Diagnostic;

use super::check_mark;
use crate::state::AppState;

/// Registration outcome of one class.
struct ClassReport {
    class: String,
    error: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

pub async fn handle_check(state: &AppState, file: &Path, json: bool, quiet: bool) -> Result<()> {
    let hierarchy = state.load(file).await?;
    let _span = tracing::info_span!(
        attrs::SPAN_COMMAND,
        command = attrs::CMD_CHECK,
        file = %file.display()
    )
    .entered();

    let reports = check_all(&state.manager, &hierarchy);
    let failed = reports.iter().filter(|r| r.error.is_some()).count();

    if json {
        let out: Vec<_> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "class": r.class,
                    "ok": r.error.is_none(),
                    "error": r.error,
                    "diagnostics": r.diagnostics,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if !quiet {
        println!();
        for report in &reports {
            match &report.error {
                None => println!("  {} {}", check_mark(true), style(&report.class).cyan()),
                Some(err) => println!(
                    "  {} {}: {}",
                    check_mark(false),
                    style(&report.class).cyan(),
                    style(err).red()
                ),
            }
            for diagnostic in &report.diagnostics {
                println!("      {} {diagnostic}", style("!").yellow());
            }
        }
        println!();
    }

    if failed > 0 {
        bail!("{failed} of {} classes failed to register", reports.len());
    }
    Ok(())
}

fn check_all(manager: &FeatureManager, hierarchy: &LoadedHierarchy) -> Vec<ClassReport> {
    hierarchy
        .classes()
        .iter()
        .map(|class| match manager.register(class) {
            Ok(resolved) => ClassReport {
                class: class.name().to_string(),
                error: None,
                diagnostics: resolved.diagnostics.clone(),
            },
            Err(err) => {
                tracing::debug!(class = %class.name(), error = %err, "Class failed to register");
                ClassReport {
                    class: class.name().to_string(),
                    error: Some(err.to_string()),
                    diagnostics: Vec::new(),
                }
            }
        })
        .collect()
}
