//! `fkit inspect`: resolution details for one class.

use std::path::Path;

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use featurekit_core::ResolvedClass;
use featurekit_observe::attrs;

use super::override_label;
use crate::state::{find_class, AppState};

pub async fn handle_inspect(state: &AppState, file: &Path, class: &str, json: bool) -> Result<()> {
    let hierarchy = state.load(file).await?;
    let _span = tracing::info_span!(attrs::SPAN_COMMAND, command = attrs::CMD_INSPECT, class = %class)
        .entered();
    let resolved = state.manager.register(find_class(&hierarchy, class)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspect_json(&resolved))?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style("Class:").bold(),
        style(&resolved.class).cyan().bold()
    );
    println!("  Chain: {}", resolved.chain.join(" → "));
    println!();

    if resolved.features.is_empty() {
        println!(
            "  {} No features provided anywhere in this chain.",
            style("i").blue().bold()
        );
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Feature").fg(Color::White),
            Cell::new("Module").fg(Color::White),
            Cell::new("Provided By").fg(Color::White),
            Cell::new("State").fg(Color::White),
            Cell::new("Override").fg(Color::White),
        ]);

        for feature in resolved.features.iter() {
            let state_cell = if feature.enabled {
                Cell::new("● enabled").fg(Color::Green)
            } else {
                Cell::new("○ disabled").fg(Color::DarkGrey)
            };
            table.add_row(vec![
                Cell::new(feature.name()).fg(Color::Cyan),
                Cell::new(feature.module_id()),
                Cell::new(&feature.provision.declared_by),
                state_cell,
                Cell::new(override_label(feature)).fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }

    let configured: Vec<_> = resolved
        .features
        .enabled()
        .filter(|f| !f.config.is_empty())
        .collect();
    if !configured.is_empty() {
        println!();
        println!("  {} Merged config:", style("*").green());
        for feature in configured {
            println!(
                "    {}: {}",
                style(feature.name()).cyan(),
                serde_json::Value::Object(feature.config.clone())
            );
        }
    }

    if resolved.has_diagnostics() {
        println!();
        println!("  {} Diagnostics:", style("!").yellow().bold());
        for diagnostic in &resolved.diagnostics {
            println!("    - {diagnostic}");
        }
    }
    println!();

    Ok(())
}

fn inspect_json(resolved: &ResolvedClass) -> serde_json::Value {
    let features: Vec<_> = resolved
        .features
        .iter()
        .map(|f| {
            serde_json::json!({
                "name": f.name(),
                "module": f.module_id(),
                "declared_by": f.provision.declared_by,
                "enabled": f.enabled,
                "override": f.override_entry.as_ref().map(|o| o.to_string()),
                "override_declared_by": f.override_declared_by,
                "config": f.config,
            })
        })
        .collect();

    serde_json::json!({
        "class": resolved.class,
        "chain": resolved.chain,
        "features": features,
        "diagnostics": resolved.diagnostics,
    })
}
