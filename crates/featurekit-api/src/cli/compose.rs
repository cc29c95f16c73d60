//! `fkit compose`: build one host and show what it holds.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use featurekit_core::Host;
use featurekit_observe::attrs;

use crate::state::{find_class, AppState};

pub async fn handle_compose(state: &AppState, file: &Path, class: &str, json: bool) -> Result<()> {
    let hierarchy = state.load(file).await?;
    let _span = tracing::info_span!(attrs::SPAN_COMMAND, command = attrs::CMD_COMPOSE, class = %class)
        .entered();

    let mut host = state
        .manager
        .compose(find_class(&hierarchy, class)?)
        .with_context(|| format!("Failed to compose a '{class}' host"))?;
    host.connect()
        .with_context(|| format!("Failed to connect the '{class}' host"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&compose_json(&host))?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} {}",
        style("Host:").bold(),
        style(host.class_name()).cyan().bold(),
        style(host.id()).dim()
    );
    println!();

    if host.module_count() == 0 {
        println!("  {} No enabled features; no modules composed.", style("i").blue().bold());
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#").fg(Color::White),
            Cell::new("Feature").fg(Color::White),
            Cell::new("Module").fg(Color::White),
        ]);
        for (i, name) in host.module_names().into_iter().enumerate() {
            let module = host
                .resolved()
                .feature(name)
                .map(|f| f.module_id().to_string())
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(i + 1).fg(Color::DarkGrey),
                Cell::new(name).fg(Color::Cyan),
                Cell::new(module),
            ]);
        }
        println!("{table}");
    }

    let values = host.properties().values();
    if !values.is_empty() {
        println!();
        println!("  {} Property values:", style("*").green());
        for (name, value) in values {
            println!("    {name} = {value}");
        }
    }
    println!();

    Ok(())
}

fn compose_json(host: &Host) -> serde_json::Value {
    serde_json::json!({
        "id": host.id().to_string(),
        "class": host.class_name(),
        "modules": host.module_names(),
        "properties": host.properties().values(),
    })
}
