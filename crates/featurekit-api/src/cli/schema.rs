//! `fkit schema`: the property schema a class publishes.

use std::path::Path;

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use featurekit_observe::attrs;
use featurekit_types::property::{PropertyDescriptor, PropertyOwner};

use crate::state::{find_class, AppState};

pub async fn handle_schema(state: &AppState, file: &Path, class: &str, json: bool) -> Result<()> {
    let hierarchy = state.load(file).await?;
    let _span = tracing::info_span!(attrs::SPAN_COMMAND, command = attrs::CMD_SCHEMA, class = %class)
        .entered();
    let resolved = state.manager.register(find_class(&hierarchy, class)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved.schema)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style("Published schema:").bold(),
        style(&resolved.class).cyan().bold()
    );
    println!();

    if resolved.schema.is_empty() {
        println!("  {} This class publishes no properties.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Property").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Owner").fg(Color::White),
        Cell::new("Attribute").fg(Color::White),
        Cell::new("Initial").fg(Color::White),
    ]);

    for (name, published) in &resolved.schema {
        let descriptor = &published.descriptor;
        let owner = match &published.owner {
            PropertyOwner::Host => Cell::new("host").fg(Color::Yellow),
            PropertyOwner::Feature(feature) => Cell::new(feature).fg(Color::Cyan),
        };
        let attribute = attribute_label(name, descriptor);
        let initial = descriptor
            .initial
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(name),
            Cell::new(&descriptor.kind),
            owner,
            Cell::new(attribute).fg(Color::DarkGrey),
            Cell::new(initial).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!();

    Ok(())
}

/// Reflected attribute name, or `-` for properties that are not reflected.
fn attribute_label(name: &str, descriptor: &PropertyDescriptor) -> String {
    match (&descriptor.attribute, descriptor.reflect) {
        (_, false) => "-".to_string(),
        (Some(attribute), true) => attribute.clone(),
        (None, true) => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurekit_types::property::PropertyKind;
    use tempfile::TempDir;

    #[test]
    fn test_attribute_label() {
        let plain = PropertyDescriptor::new(PropertyKind::Boolean);
        assert_eq!(attribute_label("open", &plain), "-");
        assert_eq!(attribute_label("open", &plain.clone().reflected()), "open");
        assert_eq!(
            attribute_label("open", &plain.reflected().with_attribute("aria-expanded")),
            "aria-expanded"
        );
    }

    #[tokio::test]
    async fn test_handle_schema_registers_class() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("h.toml");
        tokio::fs::write(
            &path,
            "[modules.menu.properties.open]\nkind = \"boolean\"\n\n[[classes]]\nname = \"Root\"\n[classes.provides.menu]\nmodule = \"menu\"\n",
        )
        .await
        .unwrap();

        let state = AppState::init(Some(tmp.path().to_path_buf())).await.unwrap();
        handle_schema(&state, &path, "Root", true).await.unwrap();
        assert!(state.manager.class("Root").is_some());

        let err = handle_schema(&state, &path, "Leaf", false).await.unwrap_err();
        assert!(err.to_string().contains("Class 'Leaf' not found"));
    }
}
