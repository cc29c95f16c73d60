//! `fkit format-schema`: JSON Schema of the declaration file format.
//!
//! Useful for editor validation of hierarchy files written in YAML.

use anyhow::Result;
use featurekit_types::declaration::HierarchyFile;

pub fn handle_format_schema() -> Result<()> {
    let schema = schemars::schema_for!(HierarchyFile);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
