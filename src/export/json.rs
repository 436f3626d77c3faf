//! JSON file save/load for progress export documents.

use super::document::{validate_export, ExportDocument};
use std::fs::File;
use std::io::{Read, Write};

/// Writes an export document to a JSON file at the specified path.
pub fn export_json_to_path(
    document: &ExportDocument,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_string = serde_json::to_string_pretty(document)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Loads and validates an export document from a JSON file.
pub fn import_json(filename: &str) -> Result<ExportDocument, Box<dyn std::error::Error>> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let value: serde_json::Value = serde_json::from_str(&contents)?;
    let document = validate_export(&value)?;
    Ok(document)
}
