//! `extkit init` — create an unsigned information file.

use std::path::Path;
use std::path::PathBuf;

use extkit_signing::files;
use extkit_signing::ExtensionRecord;

use crate::config::Config;

pub const DEFAULT_FORMAT_VERSION: &str = "1.0";

/// Descriptive fields of a new record.
pub struct Fields {
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: String,
    pub format_version: String,
}

pub fn run(config: &Config, fields: &Fields, output: Option<&Path>) -> anyhow::Result<()> {
    if fields.name.trim().is_empty() {
        anyhow::bail!("extension name must not be empty");
    }
    if fields.author.trim().is_empty() {
        anyhow::bail!("extension author must not be empty");
    }

    let record = ExtensionRecord {
        format_version: fields.format_version.clone(),
        name: fields.name.clone(),
        author: fields.author.clone(),
        description: fields.description.clone(),
        version: fields.version.clone(),
        ..ExtensionRecord::new()
    };
    // Fails early with the offending field before anything is written.
    record.encode()?;

    let out_dir = output.map_or_else(|| config.root.join(&record.name), PathBuf::from);
    let path = files::derived_path(&out_dir, &record.name, files::UNSIGNED_INFO_EXTENSION)?;
    if path.exists() {
        anyhow::bail!("'{}' already exists", path.display());
    }

    files::write_information(&path, &record)?;

    println!("✓ Created information file {}", path.display());
    println!("  Name:    {}", record.name);
    println!("  Author:  {}", record.author);
    println!("  Version: {}", record.version);
    println!();
    println!("  Next steps:");
    println!("    extkit sign {} --binary <payload> --author <identity>", path.display());

    Ok(())
}
