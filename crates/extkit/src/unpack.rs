//! `extkit unpack` — split a package into information file and payload.

use std::path::Path;

use extkit_signing::files;

/// Suffix of extracted payloads.
const PAYLOAD_EXTENSION: &str = "bin";

pub fn run(package: &Path, output_dir: Option<&Path>) -> anyhow::Result<()> {
    let (record, payload) = files::read_package(package)?;
    let out_dir = output_dir.unwrap_or_else(|| package.parent().unwrap_or_else(|| Path::new("")));

    let info_extension = if record.is_signed()? {
        files::SIGNED_INFO_EXTENSION
    } else {
        files::UNSIGNED_INFO_EXTENSION
    };
    let info_path = files::derived_path(out_dir, &record.name, info_extension)?;
    let payload_path = files::derived_path(out_dir, &record.name, PAYLOAD_EXTENSION)?;

    for path in [&info_path, &payload_path] {
        if path.exists() {
            anyhow::bail!("'{}' already exists", path.display());
        }
    }

    files::write_information(&info_path, &record)?;
    std::fs::write(&payload_path, &payload)?;

    println!("✓ Unpacked '{}'", record.name);
    println!("  Information file: {}", info_path.display());
    println!("  Payload:          {} ({} bytes)", payload_path.display(), payload.len());

    Ok(())
}
