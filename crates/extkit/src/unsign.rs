//! `extkit unsign` — strip the signature from a signed information file.

use std::path::Path;

use extkit_signing::files;

pub fn run(info: &Path) -> anyhow::Result<()> {
    let (out_path, record) = files::unsign_and_checkout(info)?;
    println!("✓ Removed signature from '{}'", record.name);
    println!("  Unsigned information file: {}", out_path.display());
    Ok(())
}
