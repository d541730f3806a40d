//! `extkit sign` — sign an information file against its payload.

use std::path::Path;

use extkit_signing::files;
use extkit_signing::keys;
use extkit_signing::KeyKind;

use crate::config::Config;
use crate::keysource;

pub fn run(config: &Config, info: &Path, binary: &Path, key_path: Option<&Path>, author: Option<&str>) -> anyhow::Result<()> {
    // Load the signing key
    let key = match (key_path, author) {
        (Some(path), _) => keys::load_key_file(path, KeyKind::Private)?,
        (None, Some(author)) => keysource::from_config(config, false)?.load_private_key(author)?,
        (None, None) => {
            let record = files::load_unsigned_information(info)?;
            keysource::from_config(config, false)?.load_private_key(&record.author)?
        }
    };

    let payload = std::fs::read(binary)?;
    println!("Signing {} with {} ({} bytes)...", info.display(), binary.display(), payload.len());

    let (out_path, signed) = files::sign_and_checkout(info, &key, &payload)?;

    println!("✓ Signed '{}' as {}", signed.name, signed.signature_author);
    println!("  Signed information file: {}", out_path.display());
    println!();
    println!("  Next: extkit pack {} --binary {}", out_path.display(), binary.display());

    Ok(())
}
