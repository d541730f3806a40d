//! `extkit verify` — check a package or signed information file.

use std::path::Path;

use extkit_signing::files;
use extkit_signing::keys;
use extkit_signing::verifier;
use extkit_signing::KeyKind;

use crate::config::Config;
use crate::keysource;

pub fn run(config: &Config, file: &Path, binary: Option<&Path>, key_path: Option<&Path>, fetch: bool) -> anyhow::Result<()> {
    let (record, payload) = match binary {
        Some(binary) => (files::load_signed_information(file)?, std::fs::read(binary)?),
        None => files::read_package(file)?,
    };

    if !record.is_signed()? {
        anyhow::bail!("'{}' is unsigned; sign it before distributing", file.display());
    }

    // Check against an explicit key, else the signer's key from the key source
    let key = match key_path {
        Some(path) => keys::load_key_file(path, KeyKind::Public)?,
        None => keysource::from_config(config, fetch)?.load_public_key(&record.signature_author)?,
    };

    println!("Verifying '{}' ({} byte payload)...", record.name, payload.len());

    if !verifier::verify_record(&record, &key, &payload)? {
        anyhow::bail!(
            "signature INVALID: record claims signer '{}', checked against key of '{}'",
            record.signature_author,
            key.author
        );
    }

    println!("✓ Signature valid");
    println!("  Signed by: {}", record.signature_author);
    println!("  Version:   {}", record.version);

    Ok(())
}
