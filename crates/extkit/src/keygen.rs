//! `extkit keygen` — generate an RSA key pair.

use std::path::Path;

use extkit_signing::keys;
use extkit_signing::KeyKind;

use crate::config::Config;

pub fn run(config: &Config, author: &str, output: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let out_dir = output.unwrap_or(config.key_dir.as_path());

    // Don't overwrite existing keys
    if !force {
        for kind in [KeyKind::Public, KeyKind::Private] {
            let path = extkit_signing::files::derived_path(out_dir, author, kind.extension())?;
            if path.exists() {
                anyhow::bail!("key file already exists at {}. Remove it first or pass --force.", path.display());
            }
        }
    }

    println!("Generating RSA-{} key pair for '{author}'...", keys::RSA_KEY_BITS);
    let pair = keys::generate_keypair(author)?;
    let (public_path, private_path) = keys::save_keypair(out_dir, &pair)?;

    println!("✓ Generated key pair");
    println!("  Public key:  {}", public_path.display());
    println!("  Private key: {}", private_path.display());
    println!();
    println!("  Keep your private key safe! Share only the .{} file.", keys::PUBLIC_KEY_EXTENSION);

    Ok(())
}
