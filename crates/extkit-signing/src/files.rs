//! File-backed helpers for information files and packages.
//!
//! - `<name>.ainf`: unsigned information file (one record)
//! - `<name>.anfx`: signed information file (one record)
//! - `<name>.aext`: package (record followed by payload)
//!
//! "Checkout" writes a transitioned record under the name derived from the
//! record and removes the file it was loaded from. It never replaces a
//! different existing file, and leaves only the source behind on failure.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use crate::container;
use crate::error::ExtensionError;
use crate::error::Result;
use crate::error::StateError;
use crate::keys::KeyMaterial;
use crate::record::ExtensionRecord;
use crate::record::SignatureState;
use crate::signer;

/// Suffix of unsigned information files.
pub const UNSIGNED_INFO_EXTENSION: &str = "ainf";

/// Suffix of signed information files.
pub const SIGNED_INFO_EXTENSION: &str = "anfx";

/// Suffix of packages.
pub const PACKAGE_EXTENSION: &str = "aext";

/// `<dir>/<name>.<extension>`, rejecting names that are not a single path component.
pub fn derived_path(dir: &Path, name: &str, extension: &str) -> Result<PathBuf> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(ExtensionError::InvalidFileName(name.to_string()));
    }
    Ok(dir.join(format!("{name}.{extension}")))
}

/// Write one encoded record to `path`, replacing any existing file.
pub fn write_information(path: &Path, record: &ExtensionRecord) -> Result<()> {
    let bytes = record.encode()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), name = %record.name, "wrote information file");
    Ok(())
}

/// Read an information file. The file must be exactly one record long.
pub fn read_information(path: &Path) -> Result<ExtensionRecord> {
    container::read_record(File::open(path)?)
}

/// Read an information file that must hold an unsigned record.
pub fn load_unsigned_information(path: &Path) -> Result<ExtensionRecord> {
    let record = read_information(path)?;
    match record.state()? {
        SignatureState::Unsigned => Ok(record),
        SignatureState::Signed => Err(StateError::AlreadySigned.into()),
    }
}

/// Read an information file that must hold a signed record.
pub fn load_signed_information(path: &Path) -> Result<ExtensionRecord> {
    let record = read_information(path)?;
    match record.state()? {
        SignatureState::Signed => Ok(record),
        SignatureState::Unsigned => Err(StateError::NotSigned.into()),
    }
}

/// Sign the unsigned information file at `info_path` and check it out as
/// `<dir>/<name>.anfx`.
pub fn sign_and_checkout(info_path: &Path, key: &KeyMaterial, payload: &[u8]) -> Result<(PathBuf, ExtensionRecord)> {
    let record = load_unsigned_information(info_path)?;
    let signed = signer::sign_record(&record, key, payload)?;
    let out = checkout(info_path, &signed, SIGNED_INFO_EXTENSION)?;
    Ok((out, signed))
}

/// Strip the signature from the signed information file at `info_path` and
/// check it out as `<dir>/<name>.ainf`.
pub fn unsign_and_checkout(info_path: &Path) -> Result<(PathBuf, ExtensionRecord)> {
    let record = load_signed_information(info_path)?;
    let unsigned = signer::unsign_record(&record)?;
    let out = checkout(info_path, &unsigned, UNSIGNED_INFO_EXTENSION)?;
    Ok((out, unsigned))
}

fn checkout(source: &Path, record: &ExtensionRecord, extension: &str) -> Result<PathBuf> {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let out = derived_path(dir, &record.name, extension)?;
    if out == source {
        write_information(&out, record)?;
        return Ok(out);
    }
    if out.exists() {
        return Err(ExtensionError::TargetExists(out.display().to_string()));
    }

    write_information(&out, record)?;
    if let Err(e) = std::fs::remove_file(source) {
        // Roll back so the source stays the only copy.
        if let Err(cleanup) = std::fs::remove_file(&out) {
            tracing::warn!(path = %out.display(), error = %cleanup, "could not remove checkout target");
        }
        return Err(e.into());
    }
    tracing::debug!(path = %source.display(), "removed checked-out information file");
    Ok(out)
}

/// Write a package: the record followed by the payload.
pub fn write_package(path: &Path, record: &ExtensionRecord, payload: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    container::write_container(BufWriter::new(File::create(path)?), record, payload)?;
    tracing::debug!(path = %path.display(), payload_len = payload.len(), "wrote package");
    Ok(())
}

/// Read a package and decode its record.
pub fn read_package(path: &Path) -> Result<(ExtensionRecord, Vec<u8>)> {
    container::read_container(File::open(path)?)
}
