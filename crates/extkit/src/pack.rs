//! `extkit pack` — build a package from an information file and a payload.

use std::path::Path;

use extkit_signing::files;

pub fn run(info: &Path, binary: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let record = files::read_information(info)?;
    let payload = std::fs::read(binary)?;

    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let dir = info.parent().unwrap_or_else(|| Path::new(""));
            files::derived_path(dir, &record.name, files::PACKAGE_EXTENSION)?
        }
    };

    files::write_package(&out_path, &record, &payload)?;

    println!("✓ Packed '{}' ({} byte payload)", record.name, payload.len());
    println!("  Package: {}", out_path.display());
    if !record.is_signed()? {
        println!("  ⚠ The record is unsigned; this package is for signing, not distribution.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use extkit_signing::record::RECORD_LEN;
    use extkit_signing::ExtensionRecord;

    use super::*;

    #[test]
    fn default_output_is_named_after_record() {
        let dir = tempfile::tempdir().unwrap();
        let info = dir.path().join("draft.ainf");
        let record = ExtensionRecord {
            name: "Demo".into(),
            ..ExtensionRecord::new()
        };
        files::write_information(&info, &record).unwrap();
        let binary = dir.path().join("demo.bin");
        std::fs::write(&binary, [7u8; 10]).unwrap();

        run(&info, &binary, None).unwrap();

        let package = dir.path().join("Demo.aext");
        assert_eq!(std::fs::metadata(&package).unwrap().len(), RECORD_LEN as u64 + 10);
        let (loaded, payload) = files::read_package(&package).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(payload, vec![7u8; 10]);
    }

    #[test]
    fn truncated_information_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let info = dir.path().join("bad.ainf");
        std::fs::write(&info, [0u8; 1000]).unwrap();
        let binary = dir.path().join("demo.bin");
        std::fs::write(&binary, [0u8; 1]).unwrap();
        assert!(run(&info, &binary, None).is_err());
    }
}
