//! `extkit inspect` — print the record of an information file or package.

use std::path::Path;

use extkit_signing::files;
use extkit_signing::ExtensionRecord;
use extkit_signing::SignatureState;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RecordSummary<'a> {
    format_version: &'a str,
    name: &'a str,
    author: &'a str,
    description: &'a str,
    version: &'a str,
    state: &'static str,
    signature_author: Option<&'a str>,
    signature: Option<String>,
    pad_in_use: bool,
    payload_len: Option<usize>,
}

impl<'a> RecordSummary<'a> {
    fn new(record: &'a ExtensionRecord, payload_len: Option<usize>) -> Self {
        let state = match record.state() {
            Ok(SignatureState::Unsigned) => "unsigned",
            Ok(SignatureState::Signed) => "signed",
            Err(_) => "inconsistent",
        };
        let signed = state != "unsigned";
        Self {
            format_version: &record.format_version,
            name: &record.name,
            author: &record.author,
            description: &record.description,
            version: &record.version,
            state,
            signature_author: signed.then_some(record.signature_author.as_str()),
            signature: signed.then(|| hex::encode(record.signature)),
            pad_in_use: record.pad.iter().any(|&b| b != 0),
            payload_len,
        }
    }
}

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let is_package = file.extension().is_some_and(|e| e == files::PACKAGE_EXTENSION);
    let (record, payload_len) = if is_package {
        let (record, payload) = files::read_package(file)?;
        (record, Some(payload.len()))
    } else {
        (files::read_information(file)?, None)
    };

    let summary = RecordSummary::new(&record, payload_len);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", file.display());
    println!("  Format:      {}", summary.format_version);
    println!("  Name:        {}", summary.name);
    println!("  Author:      {}", summary.author);
    println!("  Version:     {}", summary.version);
    println!("  Description: {}", summary.description);
    println!("  State:       {}", summary.state);
    if let Some(signer) = summary.signature_author {
        println!("  Signed by:   {signer}");
    }
    if let Some(signature) = &summary.signature {
        println!("  Signature:   {}…", &signature[..32]);
    }
    if summary.pad_in_use {
        println!("  ⚠ reserved pad bytes are non-zero");
    }
    if let Some(len) = summary.payload_len {
        println!("  Payload:     {len} bytes");
    }

    Ok(())
}
