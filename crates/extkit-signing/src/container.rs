//! Record + payload containers.
//!
//! A container is one encoded record (exactly [`RECORD_LEN`] bytes)
//! immediately followed by the payload. There is no length prefix; the
//! payload is everything after the record.

use std::io::Read;
use std::io::Write;

use crate::error::ExtensionError;
use crate::error::Result;
use crate::record::ExtensionRecord;
use crate::record::RECORD_LEN;

/// Concatenate the encoded record and the payload.
///
/// The signature state is not checked: unsigned records are packed for
/// distribution to a signer, signed records as finished packages.
pub fn pack(record: &ExtensionRecord, payload: &[u8]) -> Result<Vec<u8>> {
    let encoded = record.encode()?;
    let mut out = Vec::with_capacity(RECORD_LEN + payload.len());
    out.extend_from_slice(&encoded);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Split a container into raw record bytes and payload.
///
/// The record bytes are not decoded; pass them to [`ExtensionRecord::decode`].
pub fn unpack(container: &[u8]) -> Result<([u8; RECORD_LEN], Vec<u8>)> {
    if container.len() < RECORD_LEN {
        return Err(ExtensionError::TooShort {
            len: container.len(),
            need: RECORD_LEN,
        });
    }
    let (head, payload) = container.split_at(RECORD_LEN);
    let mut record = [0u8; RECORD_LEN];
    record.copy_from_slice(head);
    Ok((record, payload.to_vec()))
}

/// Read exactly one record from `reader`.
pub fn read_record<R: Read>(mut reader: R) -> Result<ExtensionRecord> {
    let mut buf = Vec::with_capacity(RECORD_LEN);
    reader.by_ref().take(RECORD_LEN as u64 + 1).read_to_end(&mut buf)?;
    ExtensionRecord::decode(&buf)
}

/// Write the encoded record to `writer`.
pub fn write_record<W: Write>(mut writer: W, record: &ExtensionRecord) -> Result<()> {
    writer.write_all(&record.encode()?)?;
    writer.flush()?;
    Ok(())
}

/// Read a whole container from `reader` and decode its record.
pub fn read_container<R: Read>(mut reader: R) -> Result<(ExtensionRecord, Vec<u8>)> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let (record, payload) = unpack(&buf)?;
    Ok((ExtensionRecord::decode(&record)?, payload))
}

/// Write the record followed by the payload to `writer`.
pub fn write_container<W: Write>(mut writer: W, record: &ExtensionRecord, payload: &[u8]) -> Result<()> {
    writer.write_all(&record.encode()?)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExtensionRecord {
        ExtensionRecord {
            name: "Demo".into(),
            author: "Alice".into(),
            version: "1.0.0".into(),
            ..ExtensionRecord::new()
        }
    }

    #[test]
    fn unpack_inverts_pack() {
        for payload in [vec![], vec![0u8], vec![0xAB; 4096]] {
            let packed = pack(&record(), &payload).unwrap();
            assert_eq!(packed.len(), RECORD_LEN + payload.len());

            let (head, tail) = unpack(&packed).unwrap();
            assert_eq!(head, record().encode().unwrap());
            assert_eq!(tail, payload);
        }
    }

    #[test]
    fn unpack_rejects_short_input() {
        let err = unpack(&[0u8; RECORD_LEN - 1]).unwrap_err();
        assert!(matches!(err, ExtensionError::TooShort { len: 1023, need: 1024 }));
        assert!(unpack(&[0u8; RECORD_LEN]).is_ok());
    }

    #[test]
    fn unpack_does_not_interpret_record() {
        // Not a decodable record (non-ASCII name), but still splits.
        let mut container = vec![0u8; RECORD_LEN + 2];
        container[64] = 0xFF;
        let (head, payload) = unpack(&container).unwrap();
        assert!(ExtensionRecord::decode(&head).is_err());
        assert_eq!(payload, vec![0, 0]);
    }

    #[test]
    fn pack_propagates_encode_errors() {
        let mut bad = record();
        bad.name = "x".repeat(100);
        assert!(matches!(pack(&bad, b"p").unwrap_err(), ExtensionError::FieldTooLong { .. }));
    }

    #[test]
    fn stream_roundtrip() {
        let mut buf = Vec::new();
        write_container(&mut buf, &record(), b"payload").unwrap();
        let (decoded, payload) = read_container(buf.as_slice()).unwrap();
        assert_eq!(decoded, record());
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn read_record_requires_exact_length() {
        let mut buf = Vec::new();
        write_record(&mut buf, &record()).unwrap();
        assert_eq!(read_record(buf.as_slice()).unwrap(), record());

        let err = read_record(&buf[..512]).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidLength { actual: 512, .. }));

        buf.push(0);
        let err = read_record(buf.as_slice()).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidLength { actual: 1025, .. }));
    }
}
