//! The fixed 1024-byte extension record.
//!
//! Layout (offsets in bytes, all strings ASCII and zero-padded):
//!
//! | offset | width | field            |
//! |--------|-------|------------------|
//! | 0      | 64    | format version   |
//! | 64     | 64    | name             |
//! | 128    | 64    | author           |
//! | 192    | 320   | description      |
//! | 512    | 64    | version          |
//! | 576    | 128   | reserved pad     |
//! | 704    | 64    | signature author |
//! | 768    | 256   | signature        |
//!
//! A string field holds at most `width - 1` bytes so that at least one
//! terminating zero byte is always written.

use std::ops::Range;

use crate::error::ExtensionError;
use crate::error::Result;
use crate::error::StateError;

/// Encoded size of an [`ExtensionRecord`].
pub const RECORD_LEN: usize = 1024;

/// Width of the reserved pad region.
pub const PAD_LEN: usize = 128;

/// Width of the signature region (one RSA-2048 signature).
pub const SIGNATURE_LEN: usize = 256;

/// Signature author marking a record as unsigned.
pub const NOT_SIGNED: &str = "NOT_SIGNED";

#[derive(Clone, Copy)]
struct Field {
    name: &'static str,
    offset: usize,
    width: usize,
}

impl Field {
    const fn range(self) -> Range<usize> {
        self.offset..self.offset + self.width
    }
}

const FORMAT_VERSION: Field = Field {
    name: "format_version",
    offset: 0,
    width: 64,
};
const NAME: Field = Field {
    name: "name",
    offset: 64,
    width: 64,
};
const AUTHOR: Field = Field {
    name: "author",
    offset: 128,
    width: 64,
};
const DESCRIPTION: Field = Field {
    name: "description",
    offset: 192,
    width: 320,
};
const VERSION: Field = Field {
    name: "version",
    offset: 512,
    width: 64,
};
const PAD: Field = Field {
    name: "pad",
    offset: 576,
    width: PAD_LEN,
};
const SIGNATURE_AUTHOR: Field = Field {
    name: "signature_author",
    offset: 704,
    width: 64,
};
const SIGNATURE: Field = Field {
    name: "signature",
    offset: 768,
    width: SIGNATURE_LEN,
};

const _: () = assert!(SIGNATURE.offset + SIGNATURE.width == RECORD_LEN);

/// Longest string accepted in the signature author field.
pub const MAX_SIGNATURE_AUTHOR_LEN: usize = SIGNATURE_AUTHOR.width - 1;

/// Signature state derived from the signature author and signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureState {
    Unsigned,
    Signed,
}

/// Descriptor of an extension, encoded as exactly [`RECORD_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRecord {
    /// Free-form record schema version.
    pub format_version: String,
    /// Display name, also used to derive output file names.
    pub name: String,
    pub author: String,
    pub description: String,
    /// The extension's own version string.
    pub version: String,
    /// Reserved, zero when unused.
    pub pad: [u8; PAD_LEN],
    /// Signer identity, or [`NOT_SIGNED`].
    pub signature_author: String,
    /// Raw signature, all zero when unsigned.
    pub signature: [u8; SIGNATURE_LEN],
}

impl Default for ExtensionRecord {
    fn default() -> Self {
        Self {
            format_version: String::new(),
            name: String::new(),
            author: String::new(),
            description: String::new(),
            version: String::new(),
            pad: [0; PAD_LEN],
            signature_author: NOT_SIGNED.to_string(),
            signature: [0; SIGNATURE_LEN],
        }
    }
}

impl ExtensionRecord {
    /// An empty, unsigned record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay the record out into its fixed 1024-byte form.
    pub fn encode(&self) -> Result<[u8; RECORD_LEN]> {
        let mut buf = [0u8; RECORD_LEN];
        put_str(&mut buf, FORMAT_VERSION, &self.format_version)?;
        put_str(&mut buf, NAME, &self.name)?;
        put_str(&mut buf, AUTHOR, &self.author)?;
        put_str(&mut buf, DESCRIPTION, &self.description)?;
        put_str(&mut buf, VERSION, &self.version)?;
        buf[PAD.range()].copy_from_slice(&self.pad);
        put_str(&mut buf, SIGNATURE_AUTHOR, &self.signature_author)?;
        buf[SIGNATURE.range()].copy_from_slice(&self.signature);
        Ok(buf)
    }

    /// Parse a record from exactly [`RECORD_LEN`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_LEN {
            return Err(ExtensionError::InvalidLength {
                expected: RECORD_LEN,
                actual: bytes.len(),
            });
        }

        let mut pad = [0u8; PAD_LEN];
        pad.copy_from_slice(&bytes[PAD.range()]);
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&bytes[SIGNATURE.range()]);

        Ok(Self {
            format_version: get_str(bytes, FORMAT_VERSION)?,
            name: get_str(bytes, NAME)?,
            author: get_str(bytes, AUTHOR)?,
            description: get_str(bytes, DESCRIPTION)?,
            version: get_str(bytes, VERSION)?,
            pad,
            signature_author: get_str(bytes, SIGNATURE_AUTHOR)?,
            signature,
        })
    }

    /// Derive the signature state.
    ///
    /// Unsigned requires the sentinel author *and* an all-zero signature;
    /// signed requires neither. Anything else is rejected.
    pub fn state(&self) -> Result<SignatureState, StateError> {
        let sentinel = self.signature_author == NOT_SIGNED;
        let zeroed = self.signature.iter().all(|&b| b == 0);
        match (sentinel, zeroed) {
            (true, true) => Ok(SignatureState::Unsigned),
            (false, false) => Ok(SignatureState::Signed),
            _ => Err(StateError::Inconsistent),
        }
    }

    pub fn is_signed(&self) -> Result<bool, StateError> {
        Ok(self.state()? == SignatureState::Signed)
    }

    /// Clear the signature fields back to the unsigned markers.
    pub(crate) fn clear_signature(&mut self) {
        self.signature_author = NOT_SIGNED.to_string();
        self.signature = [0; SIGNATURE_LEN];
    }
}

/// Check that `value` can be stored in `field`.
pub(crate) fn check_str(field: &'static str, width: usize, value: &str) -> Result<()> {
    let max = width - 1;
    if value.len() > max {
        return Err(ExtensionError::FieldTooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    if value.bytes().any(|b| b == 0 || !b.is_ascii()) {
        return Err(ExtensionError::InvalidFieldByte { field });
    }
    Ok(())
}

/// Validate a signer identity for the signature author field.
pub(crate) fn check_signature_author(author: &str) -> Result<()> {
    check_str(SIGNATURE_AUTHOR.name, SIGNATURE_AUTHOR.width, author)
}

fn put_str(buf: &mut [u8; RECORD_LEN], field: Field, value: &str) -> Result<()> {
    check_str(field.name, field.width, value)?;
    buf[field.offset..field.offset + value.len()].copy_from_slice(value.as_bytes());
    Ok(())
}

fn get_str(buf: &[u8], field: Field) -> Result<String> {
    let raw = &buf[field.range()];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = &raw[..end];
    if !text.is_ascii() {
        return Err(ExtensionError::InvalidFieldByte { field: field.name });
    }
    Ok(text.iter().copied().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn demo_record() -> ExtensionRecord {
        ExtensionRecord {
            format_version: "1.0".into(),
            name: "Demo".into(),
            author: "Alice".into(),
            description: "A demonstration extension".into(),
            version: "0.3.1".into(),
            ..ExtensionRecord::new()
        }
    }

    #[test]
    fn new_record_is_unsigned() {
        let record = ExtensionRecord::new();
        assert_eq!(record.signature_author, NOT_SIGNED);
        assert_eq!(record.state().unwrap(), SignatureState::Unsigned);
        assert!(!record.is_signed().unwrap());
    }

    #[test]
    fn fields_land_at_fixed_offsets() {
        let bytes = demo_record().encode().unwrap();
        assert_eq!(bytes.len(), RECORD_LEN);
        assert_eq!(&bytes[0..4], b"1.0\0");
        assert_eq!(&bytes[64..69], b"Demo\0");
        assert_eq!(&bytes[128..134], b"Alice\0");
        assert_eq!(&bytes[192..196], b"A de");
        assert_eq!(&bytes[512..518], b"0.3.1\0");
        assert!(bytes[576..704].iter().all(|&b| b == 0));
        assert_eq!(&bytes[704..715], b"NOT_SIGNED\0");
        assert!(bytes[768..].iter().all(|&b| b == 0));
    }

    #[test]
    fn field_width_limit_reserves_terminator() {
        let mut record = demo_record();
        record.name = "n".repeat(63);
        assert!(record.encode().is_ok());

        record.name = "n".repeat(64);
        let err = record.encode().unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::FieldTooLong {
                field: "name",
                max: 63,
                actual: 64
            }
        ));
    }

    #[test]
    fn description_limit() {
        let mut record = demo_record();
        record.description = "d".repeat(319);
        assert!(record.encode().is_ok());

        record.description.push('d');
        let err = record.encode().unwrap_err();
        assert!(matches!(err, ExtensionError::FieldTooLong { field: "description", .. }));
    }

    #[test]
    fn non_ascii_and_nul_rejected() {
        let mut record = demo_record();
        record.author = "Zoë".into();
        let err = record.encode().unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFieldByte { field: "author" }));

        let mut record = demo_record();
        record.version = "1\02".into();
        let err = record.encode().unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFieldByte { field: "version" }));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        for len in [0, 1023, 1025] {
            let err = ExtensionRecord::decode(&vec![0u8; len]).unwrap_err();
            assert!(matches!(
                err,
                ExtensionError::InvalidLength { expected: 1024, actual } if actual == len
            ));
        }
    }

    #[test]
    fn decode_stops_at_first_terminator() {
        let mut bytes = demo_record().encode().unwrap();
        // Garbage after the terminator is ignored.
        bytes[64 + 10] = b'x';
        let record = ExtensionRecord::decode(&bytes).unwrap();
        assert_eq!(record.name, "Demo");
    }

    #[test]
    fn decode_reads_unterminated_field_to_full_width() {
        let mut bytes = demo_record().encode().unwrap();
        bytes[128..192].fill(b'a');
        let record = ExtensionRecord::decode(&bytes).unwrap();
        assert_eq!(record.author, "a".repeat(64));
    }

    #[test]
    fn decode_rejects_non_ascii() {
        let mut bytes = demo_record().encode().unwrap();
        bytes[0] = 0xC3;
        let err = ExtensionRecord::decode(&bytes).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFieldByte { field: "format_version" }));
    }

    #[test]
    fn pad_is_carried_verbatim() {
        let mut record = demo_record();
        record.pad[0] = 0xAA;
        record.pad[PAD_LEN - 1] = 0x55;
        let decoded = ExtensionRecord::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded.pad, record.pad);
    }

    #[test]
    fn state_requires_both_markers() {
        let mut record = demo_record();
        record.signature[10] = 1;
        assert_eq!(record.state(), Err(StateError::Inconsistent));

        let mut record = demo_record();
        record.signature_author = "Alice".into();
        assert_eq!(record.state(), Err(StateError::Inconsistent));

        record.signature[0] = 1;
        assert_eq!(record.state(), Ok(SignatureState::Signed));
    }

    #[test]
    fn empty_signature_author_is_not_unsigned() {
        let mut record = demo_record();
        record.signature_author = String::new();
        assert_eq!(record.state(), Err(StateError::Inconsistent));
    }

    fn ascii(max: usize) -> impl Strategy<Value = String> {
        proptest::string::string_regex(&format!("[ -~]{{0,{max}}}")).unwrap()
    }

    fn any_record() -> impl Strategy<Value = ExtensionRecord> {
        (
            (ascii(63), ascii(63), ascii(63), ascii(319), ascii(63)),
            proptest::collection::vec(any::<u8>(), PAD_LEN),
            ascii(63),
            proptest::collection::vec(any::<u8>(), SIGNATURE_LEN),
        )
            .prop_map(|((format_version, name, author, description, version), pad, signature_author, signature)| {
                ExtensionRecord {
                    format_version,
                    name,
                    author,
                    description,
                    version,
                    pad: pad.try_into().unwrap(),
                    signature_author,
                    signature: signature.try_into().unwrap(),
                }
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(record in any_record()) {
            let bytes = record.encode().unwrap();
            prop_assert_eq!(bytes.len(), RECORD_LEN);
            prop_assert_eq!(ExtensionRecord::decode(&bytes).unwrap(), record);
        }
    }
}
