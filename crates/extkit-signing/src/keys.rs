//! RSA key material, the two-line key file format and key sources.
//!
//! A key file is ASCII text with exactly two base64 lines: the author
//! identity, then the PKCS#1 DER key (`RSAPublicKey` or `RSAPrivateKey`).
//! Whether a file holds a public or a private key is decided by its suffix
//! (`.akey` / `.akyx`), never by its content.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;

use crate::error::ExtensionError;
use crate::error::Result;
use crate::files;
use crate::record;

/// Modulus size of generated keys. Matches the record's 256-byte signature field.
pub const RSA_KEY_BITS: usize = 2048;

/// Suffix of public key files.
pub const PUBLIC_KEY_EXTENSION: &str = "akey";

/// Suffix of private key files.
pub const PRIVATE_KEY_EXTENSION: &str = "akyx";

/// Whether a key may sign (private) or only verify (public).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

impl KeyKind {
    /// File suffix (without the dot) for this kind.
    pub fn extension(self) -> &'static str {
        match self {
            KeyKind::Public => PUBLIC_KEY_EXTENSION,
            KeyKind::Private => PRIVATE_KEY_EXTENSION,
        }
    }

    /// Kind declared by a path's suffix, if it has a key suffix.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            PUBLIC_KEY_EXTENSION => Some(KeyKind::Public),
            PRIVATE_KEY_EXTENSION => Some(KeyKind::Private),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Public => f.write_str("public"),
            KeyKind::Private => f.write_str("private"),
        }
    }
}

/// An authored RSA key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    /// Identity of the key owner; becomes the signature author when signing.
    pub author: String,
    /// PKCS#1 DER key bytes.
    pub key_bytes: Vec<u8>,
    pub kind: KeyKind,
}

// Keep private key bytes out of logs and panic messages.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("author", &self.author)
            .field("key_bytes", &format_args!("<{} bytes>", self.key_bytes.len()))
            .field("kind", &self.kind)
            .finish()
    }
}

impl KeyMaterial {
    pub fn new(author: impl Into<String>, key_bytes: Vec<u8>, kind: KeyKind) -> Self {
        Self {
            author: author.into(),
            key_bytes,
            kind,
        }
    }

    /// Fail with [`ExtensionError::KindMismatch`] unless this key is `expected`.
    pub fn ensure_kind(&self, expected: KeyKind) -> Result<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ExtensionError::KindMismatch {
                expected,
                actual: self.kind,
            })
        }
    }

    pub(crate) fn rsa_private_key(&self) -> Result<RsaPrivateKey> {
        self.ensure_kind(KeyKind::Private)?;
        RsaPrivateKey::from_pkcs1_der(&self.key_bytes)
            .map_err(|e| ExtensionError::CryptoFailure(format!("invalid private key: {e}")))
    }

    pub(crate) fn rsa_public_key(&self) -> Result<RsaPublicKey> {
        self.ensure_kind(KeyKind::Public)?;
        RsaPublicKey::from_pkcs1_der(&self.key_bytes)
            .map_err(|e| ExtensionError::CryptoFailure(format!("invalid public key: {e}")))
    }
}

/// A matched public/private key pair sharing one author.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: KeyMaterial,
    pub private: KeyMaterial,
}

/// Generate a new RSA-2048 key pair for `author`.
pub fn generate_keypair(author: &str) -> Result<KeyPair> {
    generate_keypair_with_bits(author, RSA_KEY_BITS)
}

pub(crate) fn generate_keypair_with_bits(author: &str, bits: usize) -> Result<KeyPair> {
    record::check_signature_author(author)?;
    if author == record::NOT_SIGNED {
        return Err(ExtensionError::ReservedAuthor(author.to_string()));
    }

    let private = RsaPrivateKey::new(&mut rand_core::OsRng, bits)
        .map_err(|e| ExtensionError::CryptoFailure(format!("key generation failed: {e}")))?;
    let public = private.to_public_key();

    let private_der = private
        .to_pkcs1_der()
        .map_err(|e| ExtensionError::CryptoFailure(format!("private key export failed: {e}")))?;
    let public_der = public
        .to_pkcs1_der()
        .map_err(|e| ExtensionError::CryptoFailure(format!("public key export failed: {e}")))?;

    Ok(KeyPair {
        public: KeyMaterial::new(author, public_der.as_bytes().to_vec(), KeyKind::Public),
        private: KeyMaterial::new(author, private_der.as_bytes().to_vec(), KeyKind::Private),
    })
}

/// Serialize `key` into the two-line key file text.
///
/// `kind` is the kind of container being written and must match the key.
pub fn encode_key(key: &KeyMaterial, kind: KeyKind) -> Result<String> {
    key.ensure_kind(kind)?;
    if !key.author.is_ascii() {
        return Err(ExtensionError::InvalidFieldByte { field: "key author" });
    }
    Ok(format!("{}\n{}\n", STANDARD.encode(key.author.as_bytes()), STANDARD.encode(&key.key_bytes)))
}

/// Parse two-line key file text as a key of `kind`.
pub fn decode_key(text: &str, kind: KeyKind) -> Result<KeyMaterial> {
    let mut lines = text.lines();
    let (Some(author_line), Some(key_line)) = (lines.next(), lines.next()) else {
        return Err(ExtensionError::MalformedKeyFile("expected an author line and a key line".into()));
    };
    if lines.any(|line| !line.trim().is_empty()) {
        return Err(ExtensionError::MalformedKeyFile("unexpected content after the key line".into()));
    }

    let author = STANDARD
        .decode(author_line.trim())
        .map_err(|e| ExtensionError::MalformedKeyFile(format!("author line is not base64: {e}")))?;
    if !author.is_ascii() {
        return Err(ExtensionError::MalformedKeyFile("author is not ASCII".into()));
    }
    let key_bytes = STANDARD
        .decode(key_line.trim())
        .map_err(|e| ExtensionError::MalformedKeyFile(format!("key line is not base64: {e}")))?;
    if key_bytes.is_empty() {
        return Err(ExtensionError::MalformedKeyFile("key line is empty".into()));
    }

    Ok(KeyMaterial::new(author.into_iter().map(char::from).collect::<String>(), key_bytes, kind))
}

fn check_key_path(path: &Path, kind: KeyKind) -> Result<()> {
    match KeyKind::from_path(path) {
        Some(actual) if actual == kind => Ok(()),
        Some(actual) => Err(ExtensionError::KindMismatch { expected: kind, actual }),
        None => Err(ExtensionError::InvalidFileName(format!(
            "{} (expected a .{} file)",
            path.display(),
            kind.extension()
        ))),
    }
}

/// Load a key file, requiring its suffix to declare `kind`.
pub fn load_key_file(path: &Path, kind: KeyKind) -> Result<KeyMaterial> {
    check_key_path(path, kind)?;
    let text = std::fs::read_to_string(path)?;
    decode_key(&text, kind)
}

/// Save a key file, requiring its suffix to declare `kind`.
///
/// Private key files get permissions 0o600 on Unix.
pub fn save_key_file(path: &Path, key: &KeyMaterial, kind: KeyKind) -> Result<()> {
    check_key_path(path, kind)?;
    let text = encode_key(key, kind)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if kind == KeyKind::Private {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }

    tracing::debug!(path = %path.display(), %kind, author = %key.author, "wrote key file");
    Ok(())
}

/// Write `<dir>/<author>.akey` and `<dir>/<author>.akyx`.
///
/// Returns the public and private key paths.
pub fn save_keypair(dir: &Path, pair: &KeyPair) -> Result<(PathBuf, PathBuf)> {
    let public_path = files::derived_path(dir, &pair.public.author, PUBLIC_KEY_EXTENSION)?;
    let private_path = files::derived_path(dir, &pair.private.author, PRIVATE_KEY_EXTENSION)?;
    save_key_file(&public_path, &pair.public, KeyKind::Public)?;
    save_key_file(&private_path, &pair.private, KeyKind::Private)?;
    Ok((public_path, private_path))
}

// ---------------------------------------------------------------------------
// Key sources
// ---------------------------------------------------------------------------

/// Supplies keys by signer identity.
///
/// Local directories and remote key directories are interchangeable.
pub trait KeySource {
    fn load_public_key(&self, identity: &str) -> Result<KeyMaterial>;
    fn load_private_key(&self, identity: &str) -> Result<KeyMaterial>;
}

/// Key files stored as `<dir>/<identity>.akey` and `<dir>/<identity>.akyx`.
#[derive(Debug, Clone)]
pub struct DirectoryKeySource {
    dir: PathBuf,
}

impl DirectoryKeySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the `kind` key file for `identity`.
    pub fn key_path(&self, identity: &str, kind: KeyKind) -> Result<PathBuf> {
        files::derived_path(&self.dir, identity, kind.extension())
    }
}

impl KeySource for DirectoryKeySource {
    fn load_public_key(&self, identity: &str) -> Result<KeyMaterial> {
        load_key_file(&self.key_path(identity, KeyKind::Public)?, KeyKind::Public)
    }

    fn load_private_key(&self, identity: &str) -> Result<KeyMaterial> {
        load_key_file(&self.key_path(identity, KeyKind::Private)?, KeyKind::Private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys;

    #[test]
    fn generated_keys_parse_as_their_kind() {
        let pair = test_keys::alice();
        assert_eq!(pair.public.author, "Alice");
        assert_eq!(pair.private.author, "Alice");
        assert!(pair.public.rsa_public_key().is_ok());
        assert!(pair.private.rsa_private_key().is_ok());
    }

    #[test]
    fn public_key_cannot_act_as_private() {
        let pair = test_keys::alice();
        let err = pair.public.rsa_private_key().unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::KindMismatch {
                expected: KeyKind::Private,
                actual: KeyKind::Public
            }
        ));
        let err = pair.private.rsa_public_key().unwrap_err();
        assert!(matches!(err, ExtensionError::KindMismatch { expected: KeyKind::Public, .. }));
    }

    #[test]
    fn encode_decode_roundtrip() {
        let key = KeyMaterial::new("Alice", vec![1, 2, 3, 250], KeyKind::Public);
        let text = encode_key(&key, KeyKind::Public).unwrap();
        assert_eq!(text, "QWxpY2U=\nAQID+g==\n");
        assert_eq!(decode_key(&text, KeyKind::Public).unwrap(), key);
    }

    #[test]
    fn encode_rejects_wrong_container_kind() {
        let key = KeyMaterial::new("Alice", vec![1], KeyKind::Private);
        let err = encode_key(&key, KeyKind::Public).unwrap_err();
        assert!(matches!(err, ExtensionError::KindMismatch { .. }));
    }

    #[test]
    fn encode_rejects_non_ascii_author() {
        let key = KeyMaterial::new("Zoë", vec![1], KeyKind::Public);
        let err = encode_key(&key, KeyKind::Public).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFieldByte { field: "key author" }));
    }

    #[test]
    fn decode_tags_requested_kind() {
        let key = decode_key("QWxpY2U=\nAQID\n", KeyKind::Private).unwrap();
        assert_eq!(key.kind, KeyKind::Private);
        assert_eq!(key.key_bytes, vec![1, 2, 3]);
    }

    #[test]
    fn decode_accepts_crlf_and_trailing_blank_lines() {
        let key = decode_key("QWxpY2U=\r\nAQID\r\n\r\n", KeyKind::Public).unwrap();
        assert_eq!(key.author, "Alice");
    }

    #[test]
    fn decode_rejects_malformed_text() {
        for text in ["", "QWxpY2U=", "QWxpY2U=\n", "not base64!\nAQID", "QWxpY2U=\n***", "QWxpY2U=\nAQID\nAQID", "QWxpY2U=\n\n", "Wm/r\nAQID"] {
            let err = decode_key(text, KeyKind::Public).unwrap_err();
            assert!(matches!(err, ExtensionError::MalformedKeyFile(_)), "accepted {text:?}");
        }
    }

    #[test]
    fn key_file_suffix_declares_kind() {
        let dir = tempfile::tempdir().unwrap();
        let key = KeyMaterial::new("Alice", vec![9, 9], KeyKind::Public);

        let err = save_key_file(&dir.path().join("alice.akyx"), &key, KeyKind::Public).unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::KindMismatch {
                expected: KeyKind::Public,
                actual: KeyKind::Private
            }
        ));

        let path = dir.path().join("alice.akey");
        save_key_file(&path, &key, KeyKind::Public).unwrap();
        assert_eq!(load_key_file(&path, KeyKind::Public).unwrap(), key);

        let err = load_key_file(&path, KeyKind::Private).unwrap_err();
        assert!(matches!(err, ExtensionError::KindMismatch { .. }));

        let err = load_key_file(&dir.path().join("alice.txt"), KeyKind::Public).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidFileName(_)));
    }

    #[test]
    fn loads_existing_akey_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Astrea.akey");
        std::fs::write(&path, "QXN0cmVh\nAQID\n").unwrap();

        let key = load_key_file(&path, KeyKind::Public).unwrap();
        assert_eq!(key.author, "Astrea");
        assert_eq!(key.key_bytes, vec![1, 2, 3]);
        assert_eq!(KeyKind::from_path(&dir.path().join("Astrea.akyx")), Some(KeyKind::Private));
    }

    #[cfg(unix)]
    #[test]
    fn private_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let (public_path, private_path) = save_keypair(dir.path(), test_keys::alice()).unwrap();
        let mode = std::fs::metadata(&private_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(public_path.ends_with("Alice.akey"));
    }

    #[test]
    fn directory_source_loads_saved_pair() {
        let dir = tempfile::tempdir().unwrap();
        let pair = test_keys::alice();
        save_keypair(dir.path(), pair).unwrap();

        let source = DirectoryKeySource::new(dir.path());
        assert_eq!(source.dir(), dir.path());
        assert_eq!(source.key_path("Alice", KeyKind::Private).unwrap(), dir.path().join("Alice.akyx"));
        assert_eq!(source.load_public_key("Alice").unwrap(), pair.public);
        assert_eq!(source.load_private_key("Alice").unwrap(), pair.private);
        assert!(matches!(source.load_public_key("Bob").unwrap_err(), ExtensionError::Io(_)));
        assert!(matches!(source.load_public_key("../Alice").unwrap_err(), ExtensionError::InvalidFileName(_)));
    }

    #[test]
    fn generate_rejects_bad_authors() {
        assert!(matches!(generate_keypair(record::NOT_SIGNED).unwrap_err(), ExtensionError::ReservedAuthor(_)));
        assert!(matches!(generate_keypair(&"a".repeat(64)).unwrap_err(), ExtensionError::FieldTooLong { .. }));
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let key = KeyMaterial::new("Alice", vec![0xAB; 4], KeyKind::Private);
        let shown = format!("{key:?}");
        assert!(shown.contains("<4 bytes>"));
        assert!(!shown.contains("171"));
    }
}
