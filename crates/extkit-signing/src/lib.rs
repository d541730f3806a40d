//! Fixed-layout extension records and RSA signing of extension payloads.
//!
//! An [`ExtensionRecord`] describes an extension and encodes to exactly
//! 1024 bytes. Signing binds a record to a binary payload by storing an
//! RSA/SHA-512/PKCS#1 v1.5 signature over the payload in the record; a
//! package is the encoded record followed by the payload.
//!
//! # Signing
//!
//! ```no_run
//! use extkit_signing::{container, keys, signer, verifier, ExtensionRecord};
//!
//! let pair = keys::generate_keypair("Alice")?;
//! let record = ExtensionRecord {
//!     name: "Demo".into(),
//!     author: "Alice".into(),
//!     ..ExtensionRecord::new()
//! };
//! let payload = [0x01, 0x02, 0x03, 0x04];
//!
//! let signed = signer::sign_record(&record, &pair.private, &payload)?;
//! let package = container::pack(&signed, &payload)?;
//!
//! let (head, body) = container::unpack(&package)?;
//! let loaded = ExtensionRecord::decode(&head)?;
//! assert!(verifier::verify_record(&loaded, &pair.public, &body)?);
//! # Ok::<(), extkit_signing::ExtensionError>(())
//! ```
//!
//! # States
//!
//! A record is unsigned when its signature author is [`record::NOT_SIGNED`]
//! and its signature bytes are all zero, and signed when neither holds.
//! [`signer::sign_record`], [`signer::unsign_record`] and
//! [`verifier::verify_record`] check the state before doing anything else.

pub mod container;
pub mod error;
pub mod files;
pub mod keys;
pub mod record;
pub mod signer;
pub mod verifier;

#[cfg(test)]
mod test_keys;

pub use error::ExtensionError;
pub use error::StateError;
pub use keys::KeyKind;
pub use keys::KeyMaterial;
pub use keys::KeySource;
pub use record::ExtensionRecord;
pub use record::SignatureState;
