//! Signed record verification.

use sha2::Digest;
use sha2::Sha512;

use crate::error::Result;
use crate::error::StateError;
use crate::keys::KeyMaterial;
use crate::record::ExtensionRecord;
use crate::record::SignatureState;
use crate::signer::signature_scheme;

/// Verify a signed record against `payload` with a public key.
///
/// Returns `Ok(true)` only when:
/// 1. the record's signature author equals the key's author, and
/// 2. the RSA/SHA-512/PKCS#1 v1.5 signature over `payload` checks out.
///
/// A failed check is `Ok(false)`. Errors are reserved for an unsigned or
/// inconsistent record, a private key, or public key bytes that do not parse.
pub fn verify_record(record: &ExtensionRecord, key: &KeyMaterial, payload: &[u8]) -> Result<bool> {
    if record.state()? == SignatureState::Unsigned {
        return Err(StateError::NotSigned.into());
    }

    let rsa_key = key.rsa_public_key()?;
    if record.signature_author != key.author {
        return Ok(false);
    }

    let digest = Sha512::digest(payload);
    Ok(rsa_key.verify(signature_scheme(), &digest, &record.signature).is_ok())
}
