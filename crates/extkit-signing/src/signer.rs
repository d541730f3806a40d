//! Record signing and unsigning.
//!
//! Signing computes an RSA signature over `SHA-512(payload)` with PKCS#1
//! v1.5 padding and stores it, together with the key's author, in the
//! record's signature fields. Both transitions return a new record and
//! leave the input untouched.

use rsa::Pkcs1v15Sign;
use sha2::Digest;
use sha2::Sha512;

use crate::error::ExtensionError;
use crate::error::Result;
use crate::error::StateError;
use crate::keys::KeyMaterial;
use crate::record;
use crate::record::ExtensionRecord;
use crate::record::SignatureState;
use crate::record::SIGNATURE_LEN;

/// The padding scheme shared by signing and verification.
pub(crate) fn signature_scheme() -> Pkcs1v15Sign {
    Pkcs1v15Sign::new::<Sha512>()
}

/// Sign an unsigned record against `payload` with a private key.
///
/// Deterministic: the same record, key and payload always produce the
/// same signature bytes.
pub fn sign_record(record: &ExtensionRecord, key: &KeyMaterial, payload: &[u8]) -> Result<ExtensionRecord> {
    if record.state()? == SignatureState::Signed {
        return Err(StateError::AlreadySigned.into());
    }

    let rsa_key = key.rsa_private_key()?;
    record::check_signature_author(&key.author)?;
    if key.author == record::NOT_SIGNED {
        return Err(ExtensionError::ReservedAuthor(key.author.clone()));
    }

    let digest = Sha512::digest(payload);
    let signature = rsa_key
        .sign(signature_scheme(), &digest)
        .map_err(|e| ExtensionError::CryptoFailure(format!("signing failed: {e}")))?;
    let signature: [u8; SIGNATURE_LEN] = signature.as_slice().try_into().map_err(|_| {
        ExtensionError::CryptoFailure(format!(
            "signature is {} bytes but the record holds {SIGNATURE_LEN}; an RSA-2048 key is required",
            signature.len()
        ))
    })?;

    let mut signed = record.clone();
    signed.signature_author = key.author.clone();
    signed.signature = signature;
    Ok(signed)
}

/// Strip the signature from a signed record.
///
/// The discarded signature is not kept anywhere; re-signing is the only
/// way back.
pub fn unsign_record(record: &ExtensionRecord) -> Result<ExtensionRecord> {
    if record.state()? == SignatureState::Unsigned {
        return Err(StateError::NotSigned.into());
    }

    let mut unsigned = record.clone();
    unsigned.clear_signature();
    Ok(unsigned)
}
