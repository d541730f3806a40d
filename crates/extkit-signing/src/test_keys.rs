//! Shared RSA keys for unit tests. Generated once per test binary.

use std::sync::OnceLock;

use crate::keys::generate_keypair;
use crate::keys::KeyPair;

/// RSA-2048 pair authored "Alice".
pub fn alice() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_keypair("Alice").unwrap())
}

/// A second, unrelated RSA-2048 pair that is also authored "Alice".
pub fn alice_impostor() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_keypair("Alice").unwrap())
}
