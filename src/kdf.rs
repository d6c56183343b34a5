//! Password-based key derivation (PBKDF2-HMAC-SHA256)

use std::fmt;

use sha2::Sha256;
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
///
/// Envelopes carry no version tag, so changing this makes every existing
/// envelope undecryptable. The golden vectors pin it.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Symmetric key material derived from a password and salt.
///
/// Wiped from memory on drop.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// Any password is accepted, including an empty one.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> DerivedKey {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key[..]);
    DerivedKey(key)
}
