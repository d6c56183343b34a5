//! Authenticated encryption using NaCl secretbox (XSalsa20Poly1305)
//!
//! The sealed layout is:
//! - nonce: 24 bytes, fresh for every call to [`seal`]
//! - tag: 16 bytes (Poly1305 MAC)
//! - body: same length as the plaintext

use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Nonce, XSalsa20Poly1305};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
use crate::kdf::DerivedKey;
use crate::random::RandomSource;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 24;

/// Length of the Poly1305 authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Shortest possible output of [`seal`] (empty plaintext).
pub const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Encrypt and authenticate `plaintext` under `key` with a nonce drawn from `random`.
pub fn seal(key: &DerivedKey, plaintext: &[u8], random: &dyn RandomSource) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    random.fill(&mut nonce)?;

    let cipher = XSalsa20Poly1305::new(key.as_bytes().into());
    let sealed_box = cipher
        .encrypt(&Nonce::from(nonce), plaintext)
        .map_err(|e| {
            RecoverboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                format!("encryption failed: {}", e),
            )
        })?;

    let mut output = Vec::with_capacity(NONCE_LEN + sealed_box.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&sealed_box);
    Ok(output)
}

/// Verify and decrypt the output of [`seal`].
///
/// Truncated input, a wrong key and tampered data all fail with the same
/// [`ErrorKind::AuthenticationFailed`] error.
pub fn open(key: &DerivedKey, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < MIN_SEALED_LEN {
        tracing::debug!(len = ciphertext.len(), "sealed data shorter than nonce and tag");
        return Err(RecoverboxError::authentication_failed());
    }
    let (nonce, sealed_box) = ciphertext.split_at(NONCE_LEN);

    let cipher = XSalsa20Poly1305::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed_box)
        .map_err(|_| RecoverboxError::authentication_failed())?;

    Ok(Zeroizing::new(plaintext))
}
