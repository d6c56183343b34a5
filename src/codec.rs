//! Password-based encryption of short text payloads
//!
//! [`RecoveryCodec`] ties together key derivation, authenticated encryption
//! and the envelope format. Every call is independent: passwords, salts and
//! derived keys live only for the duration of one call.

use zeroize::Zeroizing;

use crate::cipher;
use crate::envelope;
use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
use crate::kdf::{SALT_LEN, derive_key};
use crate::random::{OsRandom, RandomSource};

pub struct RecoveryCodec {
    random: Box<dyn RandomSource>,
}

impl RecoveryCodec {
    /// A codec drawing salts and nonces from the operating system CSPRNG.
    pub fn new() -> Self {
        Self::with_random(Box::new(OsRandom))
    }

    /// A codec drawing salts and nonces from `random`.
    pub fn with_random(random: Box<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Encrypt `plaintext` under `password`, returning envelope text.
    ///
    /// Output differs on every call, even for identical inputs.
    pub fn encrypt(&self, plaintext: &[u8], password: &[u8]) -> Result<String> {
        if plaintext.is_empty() {
            return Err(RecoverboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::EmptyInput,
                "nothing to encrypt: input is empty",
            ));
        }

        let mut salt = [0u8; SALT_LEN];
        self.random.fill(&mut salt)?;
        let key = derive_key(password, &salt);
        let ciphertext = cipher::seal(&key, plaintext, self.random.as_ref())?;

        tracing::debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "sealed payload"
        );
        Ok(envelope::pack(&salt, &ciphertext))
    }

    /// Decrypt envelope text produced by [`RecoveryCodec::encrypt`].
    ///
    /// Leading and trailing whitespace around the envelope is ignored. A wrong
    /// password and corrupted data both fail with
    /// [`ErrorKind::AuthenticationFailed`].
    pub fn decrypt(&self, text: &str, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RecoverboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::EmptyInput,
                "nothing to decrypt: input is empty",
            ));
        }

        let (salt, ciphertext) = envelope::unpack(text)?;
        let key = derive_key(password, &salt);
        let plaintext = cipher::open(&key, &ciphertext)?;

        tracing::debug!(plaintext_len = plaintext.len(), "opened payload");
        Ok(plaintext)
    }
}

impl Default for RecoveryCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Encrypt with a fresh OS-backed codec. See [`RecoveryCodec::encrypt`].
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<String> {
    RecoveryCodec::new().encrypt(plaintext, password)
}

/// Decrypt with a fresh OS-backed codec. See [`RecoveryCodec::decrypt`].
pub fn decrypt(text: &str, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    RecoveryCodec::new().decrypt(text, password)
}
