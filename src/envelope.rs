//! Envelope text format
//!
//! An envelope is the standard-alphabet, padded base64 encoding of
//! `salt(16) || ciphertext`, where the ciphertext is exactly what
//! [`crate::cipher::seal`] produced. The encoded text is free of whitespace,
//! so it survives copying through clipboards and text files.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
use crate::kdf::SALT_LEN;

/// Encode `salt || ciphertext` as envelope text.
pub fn pack(salt: &[u8; SALT_LEN], ciphertext: &[u8]) -> String {
    let mut body = Vec::with_capacity(SALT_LEN + ciphertext.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(ciphertext);
    STANDARD.encode(body)
}

/// Decode envelope text, splitting off the fixed-size salt prefix.
pub fn unpack(text: &str) -> Result<([u8; SALT_LEN], Vec<u8>)> {
    let mut body = STANDARD.decode(text).map_err(|e| {
        RecoverboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::EnvelopeDecode,
            "base64 decoding failed",
            e,
        )
    })?;

    if body.len() < SALT_LEN {
        return Err(RecoverboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::EnvelopeTruncated,
            format!(
                "envelope holds {} bytes, fewer than the {}-byte salt; likely truncated",
                body.len(),
                SALT_LEN
            ),
        ));
    }

    let ciphertext = body.split_off(SALT_LEN);
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&body);
    Ok((salt, ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_output() {
        let salt: [u8; SALT_LEN] = core::array::from_fn(|i| i as u8);
        let packed = pack(&salt, &[0xFB, 0xFF, 0xBF]);

        // Standard alphabet with padding, not the URL-safe one.
        assert_eq!(packed, "AAECAwQFBgcICQoLDA0OD/v/vw==");
    }

    #[test]
    fn test_salt_only() {
        let salt = [9u8; SALT_LEN];
        let (unpacked_salt, ciphertext) = unpack(&pack(&salt, b"")).unwrap();

        assert_eq!(unpacked_salt, salt);
        assert!(ciphertext.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let err = unpack("").expect_err("expected truncation error");
        assert_eq!(err.kind, Some(ErrorKind::EnvelopeTruncated));
    }

    #[test]
    fn test_too_short() {
        // 15 decoded bytes.
        let text = STANDARD.encode([0u8; SALT_LEN - 1]);
        let err = unpack(&text).expect_err("expected truncation error");

        assert_eq!(err.kind, Some(ErrorKind::EnvelopeTruncated));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_bad_base64() {
        let err = unpack("this-is-not-valid-encrypted-data!!!").expect_err("expected decode error");
        assert_eq!(err.kind, Some(ErrorKind::EnvelopeDecode));
    }

    #[test]
    fn test_url_safe_alphabet_rejected() {
        let err = unpack("AAECAwQFBgcICQoLDA0OD_v_vw==").expect_err("expected decode error");
        assert_eq!(err.kind, Some(ErrorKind::EnvelopeDecode));
    }

    #[test]
    fn test_no_whitespace() {
        let packed = pack(&[0xFFu8; SALT_LEN], &[0u8; 200]);

        assert!(!packed.contains(' '));
        assert!(!packed.contains('\n'));
        assert!(!packed.contains('\t'));
    }

    proptest! {
        #[test]
        fn pack_unpack_splits_exactly(
            salt in any::<[u8; SALT_LEN]>(),
            ciphertext in proptest::collection::vec(any::<u8>(), 0..=512),
        ) {
            let (s, c) = unpack(&pack(&salt, &ciphertext)).unwrap();
            prop_assert_eq!(s, salt);
            prop_assert_eq!(c, ciphertext);
        }
    }
}
