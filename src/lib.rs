//! Recoverbox - password-based encryption of recovery codes and other short secrets
//!
//! Text is encrypted with a key derived from a password (PBKDF2-HMAC-SHA256)
//! using NaCl secretbox (XSalsa20Poly1305), and travels as a single base64
//! envelope: `salt || nonce || tag || body`.

#![forbid(unsafe_code)]

pub mod cipher;
pub mod codec;
pub mod commands;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod password;
pub mod random;
pub mod store;

pub use codec::{RecoveryCodec, decrypt, encrypt};
pub use error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
