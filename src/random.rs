//! Random byte sources
//!
//! Salts and nonces are drawn through the [`RandomSource`] trait so that
//! test vectors can be produced with fixed bytes while production code uses
//! the operating system's CSPRNG.

use std::sync::Mutex;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};

/// A source of random bytes, shareable across threads.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// The operating system's cryptographically secure random number generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            RecoverboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::RandomnessUnavailable,
                "system random number generator failed",
                e,
            )
        })
    }
}

/// Replays a fixed byte sequence, in order, across calls.
///
/// This is ONLY for generating deterministic output in tests. Never use it
/// to protect real data.
#[derive(Debug)]
pub struct FixedRandom {
    bytes: Mutex<Vec<u8>>,
}

impl FixedRandom {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(bytes.into()),
        }
    }
}

impl RandomSource for FixedRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        let mut bytes = self.bytes.lock().map_err(|_| {
            RecoverboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::RandomnessUnavailable,
                "fixed random source poisoned",
            )
        })?;
        if bytes.len() < buf.len() {
            return Err(RecoverboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::RandomnessUnavailable,
                format!(
                    "fixed random source exhausted: wanted {} bytes, {} left",
                    buf.len(),
                    bytes.len()
                ),
            ));
        }
        buf.copy_from_slice(&bytes[..buf.len()]);
        bytes.drain(..buf.len());
        Ok(())
    }
}
