use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee that the error is not, for
    /// example, due to a user error - merely that it cannot be confidently
    /// determined by the code.
    Internal,

    /// The user provided invalid input (empty data, a malformed envelope, the
    /// wrong password) or asked for something impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// There was nothing to encrypt or decrypt.
    EmptyInput,
    /// The envelope text is not valid base64.
    EnvelopeDecode,
    /// The decoded envelope is too short to contain a salt.
    EnvelopeTruncated,
    /// Authentication failed. Either the password is wrong or the data was
    /// corrupted or tampered with; the two are deliberately not told apart.
    AuthenticationFailed,
    /// The password could not be obtained from the configured reader.
    PasswordUnavailable,
    /// The password and its confirmation differ.
    PasswordMismatch,
    /// Text was expected but the bytes are not valid UTF-8.
    NotUtf8,
    /// The random byte source failed to produce output.
    RandomnessUnavailable,
    /// Sealing a payload failed.
    CipherFailure,
    /// Interaction with the system clipboard failed.
    Clipboard,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct RecoverboxError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag. Any code consuming errors MUST
    /// handle the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl RecoverboxError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Shorthand for the one authentication failure message used everywhere.
    pub(crate) fn authentication_failed() -> Self {
        Self::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "wrong password or corrupted data",
        )
    }

    /// Shorthand for an I/O failure attributed to `category`.
    pub(crate) fn io(
        category: ErrorCategory,
        msg: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::with_kind_and_source(category, ErrorKind::Io, msg, source)
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// True for any of the malformed-envelope kinds.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self.kind,
            Some(ErrorKind::EnvelopeDecode | ErrorKind::EnvelopeTruncated)
        )
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RecoverboxError>;
