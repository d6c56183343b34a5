//! Encrypt and decrypt commands
//!
//! Each command reads from a source [`TextStore`], obtains a password, runs
//! the [`RecoveryCodec`] and writes the result to a sink store. Progress
//! messages go to `out`. Nothing is written to the sink unless the whole
//! operation succeeds. Once the result is reported the sink may keep the
//! command alive (see [`TextStore::hold`]).

use std::io::{self, Write};

use zeroize::Zeroizing;

use crate::codec::RecoveryCodec;
use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
use crate::password::{PASSWORD_PROMPT, PasswordReader, read_confirmed_password};
use crate::store::TextStore;

#[derive(Debug, Default, Clone, Copy)]
pub struct EncryptOptions {
    /// Report only the length of the input instead of echoing it.
    pub hide_input: bool,
}

/// Encrypt the text in `source` and store the envelope in `sink`.
///
/// The password is read twice and both entries must match.
pub fn encrypt(
    codec: &RecoveryCodec,
    source: &mut dyn TextStore,
    sink: &mut dyn TextStore,
    passwords: &mut dyn PasswordReader,
    options: EncryptOptions,
    out: &mut dyn Write,
) -> Result<()> {
    tracing::debug!(%source, %sink, "encrypt");
    let plaintext = Zeroizing::new(source.read_text()?);

    if options.hide_input {
        writeln!(out, "Found {} characters", plaintext.chars().count()).map_err(report_error)?;
    } else {
        writeln!(out, "{}", plaintext.as_str()).map_err(report_error)?;
    }

    let password = read_confirmed_password(passwords)?;
    let envelope = codec
        .encrypt(plaintext.as_bytes(), &password)
        .map_err(|e| e.with_context("encryption failed"))?;
    sink.write_text(&envelope)?;

    writeln!(out, "Encrypted data {}", sink.describe_write()).map_err(report_error)?;
    out.flush().map_err(report_error)?;
    sink.hold()
}

/// Decrypt the envelope in `source` and store the plaintext in `sink`.
pub fn decrypt(
    codec: &RecoveryCodec,
    source: &mut dyn TextStore,
    sink: &mut dyn TextStore,
    passwords: &mut dyn PasswordReader,
    out: &mut dyn Write,
) -> Result<()> {
    tracing::debug!(%source, %sink, "decrypt");
    let envelope = source.read_text()?;
    let password = passwords.read_password(PASSWORD_PROMPT)?;

    let plaintext = codec
        .decrypt(&envelope, &password)
        .map_err(|e| e.with_context("decryption failed"))?;
    let text = std::str::from_utf8(&plaintext).map_err(|e| {
        RecoverboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::NotUtf8,
            "decrypted data is not valid UTF-8 text",
            e,
        )
    })?;
    sink.write_text(text)?;

    writeln!(out, "Decrypted data {}", sink.describe_write()).map_err(report_error)?;
    writeln!(out, "{} characters restored", text.chars().count()).map_err(report_error)?;
    out.flush().map_err(report_error)?;
    sink.hold()
}

fn report_error(e: io::Error) -> RecoverboxError {
    RecoverboxError::io(ErrorCategory::Internal, "failed to write output", e)
}
