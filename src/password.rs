//! Password reading functionality

use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use zeroize::Zeroizing;

/// Trait for reading passwords from various sources
pub trait PasswordReader {
    /// Read a password as arbitrary bytes (not necessarily UTF-8)
    ///
    /// `prompt` is shown to the user by interactive readers and ignored by
    /// the rest. Returns the password wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed password (for testing)
pub struct ConstantPasswordReader {
    password: Zeroizing<Vec<u8>>,
}

impl ConstantPasswordReader {
    pub fn new(password: Vec<u8>) -> Self {
        Self {
            password: Zeroizing::new(password),
        }
    }
}

impl PasswordReader for ConstantPasswordReader {
    fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.password).clone()))
    }
}

/// Reads one password per line from any buffered source
///
/// The line terminator (`\n` or `\r\n`) is not part of the password.
pub struct LinePasswordReader<R> {
    reader: R,
}

impl<R: BufRead> LinePasswordReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> PasswordReader for LinePasswordReader<R> {
    fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        let mut line = Zeroizing::new(Vec::new());
        let n = self.reader.read_until(b'\n', &mut line).map_err(|e| {
            RecoverboxError::io(
                ErrorCategory::Internal,
                "error reading password",
                e,
            )
        })?;
        if n == 0 {
            return Err(RecoverboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "no password given: input ended",
            ));
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Reads password from terminal with no echo
pub struct TerminalPasswordReader;

impl TerminalPasswordReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPasswordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordReader for TerminalPasswordReader {
    /// Read password from terminal.
    ///
    /// Note: Terminal input is limited to UTF-8 due to rpassword library constraints.
    /// For non-UTF-8 passwords, use --password-stdin instead.
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(RecoverboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "cannot read password from terminal - stdin is not a terminal",
            ));
        }

        let mut stderr = io::stderr();
        stderr
            .write_all(prompt.as_bytes())
            .and_then(|()| stderr.flush())
            .map_err(|e| {
                RecoverboxError::io(
                    ErrorCategory::Internal,
                    "failed to write prompt",
                    e,
                )
            })?;

        // Read password *without echo*
        // Note: rpassword returns String (UTF-8 only), not zeroized
        let password = rpassword::read_password().map_err(|e| {
            RecoverboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                "failure reading password",
                e,
            )
        })?;

        Ok(Zeroizing::new(password.into_bytes()))
    }
}

/// Prompt used for a single password entry.
pub const PASSWORD_PROMPT: &str = "Password: ";

/// Prompt used for the confirming second entry.
pub const CONFIRM_PROMPT: &str = "Repeat for confirmation: ";

/// Reads a password twice and requires both entries to match.
pub fn read_confirmed_password(reader: &mut dyn PasswordReader) -> Result<Zeroizing<Vec<u8>>> {
    let password = reader.read_password(PASSWORD_PROMPT)?;
    let repeated = reader.read_password(CONFIRM_PROMPT)?;
    if *password != *repeated {
        return Err(RecoverboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::PasswordMismatch,
            "the two entered passwords do not match",
        ));
    }
    Ok(password)
}
