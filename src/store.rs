//! Sources and sinks for envelope and plaintext text
//!
//! Commands read their input from a [`TextStore`] and write their result to
//! another one: a file, the system clipboard, or memory.

use crate::error::{ErrorCategory, ErrorKind, RecoverboxError, Result};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(feature = "clipboard")]
use std::time::Duration;

#[cfg(feature = "clipboard")]
use zeroize::Zeroizing;

/// Seconds the clipboard keeps serving written text on Linux, unless configured.
pub const DEFAULT_CLIPBOARD_HOLD_SECS: u64 = 60;

pub trait TextStore: fmt::Display {
    /// Read the stored text.
    ///
    /// Fails with [`ErrorKind::EmptyInput`] when there is nothing but whitespace.
    fn read_text(&mut self) -> Result<String>;

    /// Replace the stored text.
    fn write_text(&mut self, text: &str) -> Result<()>;

    /// Where the last write went, phrased to follow "Encrypted data".
    fn describe_write(&self) -> String {
        format!("saved to {}", self)
    }

    /// Keep written text available after the result has been reported.
    ///
    /// Stores whose content outlives the process have nothing to do here.
    fn hold(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A text file on disk.
///
/// Reads trim surrounding whitespace. Writes are atomic and, on Unix systems,
/// leave the file with mode 0o600 (read/write for owner only).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl TextStore for FileStore {
    fn read_text(&mut self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|e| read_error(&self.path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            RecoverboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::NotUtf8,
                format!("{} is not valid UTF-8", self.path.display()),
                e,
            )
        })?;
        let text = non_empty(text.trim(), &self.path.display().to_string())?;
        Ok(text.to_owned())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        write_file_atomic(&self.path, text.as_bytes())
            .map_err(|e| e.with_context(format!("failed to write to {}", self.path.display())))
    }
}

/// The system clipboard.
///
/// On Linux the clipboard contents are served by this process, so a write
/// only survives the process when a clipboard manager picks it up. After a
/// write, [`TextStore::hold`] keeps serving the text until another
/// application takes the clipboard over or the hold time runs out.
#[cfg(feature = "clipboard")]
pub struct ClipboardStore {
    hold: Duration,
    clipboard: Option<arboard::Clipboard>,
    written: Option<Zeroizing<String>>,
}

#[cfg(feature = "clipboard")]
impl ClipboardStore {
    pub fn new() -> Self {
        Self::with_hold(Duration::from_secs(DEFAULT_CLIPBOARD_HOLD_SECS))
    }

    /// A zero `hold` releases the clipboard as soon as the command ends.
    pub fn with_hold(hold: Duration) -> Self {
        Self {
            hold,
            clipboard: None,
            written: None,
        }
    }

    fn open() -> Result<arboard::Clipboard> {
        arboard::Clipboard::new().map_err(|e| {
            RecoverboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Clipboard,
                "failed to access clipboard",
                e,
            )
        })
    }

    fn holds_selection(&self) -> bool {
        cfg!(target_os = "linux") && !self.hold.is_zero()
    }
}

#[cfg(feature = "clipboard")]
impl Default for ClipboardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "clipboard")]
impl fmt::Debug for ClipboardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardStore")
            .field("hold", &self.hold)
            .field("written", &self.written.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "clipboard")]
impl fmt::Display for ClipboardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("clipboard")
    }
}

#[cfg(feature = "clipboard")]
impl TextStore for ClipboardStore {
    fn read_text(&mut self) -> Result<String> {
        let text = Self::open()?.get_text().map_err(|e| match e {
            arboard::Error::ContentNotAvailable => RecoverboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::EmptyInput,
                "clipboard is empty",
            ),
            e => RecoverboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Clipboard,
                "failed to read clipboard",
                e,
            ),
        })?;
        non_empty(&text, "clipboard")?;
        Ok(text)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        // The handle is kept so the selection stays served until hold() is done.
        let mut clipboard = Self::open()?;
        clipboard.set_text(text).map_err(clipboard_write_error)?;
        self.clipboard = Some(clipboard);
        self.written = Some(Zeroizing::new(text.to_owned()));
        Ok(())
    }

    fn describe_write(&self) -> String {
        if self.holds_selection() {
            format!(
                "copied to clipboard; keeping it available for {} seconds or until it is replaced",
                self.hold.as_secs()
            )
        } else {
            "copied to clipboard".to_owned()
        }
    }

    fn hold(&mut self) -> Result<()> {
        if !self.holds_selection() {
            return Ok(());
        }
        match (self.clipboard.as_mut(), self.written.as_ref()) {
            (Some(clipboard), Some(text)) => serve_selection(clipboard, text, self.hold),
            _ => Ok(()),
        }
    }
}

/// Re-offer `text` and block until another client owns the selection or
/// `hold` has passed.
#[cfg(all(feature = "clipboard", target_os = "linux"))]
fn serve_selection(clipboard: &mut arboard::Clipboard, text: &str, hold: Duration) -> Result<()> {
    use arboard::SetExtLinux;
    use std::time::Instant;

    tracing::debug!(?hold, "serving clipboard selection");
    clipboard
        .set()
        .wait_until(Instant::now() + hold)
        .text(text)
        .map_err(clipboard_write_error)
}

#[cfg(all(feature = "clipboard", not(target_os = "linux")))]
fn serve_selection(_clipboard: &mut arboard::Clipboard, _text: &str, _hold: Duration) -> Result<()> {
    Ok(())
}

#[cfg(feature = "clipboard")]
fn clipboard_write_error(e: arboard::Error) -> RecoverboxError {
    RecoverboxError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::Clipboard,
        "failed to write clipboard",
        e,
    )
}

/// Text held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    text: Option<String>,
}

impl MemoryStore {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The text last written or given at construction.
    pub fn contents(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl fmt::Display for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory")
    }
}

impl TextStore for MemoryStore {
    fn read_text(&mut self) -> Result<String> {
        let text = self.text.as_deref().unwrap_or_default();
        non_empty(text, "memory store")?;
        Ok(text.to_owned())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_owned());
        Ok(())
    }
}

fn non_empty<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    if text.trim().is_empty() {
        return Err(RecoverboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::EmptyInput,
            format!("{} is empty", what),
        ));
    }
    Ok(text)
}

/// Write `contents` to `path` via tempfile + fsync + rename.
///
/// Either the old file or the complete new one exists afterwards, never a
/// partial write.
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| RecoverboxError::io(ErrorCategory::User, "failed to create tempfile", e))?;

    temp_file
        .write_all(contents)
        .map_err(|e| RecoverboxError::io(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| RecoverboxError::io(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        RecoverboxError::io(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                RecoverboxError::io(
                    ErrorCategory::Internal,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        RecoverboxError::io(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", path.display()),
            e.error,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> RecoverboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    RecoverboxError::io(
        category,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_file_read_trims() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("codes.txt");
        fs::write(&path, "\n  123456-789012\n\n").unwrap();

        let mut store = FileStore::new(&path);
        assert_eq!(store.read_text().unwrap(), "123456-789012");
    }

    #[test]
    fn test_file_read_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.txt");
        fs::write(&path, " \n\t").unwrap();

        let err = FileStore::new(&path).read_text().expect_err("expected empty input");
        assert_eq!(err.kind, Some(ErrorKind::EmptyInput));
    }

    #[test]
    fn test_file_read_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.txt");

        let err = FileStore::new(&path).read_text().expect_err("expected missing file");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_file_read_not_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("binary.bin");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = FileStore::new(&path).read_text().expect_err("expected utf-8 failure");
        assert_eq!(err.kind, Some(ErrorKind::NotUtf8));
    }

    #[test]
    fn test_file_write_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        fs::write(&path, "old content that is longer").unwrap();

        let mut store = FileStore::new(&path);
        store.write_text("new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_file_write_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("out.txt");

        let err = FileStore::new(&path).write_text("data").expect_err("expected failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert!(!path.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.txt");

        FileStore::new(&path).write_text("secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        let err = store.read_text().expect_err("expected empty input");
        assert_eq!(err.kind, Some(ErrorKind::EmptyInput));

        store.write_text("hello").unwrap();
        assert_eq!(store.contents(), Some("hello"));
        assert_eq!(store.read_text().unwrap(), "hello");
    }

    #[test]
    fn test_display() {
        assert_eq!(FileStore::new("a/b.txt").to_string(), "a/b.txt");
        assert_eq!(MemoryStore::new("x").to_string(), "memory");
    }

    #[test]
    fn test_describe_write() {
        assert_eq!(FileStore::new("a/b.txt").describe_write(), "saved to a/b.txt");
        assert_eq!(MemoryStore::default().describe_write(), "saved to memory");
    }

    // Constructing a ClipboardStore does not touch the display server.
    #[test]
    #[cfg(feature = "clipboard")]
    fn test_clipboard_describe_write() {
        let store = ClipboardStore::with_hold(Duration::from_secs(45));
        let described = store.describe_write();
        assert!(described.starts_with("copied to clipboard"), "{}", described);
        if cfg!(target_os = "linux") {
            assert!(described.contains("45 seconds"), "{}", described);
        }

        let released = ClipboardStore::with_hold(Duration::ZERO);
        assert_eq!(released.describe_write(), "copied to clipboard");
        assert_eq!(released.to_string(), "clipboard");
    }

    #[test]
    #[cfg(feature = "clipboard")]
    fn test_clipboard_hold_without_write_returns() {
        let mut store = ClipboardStore::new();
        store.hold().unwrap();
    }
}
