//! Recoverbox CLI - password-based encryption of recovery codes
//!
//! Reads text from the clipboard or a file, encrypts or decrypts it, and
//! writes the result back to the clipboard or a file.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use recoverbox::RecoveryCodec;
use recoverbox::commands::{self, EncryptOptions};
use recoverbox::error::{RecoverboxError, Result};
use recoverbox::password::{LinePasswordReader, PasswordReader, TerminalPasswordReader};
use recoverbox::store::{DEFAULT_CLIPBOARD_HOLD_SECS, FileStore, TextStore};

#[derive(Parser)]
#[command(name = "recoverbox")]
#[command(version)]
#[command(about = "Password-based encryption of recovery codes.", long_about = None)]
struct Cli {
    /// Read passwords from stdin, one per line, instead of from the terminal
    #[arg(long, global = true, env = "RECOVERBOX_PASSWORD_STDIN")]
    password_stdin: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Seconds to keep serving clipboard output on Linux (0 releases it at exit)
    #[arg(
        long,
        global = true,
        env = "RECOVERBOX_CLIPBOARD_HOLD",
        value_name = "SECONDS",
        default_value_t = DEFAULT_CLIPBOARD_HOLD_SECS
    )]
    clipboard_hold: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text from the clipboard with a password
    #[command(alias = "e")]
    Encrypt {
        /// Read data from file instead of clipboard
        #[arg(short, long = "from", value_name = "FILE")]
        from: Option<PathBuf>,

        /// Save encrypted data to file instead of clipboard
        #[arg(short, long = "save", value_name = "FILE")]
        save: Option<PathBuf>,

        /// Only report the number of characters found instead of printing them
        #[arg(long)]
        hide_input: bool,
    },

    /// Decrypt text from the clipboard with a password
    #[command(alias = "d")]
    Decrypt {
        /// Read encrypted data from file instead of clipboard
        #[arg(short, long = "from", value_name = "FILE")]
        from: Option<PathBuf>,

        /// Save decrypted data to file instead of clipboard
        #[arg(short, long = "save", value_name = "FILE")]
        save: Option<PathBuf>,

        /// Accepted for symmetry with encrypt; decrypted data is never printed
        #[arg(long)]
        hide_input: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let codec = RecoveryCodec::new();
    let mut out = io::stdout();
    let mut passwords = get_password_reader(cli.password_stdin);
    let hold = Duration::from_secs(cli.clipboard_hold);

    let result = match cli.command {
        Commands::Encrypt {
            from,
            save,
            hide_input,
        } => open_stores(from, save, hold).and_then(|(mut source, mut sink)| {
            commands::encrypt(
                &codec,
                &mut *source,
                &mut *sink,
                &mut *passwords,
                EncryptOptions { hide_input },
                &mut out,
            )
        }),
        Commands::Decrypt {
            from,
            save,
            hide_input: _,
        } => open_stores(from, save, hold).and_then(|(mut source, mut sink)| {
            commands::decrypt(&codec, &mut *source, &mut *sink, &mut *passwords, &mut out)
        }),
    };

    if let Err(e) = result {
        tracing::debug!(category = ?e.category, kind = ?e.kind, "command failed");
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RECOVERBOX_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn get_password_reader(use_stdin: bool) -> Box<dyn PasswordReader> {
    if use_stdin {
        Box::new(LinePasswordReader::new(io::stdin().lock()))
    } else {
        Box::new(TerminalPasswordReader::new())
    }
}

type Stores = (Box<dyn TextStore>, Box<dyn TextStore>);

fn open_stores(from: Option<PathBuf>, save: Option<PathBuf>, hold: Duration) -> Result<Stores> {
    Ok((text_store(from, hold)?, text_store(save, hold)?))
}

fn text_store(path: Option<PathBuf>, hold: Duration) -> Result<Box<dyn TextStore>> {
    match path {
        Some(path) => Ok(Box::new(FileStore::new(path))),
        None => clipboard_store(hold),
    }
}

#[cfg(feature = "clipboard")]
fn clipboard_store(hold: Duration) -> Result<Box<dyn TextStore>> {
    Ok(Box::new(recoverbox::store::ClipboardStore::with_hold(hold)))
}

#[cfg(not(feature = "clipboard"))]
fn clipboard_store(_hold: Duration) -> Result<Box<dyn TextStore>> {
    Err(RecoverboxError::new(
        recoverbox::ErrorCategory::User,
        "built without clipboard support; use --from and --save",
    ))
}

/// Renders an error and its sources as `outer: inner: innermost`.
fn error_chain(e: &RecoverboxError) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
