//! Error types for the installer.
//!
//! The taxonomy mirrors the failure policy of the install sequence: directory
//! creation denial is the only error that triggers privilege escalation,
//! a conflicting running process aborts before anything is written, and
//! extraction failures are fatal and fail-fast within their archive. The
//! configuration write is the single non-fatal I/O path and is handled at the
//! call site rather than here.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallError>;

#[derive(Debug, Error)]
pub enum InstallError {
    /// Creating the install directory tree was denied. Triggers exactly one
    /// escalation attempt.
    #[error("cannot create directory {}: {source}", .path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A guarded executable is still running. Checked before any payload is
    /// written; never escalates.
    #[error("{name} is running")]
    ConflictingProcess { name: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Generic write/copy failure outside the extraction pipeline.
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The relaunch-elevated request itself could not be issued. This is not
    /// the user declining the prompt; the replacement process reports that on
    /// its own.
    #[error("elevation request could not be issued: {reason}")]
    ElevationDeclined { reason: String },

    #[error("shortcut creation failed: {reason}")]
    Shortcut { reason: String },

    /// The obfuscation codec rejects an empty key outright; everything else
    /// about the codec is infallible.
    #[error("obfuscation key must not be empty")]
    EmptyKey,

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Per-stage extraction failures. Each variant aborts the remaining entries
/// of its archive; no partial-entry retry is attempted.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot open archive {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read archive entry {name}: {source}")]
    Entry {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Entry name escapes the destination directory. Rejected, never written.
    #[error("archive entry {name} resolves outside the destination")]
    UnsafePath { name: String },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot rename {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot launch {}: {source}", .tool.display())]
    ToolLaunch {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with status {code:?}", .tool.display())]
    ToolFailed { tool: PathBuf, code: Option<i32> },

    /// Neither the freshly extracted tool nor a system-wide one was found.
    #[error("no decompression tool available")]
    ToolMissing,
}
