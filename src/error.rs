//! Typed failure values for the edit pipeline
//!
//! Callers classify failures by downcasting the error chain, never by
//! matching message strings.

use std::fmt;
use thiserror::Error;

/// File operation that failed at the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Upsert,
    Delete,
}

impl FileOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOp::Read => "read",
            FileOp::Upsert => "upsert",
            FileOp::Delete => "delete",
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read/write/delete rejected by the storage collaborator.
///
/// `status` mirrors the HTTP-like status the collaborator reported, when one
/// was available (404 missing, 400 rejected, and so on).
#[derive(Debug, Clone, Error)]
#[error("{operation} failed for {path}: {message}")]
pub struct FileOpFailure {
    pub path: String,
    pub status: Option<u16>,
    pub message: String,
    pub operation: FileOp,
}

/// Status code a storage collaborator can attach to its error chain so the
/// engine lifts it into [`FileOpFailure::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("storage returned status {0}")]
pub struct StoreStatus(pub u16);

/// Why a single search/replace pair could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplaceError {
    /// The search text was not found in the current content. This is the one
    /// failure class eligible for repair escalation.
    #[error("replacement {index}: search text not found. Searched for: {preview:?}")]
    SearchNotFound { index: usize, preview: String },

    /// An empty search only means "insert whole content" on an empty file.
    #[error("replacement {index}: empty search on non-empty content")]
    EmptySearch { index: usize },
}

/// A modify edit whose replacement list failed, labeled with enough context
/// to debug the plan that produced it.
#[derive(Debug, Clone, Error)]
#[error("could not apply edit to {path} during {stage}: {source} (first searches: {previews:?})")]
pub struct ReplacementFailure {
    pub path: String,
    pub stage: String,
    /// Previews of the first two replacement search strings.
    pub previews: Vec<String>,
    #[source]
    pub source: ReplaceError,
}

impl ReplacementFailure {
    /// Whether this failure is a replacement resolution error (search text
    /// could not be located), as opposed to a malformed replacement list.
    pub fn is_resolution_error(&self) -> bool {
        matches!(self.source, ReplaceError::SearchNotFound { .. })
    }
}

/// Truncate a string for error payloads (Unicode-safe).
pub(crate) fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
