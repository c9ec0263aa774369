//! Collaborator interfaces for storage, repair, and logging
//!
//! The engine never touches a filesystem, network, or model endpoint
//! directly. Everything I/O-shaped goes through these traits so the host
//! wires real backends and tests substitute recording fakes.

use crate::edits::Replacement;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Write request for a project file.
#[derive(Debug, Clone)]
pub struct UpsertFile<'a> {
    pub project_id: &'a str,
    pub file_path: &'a str,
    pub content: &'a str,
    pub known_paths: Option<&'a HashSet<String>>,
}

/// Delete request for a project path.
#[derive(Debug, Clone)]
pub struct DeletePath<'a> {
    pub project_id: &'a str,
    pub target_path: &'a str,
    pub recursive: bool,
}

/// Staging notification for a changed file, independent of the write.
#[derive(Debug, Clone)]
pub struct StageFile<'a> {
    pub project_id: &'a str,
    pub file_path: &'a str,
    pub source: &'a str,
}

/// What staging reported back. `overview` carries a refreshed branch
/// overview when the backend produced one.
#[derive(Debug, Clone, Default)]
pub struct StageOutcome {
    pub overview: Option<String>,
}

/// The filesystem/version-control backend that actually stores files.
///
/// Errors may carry a [`crate::error::StoreStatus`] in their chain; the
/// engine lifts it into [`crate::error::FileOpFailure::status`].
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Read a file's content, or `None` when the path does not exist.
    async fn read_file(&self, project_id: &str, file_path: &str)
        -> anyhow::Result<Option<String>>;

    /// Create or overwrite a file.
    async fn upsert_file(&self, req: UpsertFile<'_>) -> anyhow::Result<()>;

    /// Delete a file or directory tree.
    async fn delete_path(&self, req: DeletePath<'_>) -> anyhow::Result<()>;

    /// Notify the backend that a file changed.
    async fn stage_file(&self, req: StageFile<'_>) -> anyhow::Result<StageOutcome>;
}

/// Repair request for a modify edit whose search text was not found.
#[derive(Debug, Clone)]
pub struct RepairModify<'a> {
    pub project_id: &'a str,
    pub goal_prompt: &'a str,
    pub stage: &'a str,
    pub file_path: &'a str,
    pub original_content: &'a str,
    pub failed_edit: &'a [Replacement],
    pub error: &'a str,
}

/// Rewrite request: regenerate the whole file against the goal.
#[derive(Debug, Clone)]
pub struct RewriteFile<'a> {
    pub goal_prompt: &'a str,
    pub stage: &'a str,
    pub file_path: &'a str,
    pub original_content: &'a str,
    pub error_message: &'a str,
}

/// A usable repair: either a corrected replacement list or full content.
#[derive(Debug, Clone)]
pub enum RepairedEdit {
    Modify { replacements: Vec<Replacement> },
    Upsert { content: String },
}

/// The model-backed collaborator that produces repaired edits. Returning
/// `Ok(None)` means "no usable repair"; it is not an error.
#[async_trait]
pub trait EditRepairer: Send + Sync {
    async fn try_repair_modify_edit(
        &self,
        req: RepairModify<'_>,
    ) -> anyhow::Result<Option<RepairedEdit>>;

    async fn try_rewrite_file(
        &self,
        req: RewriteFile<'_>,
    ) -> anyhow::Result<Option<RepairedEdit>>;
}

/// Structured logging sink for engine decision points.
pub trait LogSink: Send + Sync {
    fn log_event(&self, event: &str, data: Value);
}

/// Forwards structured events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log_event(&self, event: &str, data: Value) {
        tracing::debug!(target: "groundcontrol", event, %data);
    }
}

/// Discards every event. Useful for minimal embedders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn log_event(&self, _event: &str, _data: Value) {}
}
