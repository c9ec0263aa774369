//! Edit application engine
//!
//! Takes a validated batch of proposed edits and lands them through the
//! storage collaborator: resolves each (possibly abbreviated) path against
//! the known repository paths, applies modifies with a bounded
//! repair-escalation chain, normalizes manifest upserts, and reports
//! applied/skipped counts for the batch. The batch is strictly sequential
//! and aborts on the first unrecoverable failure; already-applied edits stay
//! in place.

use crate::collab::{
    DeletePath, EditRepairer, LogSink, ProjectStore, RepairModify, RepairedEdit, RewriteFile,
    StageFile, TracingLogSink, UpsertFile,
};
use crate::edits::{normalize_repo_path, EditOperation, Replacement};
use crate::error::{preview, FileOp, FileOpFailure, ReplaceError, ReplacementFailure, StoreStatus};
use crate::extract::try_parse_loose_json;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Chars kept when previewing a failing search string in errors and logs.
const SEARCH_PREVIEW_CHARS: usize = 80;

/// Stage label used when the caller does not supply one.
const DEFAULT_STAGE: &str = "apply";

/// Per-batch outcome counters. Edits that fail raise an error instead, so
/// `applied + skipped` never exceeds the batch size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub applied: usize,
    pub skipped: usize,
}

/// What kind of change the per-file callback is being told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedFileKind {
    Modify,
    Upsert,
}

impl AppliedFileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppliedFileKind::Modify => "modify",
            AppliedFileKind::Upsert => "upsert",
        }
    }
}

/// Payload for the per-file callback, invoked after each successful write.
#[derive(Debug, Clone)]
pub struct AppliedFile {
    pub path: String,
    pub kind: AppliedFileKind,
}

/// Per-batch options for [`EditEngine::apply_edits`].
pub struct ApplyOptions<'a> {
    /// Attribution label forwarded to staging.
    pub source: &'a str,
    /// Canonical repository paths used to disambiguate abbreviated edit
    /// paths. Read-only to the engine.
    pub known_paths: Option<&'a HashSet<String>>,
    /// Goal prompt for the automation run; repair escalation is only
    /// eligible when this is present and non-empty.
    pub goal_prompt: Option<&'a str>,
    /// Stage label used in repair requests and error context.
    pub stage: Option<&'a str>,
    /// Invoked after each successful modify/upsert, before the next edit.
    /// The only partial-progress channel a caller has if the batch later
    /// rejects.
    pub on_file_applied: Option<&'a (dyn Fn(&AppliedFile) + Send + Sync)>,
    /// Invoked when staging reports a refreshed branch overview.
    pub on_overview: Option<&'a (dyn Fn(&str) + Send + Sync)>,
}

impl<'a> ApplyOptions<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            known_paths: None,
            goal_prompt: None,
            stage: None,
            on_file_applied: None,
            on_overview: None,
        }
    }
}

/// The engine itself. Collaborators are injected at construction; the
/// engine holds no other state and no locks.
pub struct EditEngine {
    store: Arc<dyn ProjectStore>,
    repairer: Option<Arc<dyn EditRepairer>>,
    log: Arc<dyn LogSink>,
}

impl EditEngine {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self {
            store,
            repairer: None,
            log: Arc::new(TracingLogSink),
        }
    }

    pub fn with_repairer(mut self, repairer: Arc<dyn EditRepairer>) -> Self {
        self.repairer = Some(repairer);
        self
    }

    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    /// Apply a batch of edits sequentially. Returns the batch counters, or
    /// the first unrecoverable error (remaining edits are not attempted and
    /// nothing is rolled back).
    pub async fn apply_edits(
        &self,
        project_id: &str,
        edits: &[EditOperation],
        options: &ApplyOptions<'_>,
    ) -> Result<ApplyOutcome> {
        let mut outcome = ApplyOutcome::default();
        if project_id.trim().is_empty() || edits.is_empty() {
            return Ok(outcome);
        }

        for edit in edits {
            let Some(normalized) = normalize_repo_path(edit.path()) else {
                self.log.log_event(
                    "apply.path_skipped",
                    json!({"path": edit.path(), "reason": "empty or unsafe path"}),
                );
                outcome.skipped += 1;
                continue;
            };
            let path = self.resolve_known_path(&normalized, options.known_paths);

            match edit {
                EditOperation::Modify { replacements, .. } => {
                    self.apply_modify(project_id, &path, replacements, options, &mut outcome)
                        .await?;
                }
                EditOperation::Delete { recursive, .. } => {
                    self.apply_delete(project_id, &path, *recursive, options, &mut outcome)
                        .await?;
                }
                EditOperation::Upsert { content, .. } => {
                    self.apply_upsert(project_id, &path, content.as_deref(), options, &mut outcome)
                        .await?;
                }
            }
        }

        Ok(outcome)
    }

    /// Resolve an edit path against the known repository paths: exact match
    /// first, then a unique suffix match. Ambiguity is never auto-resolved.
    fn resolve_known_path(&self, normalized: &str, known: Option<&HashSet<String>>) -> String {
        let Some(known) = known.filter(|paths| !paths.is_empty()) else {
            return normalized.to_string();
        };
        if known.contains(normalized) {
            return normalized.to_string();
        }

        let suffix = format!("/{normalized}");
        let mut candidates = known.iter().filter(|path| path.ends_with(&suffix));
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => only.clone(),
            (Some(_), Some(_)) => {
                self.log.log_event(
                    "apply.path_ambiguous",
                    json!({"path": normalized, "reason": "multiple known paths share this suffix"}),
                );
                normalized.to_string()
            }
            _ => normalized.to_string(),
        }
    }

    async fn apply_modify(
        &self,
        project_id: &str,
        path: &str,
        replacements: &[Replacement],
        options: &ApplyOptions<'_>,
        outcome: &mut ApplyOutcome,
    ) -> Result<()> {
        let original = self
            .store
            .read_file(project_id, path)
            .await
            .map_err(|err| wrap_file_op(err, path, FileOp::Read))?;
        let Some(original) = original else {
            return Err(anyhow::Error::new(FileOpFailure {
                path: path.to_string(),
                status: Some(404),
                message: "File not found".to_string(),
                operation: FileOp::Read,
            }));
        };

        let new_content = match apply_replacements(&original, replacements) {
            Ok(content) => content,
            Err(source) => {
                let failure = ReplacementFailure {
                    path: path.to_string(),
                    stage: options.stage.unwrap_or(DEFAULT_STAGE).to_string(),
                    previews: preview_searches(replacements),
                    source,
                };
                match self
                    .attempt_repair(project_id, path, &original, replacements, &failure, options)
                    .await
                {
                    Some(content) => content,
                    None => return Err(anyhow::Error::new(failure)),
                }
            }
        };

        if new_content == original {
            self.log.log_event("apply.noop", json!({"path": path}));
            outcome.skipped += 1;
            return Ok(());
        }

        self.write_and_stage(project_id, path, &new_content, options)
            .await?;
        if let Some(callback) = options.on_file_applied {
            callback(&AppliedFile {
                path: path.to_string(),
                kind: AppliedFileKind::Modify,
            });
        }
        outcome.applied += 1;
        Ok(())
    }

    async fn apply_delete(
        &self,
        project_id: &str,
        path: &str,
        recursive: bool,
        options: &ApplyOptions<'_>,
        outcome: &mut ApplyOutcome,
    ) -> Result<()> {
        self.store
            .delete_path(DeletePath {
                project_id,
                target_path: path,
                recursive,
            })
            .await
            .map_err(|err| wrap_file_op(err, path, FileOp::Delete))?;
        self.notify_staged(project_id, path, options).await?;
        outcome.applied += 1;
        Ok(())
    }

    async fn apply_upsert(
        &self,
        project_id: &str,
        path: &str,
        content: Option<&str>,
        options: &ApplyOptions<'_>,
        outcome: &mut ApplyOutcome,
    ) -> Result<()> {
        let Some(content) = content else {
            self.log.log_event(
                "apply.upsert_skipped",
                json!({"path": path, "reason": "content is not a string"}),
            );
            outcome.skipped += 1;
            return Ok(());
        };

        let content = if file_basename(path) == "package.json" {
            let normalized = normalize_manifest_content(content);
            if normalized != content {
                self.log
                    .log_event("apply.manifest_normalized", json!({"path": path}));
            }
            normalized
        } else {
            content.to_string()
        };

        self.write_and_stage(project_id, path, &content, options)
            .await?;
        if let Some(callback) = options.on_file_applied {
            callback(&AppliedFile {
                path: path.to_string(),
                kind: AppliedFileKind::Upsert,
            });
        }
        outcome.applied += 1;
        Ok(())
    }

    /// The repair-escalation chain for a failed modify: ask for a corrected
    /// edit, then for a full rewrite. First strategy yielding usable content
    /// wins; `None` means the original error should propagate.
    async fn attempt_repair(
        &self,
        project_id: &str,
        path: &str,
        original: &str,
        failed: &[Replacement],
        failure: &ReplacementFailure,
        options: &ApplyOptions<'_>,
    ) -> Option<String> {
        if !failure.is_resolution_error() {
            return None;
        }
        let goal = options
            .goal_prompt
            .map(str::trim)
            .filter(|goal| !goal.is_empty())?;
        let repairer = self.repairer.as_ref()?;

        let stage = options.stage.unwrap_or(DEFAULT_STAGE);
        let error_text = failure.to_string();

        for step in ["repair", "rewrite"] {
            let attempted = match step {
                "repair" => {
                    repairer
                        .try_repair_modify_edit(RepairModify {
                            project_id,
                            goal_prompt: goal,
                            stage,
                            file_path: path,
                            original_content: original,
                            failed_edit: failed,
                            error: &error_text,
                        })
                        .await
                }
                _ => {
                    repairer
                        .try_rewrite_file(RewriteFile {
                            goal_prompt: goal,
                            stage,
                            file_path: path,
                            original_content: original,
                            error_message: &error_text,
                        })
                        .await
                }
            };

            let repaired = match attempted {
                Ok(Some(repaired)) => repaired,
                Ok(None) => {
                    self.log.log_event(
                        "apply.repair_empty",
                        json!({"path": path, "step": step}),
                    );
                    continue;
                }
                Err(err) => {
                    self.log.log_event(
                        "apply.repair_failed",
                        json!({"path": path, "step": step, "error": err.to_string()}),
                    );
                    continue;
                }
            };

            match repaired {
                RepairedEdit::Upsert { content } => {
                    self.log.log_event(
                        "apply.repair_applied",
                        json!({"path": path, "step": step, "kind": "upsert"}),
                    );
                    return Some(content);
                }
                RepairedEdit::Modify { replacements } => {
                    match apply_replacements(original, &replacements) {
                        Ok(content) => {
                            self.log.log_event(
                                "apply.repair_applied",
                                json!({"path": path, "step": step, "kind": "modify"}),
                            );
                            return Some(content);
                        }
                        // A repaired list that still fails propagates the
                        // original error, not the repair error.
                        Err(_) => return None,
                    }
                }
            }
        }

        None
    }

    async fn write_and_stage(
        &self,
        project_id: &str,
        path: &str,
        content: &str,
        options: &ApplyOptions<'_>,
    ) -> Result<()> {
        self.store
            .upsert_file(UpsertFile {
                project_id,
                file_path: path,
                content,
                known_paths: options.known_paths,
            })
            .await
            .map_err(|err| wrap_file_op(err, path, FileOp::Upsert))?;
        self.notify_staged(project_id, path, options).await
    }

    async fn notify_staged(
        &self,
        project_id: &str,
        path: &str,
        options: &ApplyOptions<'_>,
    ) -> Result<()> {
        let staged = self
            .store
            .stage_file(StageFile {
                project_id,
                file_path: path,
                source: options.source,
            })
            .await
            .with_context(|| format!("Failed to stage {}", path))?;
        if let (Some(overview), Some(callback)) = (staged.overview.as_deref(), options.on_overview)
        {
            callback(overview);
        }
        Ok(())
    }
}

/// Apply search/replace pairs in order. An empty search is only valid as a
/// whole-content insert on empty content; a missing search is the
/// resolution error the repair chain can recover from.
pub(crate) fn apply_replacements(
    content: &str,
    replacements: &[Replacement],
) -> std::result::Result<String, ReplaceError> {
    let mut updated = content.to_string();

    for (index, replacement) in replacements.iter().enumerate() {
        if replacement.search.is_empty() {
            if updated.is_empty() {
                updated = replacement.replace.clone();
                continue;
            }
            return Err(ReplaceError::EmptySearch { index: index + 1 });
        }

        if !updated.contains(&replacement.search) {
            return Err(ReplaceError::SearchNotFound {
                index: index + 1,
                preview: preview(&replacement.search, SEARCH_PREVIEW_CHARS),
            });
        }

        updated = updated.replacen(&replacement.search, &replacement.replace, 1);
    }

    Ok(updated)
}

/// Re-serialize `package.json`-style content so duplicate object keys
/// collapse to their last occurrence; malformed content passes through
/// unchanged.
pub(crate) fn normalize_manifest_content(content: &str) -> String {
    match try_parse_loose_json(content) {
        Some(value @ Value::Object(_)) => serde_json::to_string_pretty(&value)
            .map(|mut serialized| {
                serialized.push('\n');
                serialized
            })
            .unwrap_or_else(|_| content.to_string()),
        _ => content.to_string(),
    }
}

fn preview_searches(replacements: &[Replacement]) -> Vec<String> {
    replacements
        .iter()
        .take(2)
        .map(|replacement| preview(&replacement.search, SEARCH_PREVIEW_CHARS))
        .collect()
}

fn file_basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Wrap a collaborator error into a [`FileOpFailure`], lifting any reported
/// status code. An error that already carries a failure is passed through
/// untouched.
fn wrap_file_op(err: anyhow::Error, path: &str, operation: FileOp) -> anyhow::Error {
    if err
        .chain()
        .any(|cause| cause.downcast_ref::<FileOpFailure>().is_some())
    {
        return err;
    }
    let status = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<StoreStatus>())
        .map(|status| status.0);
    let message = err.to_string();
    err.context(FileOpFailure {
        path: path.to_string(),
        status,
        message,
        operation,
    })
}
