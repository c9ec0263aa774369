//! Edit data model shared by the scope validator and the apply engine
//!
//! Planning output proposes a bounded batch of mutations. Each is one of
//! three variants, exhaustively matched everywhere so a new variant forces
//! every call site to handle it.

use crate::extract::{extract_json_array, extract_json_object_with_key, try_parse_loose_json};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An exact-substring search/replace pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub search: String,
    pub replace: String,
}

/// One proposed mutation with a repository-relative target path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EditOperation {
    /// Apply search/replace pairs to an existing file.
    Modify {
        path: String,
        #[serde(default)]
        replacements: Vec<Replacement>,
    },
    /// Remove a file or directory tree.
    Delete {
        path: String,
        #[serde(default)]
        recursive: bool,
    },
    /// Create or overwrite a file with full content. Models occasionally
    /// emit a non-string here (an object, a number); that deserializes to
    /// `None` and the engine skips it rather than erroring.
    Upsert {
        path: String,
        #[serde(default, deserialize_with = "string_or_none")]
        content: Option<String>,
    },
}

impl EditOperation {
    /// The raw target path as proposed by the planner.
    pub fn path(&self) -> &str {
        match self {
            EditOperation::Modify { path, .. }
            | EditOperation::Delete { path, .. }
            | EditOperation::Upsert { path, .. } => path,
        }
    }

    /// Textual payload used by scope validation: upsert content, or the
    /// concatenated search/replace text of a modify. Deletes carry none.
    pub fn text_payload(&self) -> String {
        match self {
            EditOperation::Modify { replacements, .. } => {
                let mut payload = String::new();
                for replacement in replacements {
                    payload.push_str(&replacement.search);
                    payload.push('\n');
                    payload.push_str(&replacement.replace);
                    payload.push('\n');
                }
                payload
            }
            EditOperation::Upsert { content, .. } => content.clone().unwrap_or_default(),
            EditOperation::Delete { .. } => String::new(),
        }
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }))
}

/// Parse a planning response into an edit list.
///
/// Accepts an object carrying an `edits` array, a bare array, or either of
/// those buried in prose/malformed JSON (recovered via the tolerant
/// extractor). Entries that do not deserialize into a known variant are
/// dropped rather than failing the batch.
pub fn parse_edit_operations(text: &str) -> Vec<EditOperation> {
    let candidates = extract_json_object_with_key(text, "edits")
        .and_then(|span| parse_value(&span))
        .or_else(|| extract_json_array(text).and_then(|span| parse_value(&span)))
        .or_else(|| try_parse_loose_json(text));

    let Some(value) = candidates else {
        return Vec::new();
    };

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("edits") {
            Some(Value::Array(entries)) => entries,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<EditOperation>(entry).ok())
        .collect()
}

fn parse_value(span: &str) -> Option<Value> {
    serde_json::from_str(span).ok().or_else(|| try_parse_loose_json(span))
}

/// Normalize a proposed path to repository-relative, forward-slash form.
///
/// Returns `None` for empty paths and anything that could escape the
/// repository root (absolute paths, drive prefixes, `..` segments).
pub fn normalize_repo_path(raw: &str) -> Option<String> {
    let mut path = raw.trim().replace('\\', "/");
    if path.contains(':') {
        return None;
    }
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped.to_string();
    }
    let trimmed = path.trim_start_matches('/');

    let mut segments = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
