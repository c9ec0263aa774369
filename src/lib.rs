//! Groundcontrol library crate
//!
//! Safely lands source-tree edits proposed by an automated planning service:
//! extracts structured intent from noisy model output, validates it against
//! a scope contract, applies each edit with bounded repair escalation, and
//! derives branch names from freeform text. All I/O goes through the
//! collaborator traits in [`collab`]; this crate owns no persistence.

pub mod apply;
pub mod branch;
pub mod collab;
pub mod edits;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod scope;

pub use apply::{ApplyOptions, ApplyOutcome, AppliedFile, AppliedFileKind, EditEngine};
pub use branch::{
    build_fallback_branch_name_from_prompt, extract_branch_name,
    is_branch_name_relevant_to_prompt, is_valid_branch_name,
};
pub use edits::{parse_edit_operations, EditOperation, Replacement};
pub use error::{FileOp, FileOpFailure, ReplaceError, ReplacementFailure, StoreStatus};
pub use extract::{
    extract_json_array, extract_json_object, extract_json_object_with_key,
    normalize_json_like_text, try_parse_loose_json,
};
pub use scope::{
    derive_style_scope_contract, parse_scope_reflection_response,
    validate_edits_against_reflection, ScopeReflection, StyleScopeContract, StyleScopeMode,
    Violation, ViolationKind,
};
