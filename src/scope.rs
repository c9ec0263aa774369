//! Scope reflection: contracts that keep edits inside the requested blast
//! radius
//!
//! Before applying anything, the caller elicits a reflection from the
//! planning service describing what must change, what must stay untouched,
//! and whether tests belong in the change. Styling requests additionally get
//! a stricter sub-contract distinguishing "retheme the whole app" from "make
//! the navbar black". Validation returns typed violations; it never throws.

use crate::edits::{normalize_repo_path, EditOperation};
use crate::extract::{extract_json_object, try_parse_loose_json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cap on entries kept per reflection list.
const MAX_REFLECTION_ENTRIES: usize = 12;

/// Cap on style-scope target hints.
const MAX_TARGET_HINTS: usize = 8;

/// A structured contract derived from a planning response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeReflection {
    pub reasoning: String,
    pub must_change: Vec<String>,
    pub must_avoid: Vec<String>,
    pub must_have: Vec<String>,
    pub tests_needed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_scope: Option<StyleScopeContract>,
}

impl Default for ScopeReflection {
    fn default() -> Self {
        Self {
            reasoning: String::new(),
            must_change: Vec::new(),
            must_avoid: Vec::new(),
            must_have: Vec::new(),
            tests_needed: true,
            style_scope: None,
        }
    }
}

/// Whether a styling request targets one element or the whole app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleScopeMode {
    Targeted,
    Global,
}

/// Stricter sub-contract for visual/style-scoped requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleScopeContract {
    pub mode: StyleScopeMode,
    pub enforce_target_scoping: bool,
    pub forbid_global_selectors: bool,
    pub target_hints: Vec<String>,
}

/// Why a proposed edit falls outside the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    TestsNotNeeded,
    ForbiddenArea,
    StyleScopeGlobalSelector,
    StyleScopeTargetMissing,
}

/// A typed scope violation. Returned as a value so the caller decides
/// whether to block, re-plan, or ignore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub message: String,
}

static STYLE_VOCAB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(css|scss|sass|styles?|styling|stylesheets?|theme|theming|colors?|colours?|fonts?|background|layout|padding|margin|borders?|dark mode|light mode|navbar|navigation|header|footer|sidebar|buttons?|icons?|logo|banner|hero|modal|menu|appearance|restyle|redesign|look and feel)\b",
    )
    .expect("style vocabulary pattern")
});

static GLOBAL_VOCAB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i):root|\b(body|html|whole (app|site|page)|entire (app|site|page)|all pages|every page|everywhere|global(ly)?|app-wide|site-wide)\b",
    )
    .expect("global vocabulary pattern")
});

static NAV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(nav|navbar|navigation)( bar)?\b").expect("nav pattern"));

static PHRASE_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:the|a|an)\s+((?:[a-z0-9'-]+\s+){0,3}[a-z0-9'-]+)\s+(?:have|has|with|to|should|needs?|be)\b",
    )
    .expect("phrase hint pattern")
});

static CSS_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.#]([A-Za-z][A-Za-z0-9_-]+)").expect("css token pattern"));

static TEST_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)__tests__/|\.(?:test|spec)\.[A-Za-z0-9]+$").expect("test path pattern")
});

static GLOBAL_STYLESHEET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|/)(?:index|app|styles|theme|globals?)\.(?:css|scss|sass|less)$")
        .expect("global stylesheet pattern")
});

static GLOBAL_SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s{};,>])(body|html|:root|#root)\s*\{").expect("global selector pattern")
});

static STAR_SELECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\*\s*\{").expect("star selector pattern"));

/// Words that make useless target hints.
const HINT_STOP_WORDS: &[&str] = &[
    "all", "and", "any", "app", "for", "have", "into", "its", "make", "more", "new", "our",
    "page", "site", "that", "the", "this", "with",
];

/// Color vocabulary; colors describe the change, not the target.
const COLOR_WORDS: &[&str] = &[
    "black", "blue", "brown", "cyan", "dark", "darker", "gold", "gray", "green", "grey",
    "light", "lighter", "magenta", "orange", "pink", "purple", "red", "silver", "teal",
    "white", "yellow",
];

/// Derive a style-scope sub-contract from the goal prompt.
///
/// Returns `None` unless the prompt reads as a style/visual request. Global
/// theming intent relaxes both scoping rules; a targeted request turns them
/// on and collects hints naming the element being styled.
pub fn derive_style_scope_contract(prompt_text: &str) -> Option<StyleScopeContract> {
    let prompt = prompt_text.trim();
    if prompt.is_empty() || !STYLE_VOCAB_RE.is_match(prompt) {
        return None;
    }

    if GLOBAL_VOCAB_RE.is_match(prompt) {
        return Some(StyleScopeContract {
            mode: StyleScopeMode::Global,
            enforce_target_scoping: false,
            forbid_global_selectors: false,
            target_hints: Vec::new(),
        });
    }

    let mut candidates: Vec<String> = Vec::new();

    if NAV_RE.is_match(prompt) {
        candidates.extend(["navbar", "navigation", "nav"].map(String::from));
    }

    for captures in PHRASE_HINT_RE.captures_iter(prompt) {
        for word in captures[1].split_whitespace() {
            candidates.push(word.to_string());
        }
    }

    for captures in CSS_TOKEN_RE.captures_iter(prompt) {
        candidates.push(captures[1].to_string());
    }

    Some(StyleScopeContract {
        mode: StyleScopeMode::Targeted,
        enforce_target_scoping: true,
        forbid_global_selectors: true,
        target_hints: filter_hints(candidates),
    })
}

/// Lowercase, strip to `[a-z0-9-]`, drop short/stop/color words, dedupe,
/// cap.
fn filter_hints(candidates: Vec<String>) -> Vec<String> {
    let mut hints: Vec<String> = Vec::new();
    for candidate in candidates {
        let cleaned: String = candidate
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if cleaned.chars().count() < 3 {
            continue;
        }
        if HINT_STOP_WORDS.contains(&cleaned.as_str()) || COLOR_WORDS.contains(&cleaned.as_str()) {
            continue;
        }
        if !hints.contains(&cleaned) {
            hints.push(cleaned);
        }
        if hints.len() >= MAX_TARGET_HINTS {
            break;
        }
    }
    hints
}

/// Parse a reflection response into a [`ScopeReflection`].
///
/// Tolerates prose-wrapped and malformed JSON via the tolerant extractor.
/// Any parse failure or shape mismatch degrades to the all-defaults
/// reflection (tests needed, nothing constrained); this function never
/// fails.
pub fn parse_scope_reflection_response(raw_response_text: &str) -> ScopeReflection {
    let value = extract_json_object(raw_response_text)
        .and_then(|span| {
            serde_json::from_str::<Value>(&span)
                .ok()
                .or_else(|| try_parse_loose_json(&span))
        })
        .or_else(|| try_parse_loose_json(raw_response_text));

    let Some(Value::Object(map)) = value else {
        return ScopeReflection::default();
    };

    ScopeReflection {
        reasoning: field(&map, "reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        must_change: string_list(field(&map, "mustChange")),
        must_avoid: string_list(field(&map, "mustAvoid")),
        must_have: string_list(field(&map, "mustHave")),
        tests_needed: loose_bool(field(&map, "testsNeeded")).unwrap_or(true),
        style_scope: field(&map, "styleScope").and_then(parse_style_scope),
    }
}

/// Look a field up by its wire name, accepting a snake_case spelling too.
fn field<'a>(map: &'a serde_json::Map<String, Value>, camel: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(camel) {
        return Some(value);
    }
    let snake: String = camel
        .chars()
        .flat_map(|c| {
            if c.is_ascii_uppercase() {
                vec!['_', c.to_ascii_lowercase()]
            } else {
                vec![c]
            }
        })
        .collect();
    map.get(&snake)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .take(MAX_REFLECTION_ENTRIES)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Models emit booleans as strings often enough to tolerate it.
fn loose_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_style_scope(value: &Value) -> Option<StyleScopeContract> {
    let map = value.as_object()?;
    let mode = match field(map, "mode").and_then(Value::as_str) {
        Some("global") => StyleScopeMode::Global,
        _ => StyleScopeMode::Targeted,
    };
    let targeted = mode == StyleScopeMode::Targeted;
    Some(StyleScopeContract {
        mode,
        enforce_target_scoping: loose_bool(field(map, "enforceTargetScoping")).unwrap_or(targeted),
        forbid_global_selectors: loose_bool(field(map, "forbidGlobalSelectors"))
            .unwrap_or(targeted),
        target_hints: filter_hints(
            field(map, "targetHints")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        ),
    })
}

/// Check every proposed edit against the reflection, in order. Returns the
/// first violation found, or `None` when the batch is acceptable (or when
/// there is no reflection or no edits to check).
pub fn validate_edits_against_reflection(
    edits: &[EditOperation],
    reflection: Option<&ScopeReflection>,
) -> Option<Violation> {
    let reflection = reflection?;
    if edits.is_empty() {
        return None;
    }

    let avoid_prefixes = derive_avoid_prefixes(&reflection.must_avoid);

    for edit in edits {
        let path = edit.path();
        let payload = edit.text_payload();

        if !reflection.tests_needed && TEST_PATH_RE.is_match(path) {
            return Some(Violation {
                kind: ViolationKind::TestsNotNeeded,
                path: path.to_string(),
                rule: None,
                message: format!(
                    "Edit touches test file {} but the reflection marked tests as not needed",
                    path
                ),
            });
        }

        if let Some(style) = &reflection.style_scope {
            if style.forbid_global_selectors {
                if let Some(selector) = find_global_selector(&payload) {
                    return Some(Violation {
                        kind: ViolationKind::StyleScopeGlobalSelector,
                        path: path.to_string(),
                        rule: Some(selector.clone()),
                        message: format!(
                            "Edit to {} introduces global selector `{}` for a targeted style change",
                            path, selector
                        ),
                    });
                }
            }

            if style.enforce_target_scoping && GLOBAL_STYLESHEET_RE.is_match(path) {
                let path_lower = path.to_lowercase();
                let payload_lower = payload.to_lowercase();
                let mentions_target = style
                    .target_hints
                    .iter()
                    .any(|hint| path_lower.contains(hint) || payload_lower.contains(hint));
                if !mentions_target {
                    return Some(Violation {
                        kind: ViolationKind::StyleScopeTargetMissing,
                        path: path.to_string(),
                        rule: None,
                        message: format!(
                            "Edit to global stylesheet {} never mentions the targeted element",
                            path
                        ),
                    });
                }
            }
        }

        for (prefix, rule) in &avoid_prefixes {
            if path.starts_with(prefix.as_str()) || path == prefix.trim_end_matches('/') {
                return Some(Violation {
                    kind: ViolationKind::ForbiddenArea,
                    path: path.to_string(),
                    rule: Some(rule.clone()),
                    message: format!("Edit to {} falls inside avoided area ({})", path, rule),
                });
            }
        }
    }

    None
}

/// Turn `mustAvoid` entries into path prefixes.
///
/// A path-like entry becomes itself (with a trailing slash). Freeform
/// entries fall back to keyword heuristics for the conventional project
/// areas they mention.
fn derive_avoid_prefixes(must_avoid: &[String]) -> Vec<(String, String)> {
    let mut prefixes: Vec<(String, String)> = Vec::new();
    let mut push = |prefix: &str, rule: &str| {
        if !prefixes.iter().any(|(existing, _)| existing == prefix) {
            prefixes.push((prefix.to_string(), rule.to_string()));
        }
    };

    for entry in must_avoid {
        let trimmed = entry.trim();

        if !trimmed.contains(char::is_whitespace) {
            if let Some(normalized) = normalize_repo_path(trimmed) {
                push(&format!("{}/", normalized), entry);
                continue;
            }
        }

        let lower = trimmed.to_lowercase();
        if lower.contains("backend") {
            push("backend/", entry);
            push("server/", entry);
        }
        if lower.contains("frontend") {
            push("frontend/", entry);
            push("client/", entry);
        }
        if lower.contains("test") {
            push("tests/", entry);
            push("test/", entry);
            push("__tests__/", entry);
            push("backend/tests/", entry);
            push("frontend/src/__tests__/", entry);
        }
    }

    prefixes
}

/// Find a global CSS selector in an edit's textual payload, if any.
fn find_global_selector(payload: &str) -> Option<String> {
    if let Some(captures) = GLOBAL_SELECTOR_RE.captures(payload) {
        return Some(captures[1].to_string());
    }
    if STAR_SELECTOR_RE.is_match(payload) {
        return Some("*".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::Replacement;
    use pretty_assertions::assert_eq;

    fn modify(path: &str, search: &str, replace: &str) -> EditOperation {
        EditOperation::Modify {
            path: path.to_string(),
            replacements: vec![Replacement {
                search: search.to_string(),
                replace: replace.to_string(),
            }],
        }
    }

    fn upsert(path: &str, content: &str) -> EditOperation {
        EditOperation::Upsert {
            path: path.to_string(),
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn test_derive_targeted_contract_for_navbar_prompt() {
        let contract =
            derive_style_scope_contract("make the navigation bar have a black background")
                .unwrap();
        assert_eq!(contract.mode, StyleScopeMode::Targeted);
        assert!(contract.enforce_target_scoping);
        assert!(contract.forbid_global_selectors);
        for hint in ["navbar", "navigation", "nav"] {
            assert!(contract.target_hints.iter().any(|h| h == hint), "missing {hint}");
        }
        assert!(!contract.target_hints.iter().any(|h| h == "black"));
    }

    #[test]
    fn test_derive_global_contract() {
        let contract = derive_style_scope_contract("retheme the whole app with a dark color scheme")
            .unwrap();
        assert_eq!(contract.mode, StyleScopeMode::Global);
        assert!(!contract.enforce_target_scoping);
        assert!(!contract.forbid_global_selectors);
        assert!(contract.target_hints.is_empty());
    }

    #[test]
    fn test_derive_returns_none_for_non_style_prompt() {
        assert_eq!(derive_style_scope_contract("speed up the database queries"), None);
        assert_eq!(derive_style_scope_contract(""), None);
    }

    #[test]
    fn test_derive_collects_css_tokens() {
        let contract =
            derive_style_scope_contract("change the color of .profile-card and #sidebar").unwrap();
        assert!(contract.target_hints.iter().any(|h| h == "profile-card"));
        assert!(contract.target_hints.iter().any(|h| h == "sidebar"));
    }

    #[test]
    fn test_parse_reflection_from_prose_wrapped_json() {
        let raw = r#"Sure, here's my assessment:
{"reasoning": "focused change", "mustChange": ["src/Nav.tsx"], "mustAvoid": [" backend ", ""], "mustHave": [], "testsNeeded": "false"}
Let me know."#;
        let reflection = parse_scope_reflection_response(raw);
        assert_eq!(reflection.reasoning, "focused change");
        assert_eq!(reflection.must_change, vec!["src/Nav.tsx"]);
        assert_eq!(reflection.must_avoid, vec!["backend"]);
        assert!(!reflection.tests_needed);
        assert_eq!(reflection.style_scope, None);
    }

    #[test]
    fn test_parse_reflection_defaults_on_garbage() {
        for raw in ["", "no json here", "[1, 2, 3]", "\"just a string\""] {
            let reflection = parse_scope_reflection_response(raw);
            assert_eq!(reflection, ScopeReflection::default(), "input: {raw:?}");
            assert!(reflection.tests_needed);
        }
    }

    #[test]
    fn test_parse_reflection_caps_lists() {
        let entries: Vec<String> = (0..20).map(|i| format!("\"area-{i}\"")).collect();
        let raw = format!("{{\"mustChange\": [{}]}}", entries.join(","));
        let reflection = parse_scope_reflection_response(&raw);
        assert_eq!(reflection.must_change.len(), 12);
    }

    #[test]
    fn test_parse_reflection_with_style_scope() {
        let raw = r#"{"reasoning": "style", "testsNeeded": true,
            "styleScope": {"mode": "targeted", "targetHints": ["Navbar", "x"]}}"#;
        let reflection = parse_scope_reflection_response(raw);
        let style = reflection.style_scope.unwrap();
        assert_eq!(style.mode, StyleScopeMode::Targeted);
        assert!(style.enforce_target_scoping);
        assert!(style.forbid_global_selectors);
        assert_eq!(style.target_hints, vec!["navbar"]);
    }

    #[test]
    fn test_validate_passes_without_reflection_or_edits() {
        let edits = vec![modify("a.js", "x", "y")];
        assert_eq!(validate_edits_against_reflection(&edits, None), None);
        assert_eq!(
            validate_edits_against_reflection(&[], Some(&ScopeReflection::default())),
            None
        );
    }

    #[test]
    fn test_validate_flags_test_files_when_tests_not_needed() {
        let reflection = ScopeReflection {
            tests_needed: false,
            ..ScopeReflection::default()
        };
        let edits = vec![modify("src/__tests__/nav.test.ts", "a", "b")];
        let violation = validate_edits_against_reflection(&edits, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::TestsNotNeeded);

        let spec_style = vec![modify("src/nav.spec.tsx", "a", "b")];
        assert!(validate_edits_against_reflection(&spec_style, Some(&reflection)).is_some());

        // Tests allowed: same edits pass.
        let allowed = ScopeReflection::default();
        assert_eq!(validate_edits_against_reflection(&edits, Some(&allowed)), None);
    }

    #[test]
    fn test_validate_flags_global_selector_for_targeted_style() {
        let reflection = ScopeReflection {
            style_scope: derive_style_scope_contract("make the navbar font bigger"),
            ..ScopeReflection::default()
        };
        let edits = vec![modify("src/nav.css", ".nav { }", "body { font-size: 18px; }")];
        let violation = validate_edits_against_reflection(&edits, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::StyleScopeGlobalSelector);
        assert_eq!(violation.rule.as_deref(), Some("body"));
    }

    #[test]
    fn test_validate_allows_global_selector_in_global_mode() {
        let reflection = ScopeReflection {
            style_scope: derive_style_scope_contract("retheme the entire app colors"),
            ..ScopeReflection::default()
        };
        assert_eq!(
            reflection.style_scope.as_ref().unwrap().mode,
            StyleScopeMode::Global
        );
        let edits = vec![upsert("src/index.css", "body { background: #111; }")];
        assert_eq!(validate_edits_against_reflection(&edits, Some(&reflection)), None);
    }

    #[test]
    fn test_validate_flags_star_selector_at_line_start() {
        let reflection = ScopeReflection {
            style_scope: derive_style_scope_contract("style the hero banner differently"),
            ..ScopeReflection::default()
        };
        let edits = vec![upsert("src/hero.css", "* { margin: 0; }")];
        let violation = validate_edits_against_reflection(&edits, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::StyleScopeGlobalSelector);
        assert_eq!(violation.rule.as_deref(), Some("*"));
    }

    #[test]
    fn test_validate_flags_global_stylesheet_without_target_mention() {
        let reflection = ScopeReflection {
            style_scope: derive_style_scope_contract("give the navbar a shadow"),
            ..ScopeReflection::default()
        };
        let missing = vec![upsert("src/index.css", ".card { box-shadow: none; }")];
        let violation = validate_edits_against_reflection(&missing, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::StyleScopeTargetMissing);

        let mentioned = vec![upsert("src/index.css", ".navbar { box-shadow: 0 1px; }")];
        assert_eq!(validate_edits_against_reflection(&mentioned, Some(&reflection)), None);

        let scoped_file = vec![upsert("src/components/navbar.css", ".x { color: #222; }")];
        assert_eq!(validate_edits_against_reflection(&scoped_file, Some(&reflection)), None);
    }

    #[test]
    fn test_validate_flags_forbidden_area_prefix() {
        let reflection = ScopeReflection {
            must_avoid: vec!["backend/auth".to_string()],
            ..ScopeReflection::default()
        };
        let edits = vec![modify("backend/auth/session.js", "a", "b")];
        let violation = validate_edits_against_reflection(&edits, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::ForbiddenArea);
        assert_eq!(violation.rule.as_deref(), Some("backend/auth"));

        let outside = vec![modify("frontend/app.js", "a", "b")];
        assert_eq!(validate_edits_against_reflection(&outside, Some(&reflection)), None);
    }

    #[test]
    fn test_validate_keyword_heuristics_for_freeform_avoid_entries() {
        let reflection = ScopeReflection {
            must_avoid: vec!["do not touch the backend".to_string()],
            ..ScopeReflection::default()
        };
        let edits = vec![modify("server/routes.js", "a", "b")];
        let violation = validate_edits_against_reflection(&edits, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::ForbiddenArea);
    }

    #[test]
    fn test_validate_returns_first_violation_in_order() {
        let reflection = ScopeReflection {
            tests_needed: false,
            must_avoid: vec!["backend".to_string()],
            ..ScopeReflection::default()
        };
        let edits = vec![
            modify("src/ok.js", "a", "b"),
            modify("backend/api.test.js", "a", "b"),
        ];
        // The second edit violates both rules; the tests rule fires first.
        let violation = validate_edits_against_reflection(&edits, Some(&reflection)).unwrap();
        assert_eq!(violation.kind, ViolationKind::TestsNotNeeded);
    }

    #[test]
    fn test_violation_serializes_with_kebab_case_type() {
        let violation = Violation {
            kind: ViolationKind::StyleScopeGlobalSelector,
            path: "a.css".to_string(),
            rule: Some("body".to_string()),
            message: "m".to_string(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["type"], "style-scope-global-selector");
    }
}
