//! Branch-name derivation from freeform planning text
//!
//! A unit of work gets named from whatever the planner wrote: ideally a
//! quoted kebab-case token, but prose, placeholders, and junk all happen.
//! Every function here is total; the caller-supplied fallback is the floor.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Hard cap on a slugified branch name.
const MAX_SLUG_CHARS: usize = 40;

/// Tokens taken from a prompt when building a fallback name.
const MAX_FALLBACK_TOKENS: usize = 4;

/// Filler words that carry no signal for naming or relevance checks.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "be", "but", "can", "do", "does", "for", "from", "has",
    "have", "how", "i", "in", "into", "is", "it", "its", "just", "make", "my", "need", "of",
    "on", "or", "our", "please", "should", "so", "some", "that", "the", "then", "this", "to",
    "use", "want", "we", "what", "when", "where", "will", "with", "would", "you", "your",
];

static QUOTED_KEBAB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["'`]([A-Za-z0-9]+(?:-[A-Za-z0-9]+)+)["'`]"#).expect("quoted kebab pattern")
});

static KEBAB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9]+(?:-[A-Za-z0-9]+)+\b").expect("kebab pattern")
});

static BRANCH_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)+$").expect("branch name pattern"));

/// Pull a usable branch name out of freeform text.
///
/// Preference order: a quoted hyphenated token, any hyphenated token, a slug
/// of the whole text. Falls back to the trimmed `fallback_name` when nothing
/// usable remains.
pub fn extract_branch_name(raw_text: &str, fallback_name: &str) -> String {
    let text = raw_text.trim();

    if let Some(captures) = QUOTED_KEBAB_RE.captures(text) {
        return captures[1].to_lowercase();
    }
    if let Some(found) = KEBAB_RE.find(text) {
        return found.as_str().to_lowercase();
    }

    let slug = slugify(text);
    if slug.is_empty() {
        fallback_name.trim().to_string()
    } else {
        slug
    }
}

/// Whether a name is acceptable as a branch name: kebab-case, 2 to 5
/// segments, and not the literal `kebab-case` placeholder a model sometimes
/// echoes back from instructions.
pub fn is_valid_branch_name(name: &str) -> bool {
    if name == "kebab-case" {
        return false;
    }
    if !BRANCH_NAME_RE.is_match(name) {
        return false;
    }
    let segments = name.split('-').count();
    (2..=5).contains(&segments)
}

/// Build a branch name directly from the goal prompt when extraction from
/// the planning response produced nothing valid.
///
/// Returns `fallback_name` when the prompt has fewer than two content tokens
/// to work with.
pub fn build_fallback_branch_name_from_prompt(prompt: &str, fallback_name: &str) -> String {
    let tokens = content_tokens(prompt);
    if tokens.len() < 2 {
        return fallback_name.trim().to_string();
    }

    let joined = tokens
        .into_iter()
        .take(MAX_FALLBACK_TOKENS)
        .collect::<Vec<_>>()
        .join("-");
    extract_branch_name(&joined, fallback_name)
}

/// Whether a branch name plausibly relates to the prompt that spawned it.
///
/// Short prompts carry too little signal to judge, so they pass. Otherwise
/// at least one branch token must appear among the prompt's content tokens.
pub fn is_branch_name_relevant_to_prompt(branch_name: &str, prompt: &str) -> bool {
    let branch_tokens = content_tokens(branch_name);
    let prompt_tokens: HashSet<String> = content_tokens(prompt).into_iter().collect();

    if branch_tokens.is_empty() || prompt_tokens.len() < 2 {
        return true;
    }
    branch_tokens.iter().any(|token| prompt_tokens.contains(token))
}

/// Lowercase, split on whitespace/hyphens, drop stop words and pure-numeric
/// tokens.
fn content_tokens(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|token| !token.is_empty())
        .filter(|token| !STOP_WORDS.contains(token))
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Lowercase, collapse non-alphanumeric runs to single hyphens, strip edge
/// hyphens, cap the length.
fn slugify(text: &str) -> String {
    let slug: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let collapsed = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let capped: String = collapsed.chars().take(MAX_SLUG_CHARS).collect();
    capped.trim_matches('-').to_string()
}
