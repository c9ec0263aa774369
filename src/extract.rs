//! Tolerant JSON extraction from free-form planning output
//!
//! Planning responses wrap their JSON in prose, markdown fences, comments,
//! smart quotes, and other malformations a strict parser rejects. This module
//! locates the balanced span and repairs the common issues so `serde_json`
//! can take it from there. Extraction never fails hard: every entry point
//! degrades to `None` instead of erroring.

use regex::Regex;
use serde_json::Value;

/// Lexer state shared by the balanced-span scanner and the repair passes.
///
/// Braces inside string literals and comment bodies must never affect depth,
/// so every pass walks the text with this same state machine rather than ad
/// hoc flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Normal,
    InString { quote: char, escaped: bool },
    InLineComment,
    InBlockComment,
}

/// Extract the first balanced `{...}` span from noisy text.
///
/// The text is normalized first (smart quotes, `\uXXXX` escapes, literal
/// newlines inside strings), then scanned from the first `{`. Returns the
/// minimal balanced substring, or `None` when no balanced span exists.
pub fn extract_json_object(text: &str) -> Option<String> {
    let normalized = normalize_json_like_text(text);
    let start = normalized.find('{')?;
    balanced_span(&normalized, start)
}

/// Extract the first balanced `[...]` span from noisy text.
pub fn extract_json_array(text: &str) -> Option<String> {
    let normalized = normalize_json_like_text(text);
    let start = normalized.find('[')?;
    balanced_span(&normalized, start)
}

/// Extract the first balanced object whose raw text carries a `"key":` for
/// the given key name.
///
/// Responses sometimes lead with an unrelated object (a preamble, a stats
/// block) before the one that matters, so every `{` occurrence is tried in
/// order.
pub fn extract_json_object_with_key(text: &str, key: &str) -> Option<String> {
    let normalized = normalize_json_like_text(text);
    let pattern = Regex::new(&format!(r#""{}"\s*:"#, regex::escape(key))).ok()?;

    let mut search_from = 0;
    while let Some(pos) = normalized[search_from..].find('{') {
        let start = search_from + pos;
        if let Some(candidate) = balanced_span(&normalized, start) {
            if pattern.is_match(&candidate) {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Best-effort repair-then-parse of JSON-ish text.
///
/// Valid input parses strictly and passes through unrepaired. Otherwise the
/// repair pipeline runs: quote/escape normalization, doubled-brace unwrap,
/// comment stripping, single-to-double quote conversion, bare-key quoting,
/// and trailing-comma removal. Returns `None` when no repair produces a
/// parseable object or array; never panics.
pub fn try_parse_loose_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_array() {
            return Some(value);
        }
    }

    let normalized = normalize_json_like_text(trimmed);
    let unwrapped = unwrap_doubled_braces(normalized.trim());
    let stripped = strip_comments(unwrapped);
    let requoted = convert_single_quotes(&stripped);
    let keyed = quote_bare_keys(&requoted);
    let repaired = remove_trailing_commas(&keyed);

    match serde_json::from_str::<Value>(repaired.trim()) {
        Ok(value) if value.is_object() || value.is_array() => Some(value),
        _ => None,
    }
}

/// Normalize model-emitted text toward strict JSON.
///
/// Decodes `\uXXXX` escapes (surrogate pairs included), converts smart quotes
/// to straight quotes, and escapes literal newline/carriage-return characters
/// that appear inside double-quoted string literals. An unescaped literal
/// newline inside a quoted string is invalid in strict JSON even though
/// models routinely emit it that way.
pub fn normalize_json_like_text(text: &str) -> String {
    let decoded = decode_unicode_escapes(text);
    let straightened: String = decoded
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    escape_newlines_in_strings(&straightened)
}

/// Scan from `start` (which must point at `{` or `[`) and return the minimal
/// balanced substring. Unterminated strings, comments, or spans yield `None`.
fn balanced_span(text: &str, start: usize) -> Option<String> {
    let mut state = LexState::Normal;
    let mut depth: i64 = 0;
    let mut iter = text[start..].char_indices().peekable();

    while let Some((offset, c)) = iter.next() {
        match state {
            LexState::Normal => match c {
                '"' | '\'' => {
                    state = LexState::InString {
                        quote: c,
                        escaped: false,
                    };
                }
                '{' | '[' => depth += 1,
                '}' | ']' => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset + c.len_utf8();
                        return Some(text[start..end].to_string());
                    }
                    if depth < 0 {
                        return None;
                    }
                }
                '/' => match iter.peek() {
                    Some((_, '/')) => {
                        iter.next();
                        state = LexState::InLineComment;
                    }
                    Some((_, '*')) => {
                        iter.next();
                        state = LexState::InBlockComment;
                    }
                    _ => {}
                },
                _ => {}
            },
            LexState::InString { quote, escaped } => {
                if escaped {
                    state = LexState::InString {
                        quote,
                        escaped: false,
                    };
                } else if c == '\\' {
                    state = LexState::InString {
                        quote,
                        escaped: true,
                    };
                } else if c == quote {
                    state = LexState::Normal;
                }
            }
            LexState::InLineComment => {
                if c == '\n' {
                    state = LexState::Normal;
                }
            }
            LexState::InBlockComment => {
                if c == '*' && matches!(iter.peek(), Some((_, '/'))) {
                    iter.next();
                    state = LexState::Normal;
                }
            }
        }
    }

    None
}

/// Decode `\uXXXX` escape sequences, combining surrogate pairs. Escaped
/// backslashes (`\\u...`) and undecodable sequences are copied verbatim.
fn decode_unicode_escapes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() && chars[i + 1] == '\\' {
            out.push('\\');
            out.push('\\');
            i += 2;
            continue;
        }

        match parse_unicode_escape(&chars, i) {
            Some((high, consumed)) if (0xD800..0xDC00).contains(&high) => {
                // Leading surrogate: a trailing surrogate must follow.
                match parse_unicode_escape(&chars, i + consumed) {
                    Some((low, low_consumed)) if (0xDC00..0xE000).contains(&low) => {
                        let combined =
                            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        match char::from_u32(combined) {
                            Some(decoded) => {
                                out.push(decoded);
                                i += consumed + low_consumed;
                            }
                            None => {
                                out.push(chars[i]);
                                i += 1;
                            }
                        }
                    }
                    _ => {
                        out.push(chars[i]);
                        i += 1;
                    }
                }
            }
            Some((code, consumed)) => match char::from_u32(code) {
                Some(decoded) => {
                    out.push(decoded);
                    i += consumed;
                }
                None => {
                    out.push(chars[i]);
                    i += 1;
                }
            },
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }

    out
}

/// Parse a `\uXXXX` sequence at `start`, returning the code unit and the
/// number of chars consumed (always 6 on success).
fn parse_unicode_escape(chars: &[char], start: usize) -> Option<(u32, usize)> {
    if start + 6 > chars.len() {
        return None;
    }
    if chars[start] != '\\' || chars[start + 1] != 'u' {
        return None;
    }
    let hex: String = chars[start + 2..start + 6].iter().collect();
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok().map(|code| (code, 6))
}

/// Escape literal `\n`/`\r` characters that occur inside double-quoted
/// string literals.
fn escape_newlines_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = LexState::Normal;

    for c in text.chars() {
        match state {
            LexState::Normal => {
                if c == '"' {
                    state = LexState::InString {
                        quote: '"',
                        escaped: false,
                    };
                }
                out.push(c);
            }
            LexState::InString { quote, escaped } => {
                if escaped {
                    state = LexState::InString {
                        quote,
                        escaped: false,
                    };
                    out.push(c);
                } else if c == '\\' {
                    state = LexState::InString {
                        quote,
                        escaped: true,
                    };
                    out.push(c);
                } else if c == '\n' {
                    out.push_str("\\n");
                } else if c == '\r' {
                    out.push_str("\\r");
                } else {
                    if c == quote {
                        state = LexState::Normal;
                    }
                    out.push(c);
                }
            }
            // This pass never enters comment states.
            LexState::InLineComment | LexState::InBlockComment => out.push(c),
        }
    }

    out
}

/// Unwrap one layer of doubled outer braces (`{{ ... }}` → `{ ... }`) when
/// both ends match. Some template-minded models double their braces.
fn unwrap_doubled_braces(text: &str) -> &str {
    if text.len() >= 4 && text.starts_with("{{") && text.ends_with("}}") {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Remove `//` and `/* */` comments that occur outside string literals.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = LexState::Normal;
    let mut iter = text.chars().peekable();

    while let Some(c) = iter.next() {
        match state {
            LexState::Normal => match c {
                '"' | '\'' => {
                    state = LexState::InString {
                        quote: c,
                        escaped: false,
                    };
                    out.push(c);
                }
                '/' => match iter.peek() {
                    Some('/') => {
                        iter.next();
                        state = LexState::InLineComment;
                    }
                    Some('*') => {
                        iter.next();
                        state = LexState::InBlockComment;
                    }
                    _ => out.push(c),
                },
                _ => out.push(c),
            },
            LexState::InString { quote, escaped } => {
                if escaped {
                    state = LexState::InString {
                        quote,
                        escaped: false,
                    };
                } else if c == '\\' {
                    state = LexState::InString {
                        quote,
                        escaped: true,
                    };
                } else if c == quote {
                    state = LexState::Normal;
                }
                out.push(c);
            }
            LexState::InLineComment => {
                if c == '\n' {
                    state = LexState::Normal;
                    out.push(c);
                }
            }
            LexState::InBlockComment => {
                if c == '*' && matches!(iter.peek(), Some('/')) {
                    iter.next();
                    state = LexState::Normal;
                }
            }
        }
    }

    out
}

/// Convert single-quoted strings to double-quoted ones. At this stage no
/// literal apostrophes are expected inside values produced by the upstream
/// format, so the quote characters substitute directly; double quotes found
/// inside a converted string are escaped.
fn convert_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = LexState::Normal;
    let mut iter = text.chars().peekable();

    while let Some(c) = iter.next() {
        match state {
            LexState::Normal => match c {
                '"' => {
                    state = LexState::InString {
                        quote: '"',
                        escaped: false,
                    };
                    out.push(c);
                }
                '\'' => {
                    state = LexState::InString {
                        quote: '\'',
                        escaped: false,
                    };
                    out.push('"');
                }
                _ => out.push(c),
            },
            LexState::InString { quote: '"', escaped } => {
                if escaped {
                    state = LexState::InString {
                        quote: '"',
                        escaped: false,
                    };
                } else if c == '\\' {
                    state = LexState::InString {
                        quote: '"',
                        escaped: true,
                    };
                } else if c == '"' {
                    state = LexState::Normal;
                }
                out.push(c);
            }
            LexState::InString { quote: '\'', .. } => match c {
                '\\' => {
                    // `\'` drops the backslash (not a valid JSON escape once
                    // the string is double-quoted); other escapes copy through.
                    if matches!(iter.peek(), Some('\'')) {
                        iter.next();
                        out.push('\'');
                    } else {
                        out.push('\\');
                        if let Some(next) = iter.next() {
                            out.push(next);
                        }
                    }
                }
                '\'' => {
                    state = LexState::Normal;
                    out.push('"');
                }
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }

    out
}

/// Quote bare identifier keys that immediately follow `{` or `,` and precede
/// `:`.
fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut last_significant = '\0';
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last_significant = '"';
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if c.is_whitespace() {
            out.push(c);
            i += 1;
            continue;
        }

        let key_position = last_significant == '{' || last_significant == ',';
        if key_position && (c.is_ascii_alphabetic() || c == '_' || c == '$') {
            let mut end = i;
            while end < chars.len()
                && (chars[end].is_ascii_alphanumeric() || chars[end] == '_' || chars[end] == '$')
            {
                end += 1;
            }
            let mut lookahead = end;
            while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                lookahead += 1;
            }
            let ident: String = chars[i..end].iter().collect();
            if lookahead < chars.len() && chars[lookahead] == ':' {
                out.push('"');
                out.push_str(&ident);
                out.push('"');
            } else {
                out.push_str(&ident);
            }
            last_significant = chars[end - 1];
            i = end;
            continue;
        }

        out.push(c);
        last_significant = c;
        i += 1;
    }

    out
}

/// Remove commas that are immediately followed (ignoring whitespace) by a
/// closing `}` or `]`.
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ',' => {
                let mut lookahead = i + 1;
                while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                    lookahead += 1;
                }
                if lookahead < chars.len()
                    && (chars[lookahead] == '}' || chars[lookahead] == ']')
                {
                    i += 1; // drop the comma, keep the whitespace run
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
