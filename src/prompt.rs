//! Prompt text for the scope-reflection elicitation call
//!
//! The wording here is an implementation detail; the JSON shape it asks for
//! is the wire form of [`crate::scope::ScopeReflection`].

use crate::scope::{StyleScopeContract, StyleScopeMode};

pub const SCOPE_REFLECTION_SYSTEM: &str = r#"You are a senior engineer reviewing a change request before any code is written. Your job is to state the blast radius of the request, not to implement it.

OUTPUT FORMAT (JSON):
{
  "reasoning": "1-2 sentences on how you scoped the request",
  "mustChange": ["areas or files that must change"],
  "mustAvoid": ["areas or files that must NOT change"],
  "mustHave": ["behaviors the finished change must keep"],
  "testsNeeded": true
}

RULES:
- Keep every list short and concrete; paths beat prose
- mustAvoid is the contract: anything listed there is off limits
- Set testsNeeded to false ONLY for pure styling or copy changes
- Output ONLY the JSON object, no markdown fences, no commentary"#;

/// Build the user message for a contract-elicitation request.
pub fn build_scope_reflection_request(
    goal_prompt: &str,
    style_scope: Option<&StyleScopeContract>,
) -> String {
    let mut request = format!("Change request:\n{}\n", goal_prompt.trim());

    if let Some(style) = style_scope {
        match style.mode {
            StyleScopeMode::Global => {
                request.push_str(
                    "\nThis is an app-wide styling request; global stylesheets and selectors are in scope.\n",
                );
            }
            StyleScopeMode::Targeted => {
                request.push_str(
                    "\nThis is a targeted styling request. Scope it to the named element; global selectors and whole-app restyles are out of bounds.\n",
                );
                if !style.target_hints.is_empty() {
                    request.push_str(&format!(
                        "Likely targets: {}\n",
                        style.target_hints.join(", ")
                    ));
                }
            }
        }
    }

    request.push_str("\nState the scope contract as JSON.");
    request
}
