//! Free-text entity extraction
//!
//! Generative models reply in prose, fenced code blocks, or something in
//! between. This module recovers product identifiers from whatever came
//! back: a strict JSON attempt first, then a token/quote scan fallback.
//! It never errors; total failure yields an empty list, which callers
//! treat as "no structured data recoverable".

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::product::ProductId;

/// Recovers product identifiers from an unstructured generator reply.
pub fn extract_product_ids(text: &str) -> Vec<ProductId> {
    if let Some(ids) = extract_from_json(text) {
        return ids;
    }
    fallback_scan(text)
}

/// Primary path: strip an optional code fence, slice the outermost JSON
/// array, parse as a list of strings, and keep the well-formed
/// identifiers. `None` means the reply held no parseable JSON array and
/// the fallback should run; invalid entries inside a parsed array are
/// silently skipped, not fatal.
fn extract_from_json(text: &str) -> Option<Vec<ProductId>> {
    let body = strip_code_fence(text).unwrap_or(text);
    let slice = bracket_slice(body)?;
    let entries: Vec<String> = serde_json::from_str(slice).ok()?;
    Some(entries.iter().filter_map(|entry| parse_canonical(entry)).collect())
}

/// Fallback path: whitespace tokens with surrounding punctuation trimmed,
/// plus quoted spans, merged into one deduplicated set.
fn fallback_scan(text: &str) -> Vec<ProductId> {
    let mut found: BTreeSet<ProductId> = BTreeSet::new();

    for token in text.split_whitespace() {
        let trimmed =
            token.trim_matches(|c: char| c.is_ascii_punctuation() && c != '-');
        if let Some(id) = parse_canonical(trimmed) {
            found.insert(id);
        }
    }

    // Quoted spans may contain identifiers the token scan split apart.
    for (index, span) in text.split('"').enumerate() {
        if index % 2 == 1 {
            if let Some(id) = parse_canonical(span) {
                found.insert(id);
            }
        }
    }

    found.into_iter().collect()
}

/// Strips one leading/trailing fenced code block, with or without a
/// language tag on the opening fence.
pub(crate) fn strip_code_fence(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix("```")?;
    let after_tag = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let inner = after_tag.strip_suffix("```")?;
    Some(inner.trim())
}

/// Substring from the first `[` to the last `]`, inclusive.
pub(crate) fn bracket_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Accepts only the canonical 8-4-4-4-12 hyphenated hex form.
pub(crate) fn parse_canonical(value: &str) -> Option<ProductId> {
    let trimmed = value.trim();
    if trimmed.len() != 36 {
        return None;
    }
    let bytes = trimmed.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        match index {
            8 | 13 | 18 | 23 => {
                if *byte != b'-' {
                    return None;
                }
            }
            _ => {
                if !byte.is_ascii_hexdigit() {
                    return None;
                }
            }
        }
    }
    Uuid::parse_str(trimmed).ok().map(ProductId)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID_A: &str = "0a821a54-3a71-4f0e-8cc5-f31e3c190d27";
    const ID_B: &str = "7b51e5bc-90a6-4b8f-a5c8-0d1a2f3b4c5d";

    #[test]
    fn parses_fenced_json_array() {
        let reply = format!("```json\n[\"{ID_A}\", \"{ID_B}\"]\n```");
        let ids = extract_product_ids(&reply);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].to_string(), ID_A);
    }

    #[test]
    fn parses_bare_fence_without_language_tag() {
        let reply = format!("```\n[\"{ID_A}\"]\n```");
        assert_eq!(extract_product_ids(&reply).len(), 1);
    }

    #[test]
    fn parses_array_embedded_in_prose() {
        let reply = format!("Here are my picks: [\"{ID_A}\"] — hope that helps!");
        assert_eq!(extract_product_ids(&reply).len(), 1);
    }

    #[test]
    fn invalid_entries_are_skipped_not_fatal() {
        let reply = format!("[\"{ID_A}\", \"not-a-uuid\", \"12345\"]");
        let ids = extract_product_ids(&reply);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].to_string(), ID_A);
    }

    #[test]
    fn falls_back_to_token_scan_on_broken_json() {
        let reply = format!("I would suggest {ID_A}, and maybe ({ID_B}).");
        let ids = extract_product_ids(&reply);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn fallback_also_scans_quoted_spans() {
        let reply = format!("the best match is \"{ID_A}\" overall");
        assert_eq!(extract_product_ids(&reply).len(), 1);
    }

    #[test]
    fn fallback_deduplicates_across_sources() {
        let reply = format!("\"{ID_A}\" was mentioned twice: {ID_A}");
        assert_eq!(extract_product_ids(&reply).len(), 1);
    }

    #[test]
    fn total_failure_returns_empty_list() {
        assert!(extract_product_ids("no identifiers here at all").is_empty());
        assert!(extract_product_ids("").is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let reply = format!("```json\n[\"{ID_B}\", \"{ID_A}\"]\n```");
        let first = extract_product_ids(&reply);
        let second = extract_product_ids(&reply);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_unhyphenated_hex() {
        assert!(parse_canonical("0a821a543a714f0e8cc5f31e3c190d27").is_none());
        assert!(parse_canonical(ID_A).is_some());
    }

    #[test]
    fn bracket_slice_spans_first_to_last() {
        assert_eq!(bracket_slice("x [1, [2]] y"), Some("[1, [2]]"));
        assert_eq!(bracket_slice("no array"), None);
        assert_eq!(bracket_slice("] backwards ["), None);
    }
}
