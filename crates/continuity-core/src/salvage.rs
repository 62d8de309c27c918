//! Best-effort recovery of a JSON object from raw LLM text output.
//!
//! LLMs asked for JSON routinely wrap it in prose, fences, or leave a
//! trailing comma. This runs a four-step fallback chain, each step only
//! attempted if the previous one failed to parse:
//!
//! 1. strict `serde_json` parse of the whole string;
//! 2. trim known prose prefixes/suffixes, retry;
//! 3. regex-extract every `{...}` span and keep the one with the most
//!    `:` tokens (a proxy for "most key-value pairs"), retry;
//! 4. light syntax repair (drop trailing commas, quote bare keys, strip
//!    comments), retry.
//!
//! If all four fail, returns an empty object — callers treat this as a
//! successful no-op, not a retryable error, to avoid retry-looping on a
//! pathological prompt/response pair.

use regex::Regex;
use serde_json::{Map, Value};

const KNOWN_PREFIXES: &[&str] = &["===== rawText =====", "生成json结果:", "当前时间:"];
const KNOWN_SUFFIXES: &[&str] = &["==================="];

/// Recover a JSON object from `raw`. Never errors; an unsalvageable input
/// yields an empty map.
pub fn salvage_json(raw: &str) -> Map<String, Value> {
    if let Some(obj) = try_parse_object(raw) {
        return obj;
    }

    let trimmed = strip_known_prose(raw);
    if trimmed != raw {
        if let Some(obj) = try_parse_object(&trimmed) {
            return obj;
        }
    }

    if let Some(candidate) = densest_candidate(&trimmed) {
        if let Some(obj) = try_parse_object(&candidate) {
            return obj;
        }
        let repaired = light_repair(&candidate);
        if let Some(obj) = try_parse_object(&repaired) {
            return obj;
        }
    }

    Map::new()
}

fn try_parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn strip_known_prose(raw: &str) -> String {
    let mut s = raw.to_string();
    for prefix in KNOWN_PREFIXES {
        if let Some(stripped) = s.strip_prefix(prefix) {
            s = stripped.to_string();
        }
    }
    for suffix in KNOWN_SUFFIXES {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.to_string();
        }
    }
    s.trim().to_string()
}

/// Find every `{...}` span (non-greedy, spanning newlines) and return the
/// one containing the most `:` characters, falling back to the first span
/// if all are tied.
fn densest_candidate(s: &str) -> Option<String> {
    let re = Regex::new(r"(?s)\{.*?\}").expect("static regex is valid");
    let mut best: Option<(usize, String)> = None;
    for m in re.find_iter(s) {
        let candidate = m.as_str().to_string();
        let score = candidate.matches(':').count();
        match &best {
            Some((best_score, _)) if *best_score >= score => {}
            _ => best = Some((score, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate)
}

fn light_repair(s: &str) -> String {
    let no_comments = strip_comments(s);
    let no_trailing_commas = Regex::new(r",(\s*[}\]])")
        .expect("static regex is valid")
        .replace_all(&no_comments, "$1")
        .to_string();
    Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*:)"#)
        .expect("static regex is valid")
        .replace_all(&no_trailing_commas, "$1\"$2\"$3")
        .to_string()
}

fn strip_comments(s: &str) -> String {
    let no_line_comments = Regex::new(r"//[^\n]*")
        .expect("static regex is valid")
        .replace_all(s, "");
    Regex::new(r"(?s)/\*.*?\*/")
        .expect("static regex is valid")
        .replace_all(&no_line_comments, "")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_passes_through_unchanged() {
        let out = salvage_json(r#"{"a": 1, "b": "x"}"#);
        assert_eq!(out.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn trims_known_prose_wrapper() {
        let raw = "===== rawText =====\n{\"topic\": \"cafe\"}\n===================";
        let out = salvage_json(raw);
        assert_eq!(out.get("topic").and_then(Value::as_str), Some("cafe"));
    }

    #[test]
    fn picks_densest_candidate_among_multiple_braces() {
        let raw = r#"note: {"x":1} actual: {"a":1,"b":2,"c":3}"#;
        let out = salvage_json(raw);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn repairs_trailing_comma_and_bare_keys() {
        let raw = "{a: 1, b: 2,}";
        let out = salvage_json(raw);
        assert_eq!(out.get("a"), Some(&Value::from(1)));
        assert_eq!(out.get("b"), Some(&Value::from(2)));
    }

    #[test]
    fn unsalvageable_input_yields_empty_map() {
        let out = salvage_json("not json at all, just prose.");
        assert!(out.is_empty());
    }
}
