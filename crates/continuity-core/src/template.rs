//! Placeholder substitution for the system-prompt template.
//!
//! Two variants, matching the two ways a template can be filled:
//! [`compose_strict`] requires every `{name}` placeholder to resolve and
//! errors otherwise; [`compose_lenient`] leaves unresolved placeholders
//! untouched. Both escape substituted values through JSON string encoding
//! (then strip the surrounding quotes) so embedded quotes, newlines, and
//! backslashes can't break a template that is itself embedded in JSON.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{CoreError, Result};

fn placeholder_re() -> Regex {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("static regex is valid")
}

fn escape_value(value: &str) -> Result<String> {
    let quoted = serde_json::to_string(value)?;
    Ok(quoted[1..quoted.len() - 1].to_string())
}

/// Fill every `{name}` placeholder in `template`. Errors if any placeholder
/// has no entry in `vars`.
pub fn compose_strict(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let re = placeholder_re();
    let mut result = template.to_string();
    for caps in re.captures_iter(template) {
        let whole = &caps[0];
        let name = &caps[1];
        let value = vars
            .get(name)
            .ok_or_else(|| CoreError::Template(format!("missing variable: {name}")))?;
        let escaped = escape_value(value)?;
        result = result.replace(whole, &escaped);
    }
    Ok(result)
}

/// Fill every `{name}` placeholder in `template` that has a matching entry
/// in `vars`; placeholders with no match are left as literal text.
pub fn compose_lenient(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let re = placeholder_re();
    let mut result = template.to_string();
    for caps in re.captures_iter(template) {
        let whole = &caps[0];
        let name = &caps[1];
        if let Some(value) = vars.get(name) {
            let escaped = escape_value(value)?;
            result = result.replace(whole, &escaped);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn strict_fills_every_placeholder() {
        let out = compose_strict("hello {name}", &vars(&[("name", "world")])).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn strict_errors_on_missing_variable() {
        let err = compose_strict("hello {name}", &HashMap::new()).unwrap_err();
        assert_eq!(err.code(), "TEMPLATE_ERROR");
    }

    #[test]
    fn lenient_leaves_unmatched_placeholders_literal() {
        let out = compose_lenient("hello {name}, {unset}", &vars(&[("name", "world")])).unwrap();
        assert_eq!(out, "hello world, {unset}");
    }

    #[test]
    fn escapes_embedded_quotes_and_newlines() {
        let out = compose_strict("v={value}", &vars(&[("value", "a\"b\nc")])).unwrap();
        assert_eq!(out, "v=a\\\"b\\nc");
    }
}
