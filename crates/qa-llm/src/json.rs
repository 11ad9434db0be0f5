//! Defensive JSON parsing for LLM responses — Claude sometimes wraps JSON in
//! markdown fences, leaves trailing commas, or emits stray control
//! characters. Grounded on
//! `examples/original_source/src/ai/client.py::_parse_json_response`.

use regex::Regex;
use serde_json::Value;

use crate::errors::LlmError;

/// Strip fences, trailing commas, `//` comments and escape raw control
/// characters before falling back to a brace-boundary extraction, mirroring
/// the original's multi-attempt ladder.
pub fn parse_json_response(text: &str) -> Result<Value, LlmError> {
    let mut cleaned = strip_code_fences(text.trim());

    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }

    cleaned = strip_line_comments(&cleaned);
    cleaned = strip_trailing_commas(&cleaned);
    cleaned = escape_control_chars(&cleaned);
    cleaned = extract_outermost_object(&cleaned);

    serde_json::from_str(&cleaned).map_err(|err| LlmError::InvalidJson(err.to_string()))
}

fn strip_code_fences(text: &str) -> String {
    let fence = Regex::new(r"(?s)^```(?:json|python|javascript)?\s*\n(.*?)\n```\s*$").unwrap();
    if let Some(caps) = fence.captures(text) {
        return caps[1].trim().to_string();
    }
    text.trim_matches('`').trim().to_string()
}

fn strip_line_comments(text: &str) -> String {
    // Rust's regex crate has no lookbehind, so the preceding delimiter is
    // captured and re-emitted instead of asserted.
    let after_token = Regex::new(r"([\s,\]\}])//[^\n]*").unwrap();
    let at_line_start = Regex::new(r"(?m)^//[^\n]*").unwrap();
    let once = after_token.replace_all(text, "$1");
    at_line_start.replace_all(&once, "").into_owned()
}

fn strip_trailing_commas(text: &str) -> String {
    let re = Regex::new(r",\s*([}\]])").unwrap();
    re.replace_all(text, "$1").into_owned()
}

fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let cp = ch as u32;
        if cp < 0x20 && ch != '\n' && ch != '\r' {
            out.push_str(&format!("\\u{cp:04x}"));
        } else {
            out.push(ch);
        }
    }
    out
}

fn extract_outermost_object(text: &str) -> String {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Extracts the first top-level `{...}` span, used when a response interleaves
/// prose with a JSON object rather than wrapping it in fences.
pub fn extract_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    for (i, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let value = parse_json_response(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn strips_markdown_fences() {
        let text = "```json\n{\"a\": 1}\n```";
        let value = parse_json_response(text).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn strips_trailing_commas() {
        let text = r#"{"a": 1, "b": [1, 2,],}"#;
        let value = parse_json_response(text).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let text = "Sure thing! {\"a\": 1} Hope that helps.";
        let value = parse_json_response(text).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn extract_json_object_balances_nested_braces() {
        let text = "prefix {\"a\": {\"b\": 1}} suffix";
        let extracted = extract_json_object(text).unwrap();
        assert_eq!(extracted, r#"{"a": {"b": 1}}"#);
    }
}
