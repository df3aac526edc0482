// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Pulls the first JSON object out of free-form model output.
///
/// Tried in order: the whole text, fenced code blocks, the first balanced
/// `{...}` span, then everything from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        debug!("Parsed entire model reply as JSON");
        return Some(map);
    }

    for (language, block) in extract_code_blocks(trimmed) {
        if language.as_deref() == Some("json") || language.is_none() {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&block) {
                debug!("Extracted JSON from markdown code fence");
                return Some(map);
            }
        }
    }

    if let Some(candidate) = find_balanced_object(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            debug!("Extracted balanced JSON object from model reply");
            return Some(map);
        }
        warn!(candidate = candidate, "Balanced JSON-like span failed to parse");
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => {
            debug!("Extracted JSON object by outer braces");
            Some(map)
        }
        _ => None,
    }
}

/// First top-level `{...}` span, ignoring braces inside string literals.
fn find_balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| &text[s..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn extract_code_blocks(text: &str) -> Vec<(Option<String>, String)> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        let Some(line_end) = after_fence.find('\n') else {
            break;
        };
        let language = after_fence[..line_end].trim();
        let body = &after_fence[line_end + 1..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push((
            (!language.is_empty()).then(|| language.to_lowercase()),
            body[..close].trim().to_string(),
        ));
        rest = &body[close + 3..];
    }
    blocks
}

pub fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Strings from a JSON array; non-string items are skipped. A bare string is
/// treated as a one-element list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Integer from a number (floats are rounded) or a numeric string.
pub fn int_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_text_object() {
        let map = extract_json_object(r#" {"event": "flood"} "#).unwrap();
        assert_eq!(map["event"], "flood");
    }

    #[test]
    fn fenced_block() {
        let text = "Sure! Here it is:\n```json\n{\"impacts\": []}\n```\nHope that helps.";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["impacts"], json!([]));
    }

    #[test]
    fn balanced_span_ignores_braces_in_strings() {
        let text = r#"Answer: {"effect": "a } b", "order": 2} and {"other": 1}"#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["effect"], "a } b");
        assert!(map.get("other").is_none());
    }

    #[test]
    fn no_json_yields_none() {
        assert!(extract_json_object("I cannot help with that").is_none());
        assert!(extract_json_object("} backwards {").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
    }

    #[test]
    fn field_helpers() {
        let map = json!({
            "a": " x ",
            "n": "4",
            "f": 3.6,
            "list": ["one", 2, "", "three"],
            "single": "solo"
        });
        let map = map.as_object().unwrap();
        assert_eq!(str_field(map, "a"), Some("x"));
        assert_eq!(int_field(map, "n"), Some(4));
        assert_eq!(int_field(map, "f"), Some(4));
        assert_eq!(int_field(map, "missing"), None);
        assert_eq!(string_list(map.get("list")), ["one", "three"]);
        assert_eq!(string_list(map.get("single")), ["solo"]);
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("ab", 80), "ab");
    }
}
