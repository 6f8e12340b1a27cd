//! Lenient JSON helpers.
//!
//! The documents this engine consumes (workload manifests, workload
//! sets, global.json) are published under permissive JSON rules:
//! comments and trailing commas are allowed, and property names match
//! case-insensitively. serde_json is strict, so parsing runs a small
//! stripping pre-pass first.

use serde_json::{Map, Value};

/// Parse JSON text, tolerating comments and trailing commas.
pub fn parse_lenient(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(&strip_lenient_syntax(text))
}

/// Remove `//` and `/* */` comments plus trailing commas, preserving
/// string contents (including escapes) untouched.
pub fn strip_lenient_syntax(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                // Copy the whole string literal, honoring escapes.
                let start = i;
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                out.push_str(&text[start..i.min(bytes.len())]);
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            b',' => {
                // Drop the comma if the next significant byte closes a
                // container, skipping whitespace and comments on the way.
                let mut j = i + 1;
                loop {
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j + 1 < bytes.len() && bytes[j] == b'/' && bytes[j + 1] == b'/' {
                        while j < bytes.len() && bytes[j] != b'\n' {
                            j += 1;
                        }
                        continue;
                    }
                    if j + 1 < bytes.len() && bytes[j] == b'/' && bytes[j + 1] == b'*' {
                        j += 2;
                        while j + 1 < bytes.len() && !(bytes[j] == b'*' && bytes[j + 1] == b'/') {
                            j += 1;
                        }
                        j = (j + 2).min(bytes.len());
                        continue;
                    }
                    break;
                }
                if !(j < bytes.len() && (bytes[j] == b'}' || bytes[j] == b']')) {
                    out.push(',');
                }
                i += 1;
            }
            b => {
                // Copy a full UTF-8 sequence, not a single byte.
                let len = match b {
                    _ if b < 0x80 => 1,
                    _ if b >> 5 == 0b110 => 2,
                    _ if b >> 4 == 0b1110 => 3,
                    _ => 4,
                };
                let end = (i + len).min(bytes.len());
                out.push_str(&text[i..end]);
                i = end;
            }
        }
    }

    out
}

/// Case-insensitive property lookup on a JSON object.
pub fn get_ci<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// String property lookup (case-insensitive key).
pub fn get_str_ci(object: &Map<String, Value>, key: &str) -> Option<String> {
    get_ci(object, key).and_then(Value::as_str).map(str::to_string)
}

/// Boolean property that also accepts the literal strings `"true"` and
/// `"false"` (the schema has drifted between the two historically).
pub fn as_bool_lenient(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// String-list property: accepts a single string or an array of strings.
pub fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
