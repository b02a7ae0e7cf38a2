//! Helpers for parsing loosely formatted JSON responses returned by LLMs,
//! stripping code fences and extracting the first balanced object that parses.

use serde_json::Value;

/// Attempt to parse JSON even when the response contains code fences or extra text.
pub fn parse_json_relaxed(input: &str) -> Result<Value, String> {
    let t = strip_code_fences(input.trim());
    if t.is_empty() {
        return Err("empty response".into());
    }
    if let Ok(v) = serde_json::from_str::<Value>(t) {
        return Ok(v);
    }

    // walk the balanced `{...}` groups in order; the first that parses wins
    let mut from = 0;
    let mut last_err = None;
    while let Some(off) = t[from..].find('{') {
        let start = from + off;
        let Some(len) = balanced_object_len(&t[start..]) else {
            from = start + 1;
            continue;
        };
        match serde_json::from_str::<Value>(&t[start..start + len]) {
            Ok(v) => return Ok(v),
            Err(e) => {
                last_err = Some(e);
                from = start + len;
            }
        }
    }
    match last_err {
        Some(e) => Err(format!("invalid JSON after balance: {e}")),
        None => Err("no balanced JSON object found".into()),
    }
}

/// Remove a Markdown code fence (with or without a language tag) around the payload.
fn strip_code_fences(s: &str) -> &str {
    let mut s = s;
    if let Some(rest) = s.strip_prefix("```") {
        // drop the info string, e.g. "json" or "JSON"
        s = match rest.find('\n') {
            Some(nl) if rest[..nl].chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') => &rest[nl + 1..],
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    let s = s.trim_end();
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// Byte length of the balanced group opened by the `{` at the start of `s`.
fn balanced_object_len(s: &str) -> Option<usize> {
    let mut in_str = false;
    let mut esc = false;
    let mut stack: Vec<char> = Vec::new();

    for (i, ch) in s.char_indices() {
        if in_str {
            if esc {
                esc = false;
            } else if ch == '\\' {
                esc = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }

        match ch {
            '"' => in_str = true,
            '{' | '[' => stack.push(ch),
            '}' | ']' => {
                let open = stack.pop()?;
                let matches = (open == '{' && ch == '}') || (open == '[' && ch == ']');
                if !matches {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
