use serde_json::{Map, Value};

/// Extract the first plausible JSON object from raw model output.
///
/// Two-phase: locate the span from the first `{` to the last `}`, then
/// attempt a structured decode of that slice. Markdown fences and prose
/// before or after the object fall away by construction. Model output is
/// not guaranteed to be JSON at all, so anything that fails to decode as an
/// object yields `None` — the caller substitutes the fallback result.
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
