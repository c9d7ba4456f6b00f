use super::{Decoded, SummaryResult};
use serde_json::{Map, Value};

/// Slice from the first `{` to the last `}` of a reply, if both exist in that order.
///
/// Replies often wrap JSON in prose or code fences. Validation is left to the JSON parser.
pub fn json_candidate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Decode a raw model reply without ever failing.
pub fn decode_reply(raw: &str) -> Decoded {
    let Some(candidate) = json_candidate(raw) else {
        tracing::debug!("Model reply has no JSON object; using raw text");
        return Decoded::Fallback(raw.to_string());
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Decoded::Structured(from_object(&object)),
        Ok(_) => Decoded::Fallback(raw.to_string()),
        Err(error) => {
            tracing::debug!(%error, "Model reply JSON did not parse; using raw text");
            Decoded::Fallback(raw.to_string())
        }
    }
}

// Field types are not validated; wrong-typed values are stringified instead of rejected.
fn from_object(object: &Map<String, Value>) -> SummaryResult {
    let summary = object
        .get("summary")
        .and_then(lenient_string)
        .unwrap_or_default();
    let key_points = match object.get("key_points") {
        Some(Value::Array(items)) => items.iter().filter_map(lenient_string).collect(),
        Some(Value::String(point)) if !point.trim().is_empty() => vec![point.clone()],
        _ => Vec::new(),
    };
    SummaryResult {
        summary,
        key_points,
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
