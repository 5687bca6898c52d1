use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    types::WineStyle,
    wine::{Citation, PartialCharacteristics, SCALE_MAX, SCALE_MIN, WineAnalysis, scale_number},
};

use super::SynthesisError;

/// Concatenated non-thought text of the first candidate.
///
/// A candidate with no text yields `"{}"` so an empty answer normalizes to
/// placeholders; a response with no candidate at all is a parse failure.
pub fn extract_text(data: &Value) -> Result<String, SynthesisError> {
    let Some(candidate) = data.get("candidates").and_then(|c| c.get(0)) else {
        let reason = data
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .unwrap_or("none");
        return Err(SynthesisError::Parse(format!(
            "no candidates returned (block reason: {reason})"
        )));
    };

    let mut text = String::new();
    if let Some(parts) = candidate.pointer("/content/parts").and_then(Value::as_array) {
        for part in parts {
            if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
                continue;
            }
            if let Some(t) = part.get("text").and_then(Value::as_str) {
                text.push_str(t);
            }
        }
    }

    if text.trim().is_empty() {
        return Ok("{}".to_string());
    }
    Ok(text)
}

/// Grounding citations of the first candidate with a non-empty URI.
///
/// Never fails: malformed or absent metadata gives an empty list.
pub fn extract_citations(data: &Value) -> Vec<Citation> {
    let Some(chunks) = data
        .pointer("/candidates/0/groundingMetadata/groundingChunks")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    chunks
        .iter()
        .filter_map(|chunk| {
            let web = chunk.get("web")?;
            let uri = web.get("uri")?.as_str()?.trim();
            if uri.is_empty() {
                return None;
            }
            let title = web
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(uri);
            Some(Citation {
                title: title.to_string(),
                uri: uri.to_string(),
            })
        })
        .collect()
}

/// Validates model text against the wine shape.
///
/// The text must be a JSON object. Fields are read leniently and scale
/// values are clamped into 1..=5.
pub fn parse_analysis(text: &str) -> Result<WineAnalysis, SynthesisError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| SynthesisError::Parse(format!("not JSON: {e}")))?;
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(SynthesisError::Parse(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )));
        }
    };

    let style = text_field(&obj, "style").and_then(|s| match s.parse::<WineStyle>() {
        Ok(style) => Some(style),
        Err(err) => {
            warn!(%err, "ignoring style outside the known set");
            None
        }
    });

    let characteristics = match obj.get("characteristics") {
        None | Some(Value::Null) => None,
        Some(Value::Object(c)) => Some(PartialCharacteristics {
            body: scale_field(c, "body"),
            acidity: scale_field(c, "acidity"),
            tannin: scale_field(c, "tannin"),
            sweetness: scale_field(c, "sweetness"),
        }),
        Some(other) => {
            warn!(kind = kind_of(other), "ignoring non-object characteristics");
            None
        }
    };

    Ok(WineAnalysis {
        name: text_field(&obj, "name"),
        winery: text_field(&obj, "winery"),
        varietal: text_field(&obj, "varietal"),
        region: text_field(&obj, "region"),
        vintage: text_field(&obj, "vintage"),
        style,
        summary: text_field(&obj, "summary"),
        characteristics,
    })
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let s = match obj.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn scale_field(obj: &Map<String, Value>, key: &str) -> Option<u8> {
    let raw = scale_number(obj.get(key)?)?;
    let clamped = raw.clamp(i64::from(SCALE_MIN), i64::from(SCALE_MAX));
    if clamped != raw {
        warn!(axis = key, value = raw, clamped, "characteristic outside 1-5 scale");
    }
    u8::try_from(clamped).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(inner) = t.strip_prefix("```") else {
        return t;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
