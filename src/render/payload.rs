use crate::error::RenderResult;
use serde::Serialize;
use serde_json::Value;

/// Convert any serializable payload into a JSON value, keeping key order.
pub fn to_payload_value<T: Serialize + ?Sized>(payload: &T) -> RenderResult<Value> {
    Ok(serde_json::to_value(payload)?)
}

/// Two-space indented serialization with insertion-ordered keys.
pub fn pretty_json(value: &Value) -> RenderResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Text shown for a scalar payload: strings verbatim, everything else as JSON.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadText {
    Structured(String),
    Plain(String),
}

pub fn payload_text(value: &Value) -> RenderResult<PayloadText> {
    if is_composite(value) {
        pretty_json(value).map(PayloadText::Structured)
    } else {
        Ok(PayloadText::Plain(plain_text(value)))
    }
}
