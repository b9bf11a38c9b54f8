use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timestamp exactly as it arrived on the event.
///
/// Accepts RFC 3339 strings and epoch milliseconds. Anything else is kept
/// as-is and reported as unreadable by [`EventTimestamp::to_utc`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTimestamp(Value);

impl EventTimestamp {
    pub fn from_raw(value: Value) -> Self {
        Self(value)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(Value::from(millis))
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match &self.0 {
            Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(number) => {
                let millis = number.as_i64().or_else(|| {
                    number
                        .as_f64()
                        .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })?;
                Utc.timestamp_millis_opt(millis).single()
            }
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for EventTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }
}

/// A tool call has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationEvent<I = Value> {
    pub name: String,
    pub input: I,
    #[serde(default)]
    pub timestamp: EventTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl<I> ToolInvocationEvent<I> {
    pub fn new(name: impl Into<String>, input: I, timestamp: impl Into<EventTimestamp>) -> Self {
        Self {
            name: name.into(),
            input,
            timestamp: timestamp.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Outcome of a tool call.
///
/// `tool_name` and `tool_call_id` are optional correlation hints; plain
/// result rendering ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultEvent<D = Value> {
    pub data: D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl<D> ToolResultEvent<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn for_tool(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }

    pub fn with_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }
}

/// One line of a JSONL transcript stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    ToolStart(ToolInvocationEvent),
    ToolResult(ToolResultEvent),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_accepts_rfc3339_and_epoch_millis() {
        let rfc = EventTimestamp::from_raw(json!("2024-05-01T13:04:05Z"));
        let millis = EventTimestamp::from_millis(1_714_568_645_000);

        assert_eq!(rfc.to_utc(), millis.to_utc());
        assert!(rfc.to_utc().is_some());
    }

    #[test]
    fn test_timestamp_rejects_unreadable_values() {
        assert_eq!(EventTimestamp::from_raw(json!("yesterday")).to_utc(), None);
        assert_eq!(EventTimestamp::from_raw(json!({ "at": 1 })).to_utc(), None);
        assert_eq!(EventTimestamp::default().to_utc(), None);
    }

    #[test]
    fn test_transcript_event_parses_tagged_lines() {
        let line = r#"{"type":"tool_start","name":"search","input":{"query":"cats"},"timestamp":"2024-05-01T13:04:05Z"}"#;
        let event: TranscriptEvent = serde_json::from_str(line).unwrap();
        match event {
            TranscriptEvent::ToolStart(start) => {
                assert_eq!(start.name, "search");
                assert_eq!(start.input, json!({ "query": "cats" }));
                assert_eq!(start.id, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let line = r#"{"type":"tool_result","data":"42 results found","tool_name":"search"}"#;
        let event: TranscriptEvent = serde_json::from_str(line).unwrap();
        assert_eq!(
            event,
            TranscriptEvent::ToolResult(ToolResultEvent::new(json!("42 results found")).for_tool("search"))
        );
    }

    #[test]
    fn test_missing_timestamp_defaults_to_unreadable() {
        let line = r#"{"type":"tool_start","name":"ls","input":{}}"#;
        let event: TranscriptEvent = serde_json::from_str(line).unwrap();
        let TranscriptEvent::ToolStart(start) = event else {
            panic!("expected tool_start");
        };
        assert_eq!(start.timestamp.to_utc(), None);
    }
}
