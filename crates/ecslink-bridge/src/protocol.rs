//! Wire format for the command bridge.
//!
//! Outbound commands are UTF-8 JSON text frames that carry `cmd` and
//! `$requestId` next to the command arguments. Inbound frames are either
//! JSON text or a length-prefixed BSON document; both decode to a JSON
//! object, which is wrapped in an [`Envelope`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Field carrying the correlation id on both commands and replies.
pub const REQUEST_ID_FIELD: &str = "$requestId";

/// Field carrying the command name.
pub const COMMAND_FIELD: &str = "cmd";

/// Marker field of the unsolicited breakpoint-hit event.
pub const HIT_BREAKPOINT_FIELD: &str = "hit_breakpoint";

/// Serialize a command into the text frame sent to the remote.
///
/// `args` must be a JSON object (or `null` for no arguments). The
/// `cmd` and `$requestId` fields overwrite any argument of the same name.
pub fn encode_command(request_id: i64, command: &str, args: Value) -> Result<String, BridgeError> {
    let mut fields = match args {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(BridgeError::Serialization(format!(
                "command arguments must be an object, got {other}"
            )))
        }
    };
    fields.insert(COMMAND_FIELD.into(), Value::String(command.into()));
    fields.insert(REQUEST_ID_FIELD.into(), Value::from(request_id));

    serde_json::to_string(&Value::Object(fields))
        .map_err(|e| BridgeError::Serialization(e.to_string()))
}

/// Decode a text frame.
pub fn decode_text(text: &str) -> Result<Value, BridgeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| BridgeError::Decode(format!("invalid JSON: {e}")))?;
    require_object(value)
}

/// Decode a binary frame holding a single BSON document.
pub fn decode_binary(bytes: &[u8]) -> Result<Value, BridgeError> {
    let doc = bson::Document::from_reader(bytes)
        .map_err(|e| BridgeError::Decode(format!("invalid BSON: {e}")))?;
    Ok(bson::Bson::Document(doc).into_relaxed_extjson())
}

fn require_object(value: Value) -> Result<Value, BridgeError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(BridgeError::Decode(format!("expected an object, got {value}")))
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Correlation id, present on replies.
    pub request_id: Option<i64>,
    /// Command name echoed by the remote, if any.
    pub command: Option<String>,
    /// The whole decoded object.
    pub body: Value,
}

impl Envelope {
    /// Wrap a decoded object, lifting out the correlation fields.
    pub fn from_value(body: Value) -> Self {
        let request_id = body.get(REQUEST_ID_FIELD).and_then(Value::as_i64);
        let command = body
            .get(COMMAND_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            request_id,
            command,
            body,
        }
    }

    /// Look up a top-level field of the body.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Look up a top-level field that the caller cannot do without.
    pub fn require(&self, field: &str) -> Result<&Value, BridgeError> {
        self.get(field)
            .ok_or_else(|| BridgeError::InvalidResponse(format!("reply has no `{field}` field")))
    }
}

/// Unsolicited events pushed by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Script execution stopped on a breakpoint.
    BreakpointHit {
        /// Line reported by the remote, when it sent one.
        line: Option<i64>,
    },
}

impl BridgeEvent {
    /// Recognize a known event tag on an envelope.
    pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
        match envelope.get(HIT_BREAKPOINT_FIELD)? {
            Value::Object(fields) => Some(Self::BreakpointHit {
                line: fields.get("line").and_then(Value::as_i64),
            }),
            Value::Bool(true) => Some(Self::BreakpointHit { line: None }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_command_adds_correlation_fields() {
        let text = encode_command(
            7,
            "script::debug::add_breakpoint",
            json!({"file": "script.as", "line": 12}),
        )
        .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["cmd"], "script::debug::add_breakpoint");
        assert_eq!(value["$requestId"], 7);
        assert_eq!(value["file"], "script.as");
        assert_eq!(value["line"], 12);
    }

    #[test]
    fn encode_command_accepts_null_args() {
        let text = encode_command(1, "script::debug::resume", Value::Null).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn encode_command_rejects_non_object_args() {
        let err = encode_command(1, "step", json!([1, 2])).unwrap_err();
        assert!(matches!(err, BridgeError::Serialization(_)));
    }

    #[test]
    fn encode_command_overrides_colliding_fields() {
        let text = encode_command(3, "resume", json!({"cmd": "other", "$requestId": 99})).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["cmd"], "resume");
        assert_eq!(value["$requestId"], 3);
    }

    #[test]
    fn decode_text_parses_object() {
        let value = decode_text(r#"{"$requestId": 4, "ok": true}"#).unwrap();
        assert_eq!(value["$requestId"], 4);
    }

    #[test]
    fn decode_text_rejects_malformed_json() {
        let err = decode_text("{not json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "got: {err}");
    }

    #[test]
    fn decode_text_rejects_non_object() {
        let err = decode_text("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("expected an object"), "got: {err}");
    }

    #[test]
    fn decode_binary_reads_bson_document() {
        let doc = bson::doc! {
            "cmd": "script::debug::get_callstack",
            "$requestId": 5_i32,
            "callstack": [ { "function": "main", "line": 3_i32 } ],
        };
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();

        let value = decode_binary(&bytes).unwrap();
        assert_eq!(value["$requestId"], 5);
        assert_eq!(value["callstack"][0]["function"], "main");
        assert_eq!(value["callstack"][0]["line"], 3);
    }

    #[test]
    fn decode_binary_rejects_truncated_document() {
        let doc = bson::doc! { "a": "b" };
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 3);

        let err = decode_binary(&bytes).unwrap_err();
        assert!(matches!(err, BridgeError::Decode(_)));
    }

    #[test]
    fn envelope_lifts_correlation_fields() {
        let env = Envelope::from_value(json!({"cmd": "resume", "$requestId": 2}));
        assert_eq!(env.request_id, Some(2));
        assert_eq!(env.command.as_deref(), Some("resume"));
    }

    #[test]
    fn envelope_without_id_is_unsolicited() {
        let env = Envelope::from_value(json!({"log": "hello"}));
        assert_eq!(env.request_id, None);
        assert_eq!(env.command, None);
    }

    #[test]
    fn envelope_require_reports_missing_field() {
        let env = Envelope::from_value(json!({"$requestId": 1}));
        let err = env.require("localVars").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidResponse(_)));
    }

    #[test]
    fn event_breakpoint_hit_with_line() {
        let env = Envelope::from_value(json!({"hit_breakpoint": {"line": 42}}));
        assert_eq!(
            BridgeEvent::from_envelope(&env),
            Some(BridgeEvent::BreakpointHit { line: Some(42) })
        );
    }

    #[test]
    fn event_breakpoint_hit_flag() {
        let env = Envelope::from_value(json!({"hit_breakpoint": true}));
        assert_eq!(
            BridgeEvent::from_envelope(&env),
            Some(BridgeEvent::BreakpointHit { line: None })
        );
    }

    #[test]
    fn event_unknown_tag_is_none() {
        let env = Envelope::from_value(json!({"hit_breakpoint": false, "other": 1}));
        assert_eq!(BridgeEvent::from_envelope(&env), None);
    }
}
