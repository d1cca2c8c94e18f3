use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodecError, Result};
use crate::message_type::MessageType;

/// Tag every protocol message starts with.
pub const MESSAGE_PREFIX: &str = "amp-";

/// A decoded protocol message.
///
/// Payload keys live next to `type` and `sentinel` in the same JSON object
/// on the wire; they are collected into `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message kind as sent. May name a kind this host does not know.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Session token of the requesting frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<String>,
    /// Remaining top-level keys.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Envelope {
    /// Create an envelope of a known kind.
    pub fn new(kind: MessageType, sentinel: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            sentinel: Some(sentinel.into()),
            data,
        }
    }

    /// The kind, if it is one of the recognized kinds.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_wire(&self.kind)
    }

    /// The sentinel, treating an empty string as absent.
    pub fn sentinel(&self) -> Option<&str> {
        self.sentinel.as_deref().filter(|s| !s.is_empty())
    }

    /// A payload value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Returns true if `data` looks like a protocol message.
pub fn is_protocol_message(data: &str) -> bool {
    data.starts_with(MESSAGE_PREFIX) && data.contains('{')
}

/// Encode a message of `kind` for `sentinel`.
///
/// `data` must serialize to a JSON object (or `null` for no payload). Its
/// `type` and `sentinel` keys, if any, are overridden.
pub fn serialize_message<T: Serialize>(kind: MessageType, sentinel: &str, data: &T) -> Result<String> {
    let mut map = match serde_json::to_value(data)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(CodecError::PayloadNotObject),
    };
    map.remove("type");
    map.remove("sentinel");

    let envelope = Envelope::new(kind, sentinel, map);
    let body = serde_json::to_string(&envelope)?;
    Ok(format!("{MESSAGE_PREFIX}{body}"))
}

/// Decode wire data into an envelope.
///
/// The JSON body starts at the first `{` after the tag.
pub fn deserialize_message(data: &str) -> Result<Envelope> {
    if !data.starts_with(MESSAGE_PREFIX) {
        return Err(CodecError::MissingPrefix);
    }
    let start = data.find('{').ok_or(CodecError::MissingBody)?;
    serde_json::from_str(&data[start..]).map_err(|err| {
        tracing::debug!(error = %err, len = data.len(), "failed to parse message body");
        CodecError::Json(err)
    })
}
