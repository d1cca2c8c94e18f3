//! Recognized message kinds.
//!
//! Requests flow from an embedded frame to the host; each request kind has
//! exactly one response kind flowing back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of message kinds understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    /// Frame asks for its position, and for updates whenever it changes.
    SendPositions,
    /// Host reports viewport and frame geometry.
    Position,
    /// Frame asks to be expanded over its container.
    FullOverlayFrame,
    /// Host reports the expanded geometry.
    FullOverlayFrameResponse,
    /// Frame asks to be collapsed back.
    CancelFullOverlayFrame,
    /// Host reports the collapsed geometry.
    CancelFullOverlayFrameResponse,
}

impl MessageType {
    /// Every kind, requests first.
    pub const ALL: [MessageType; 6] = [
        MessageType::SendPositions,
        MessageType::FullOverlayFrame,
        MessageType::CancelFullOverlayFrame,
        MessageType::Position,
        MessageType::FullOverlayFrameResponse,
        MessageType::CancelFullOverlayFrameResponse,
    ];

    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::SendPositions => "send-positions",
            MessageType::Position => "position",
            MessageType::FullOverlayFrame => "full-overlay-frame",
            MessageType::FullOverlayFrameResponse => "full-overlay-frame-response",
            MessageType::CancelFullOverlayFrame => "cancel-full-overlay-frame",
            MessageType::CancelFullOverlayFrameResponse => "cancel-full-overlay-frame-response",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns true for kinds sent by frames to the host.
    pub fn is_request(self) -> bool {
        self.response_type().is_some()
    }

    /// The kind the host answers a request with.
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            MessageType::SendPositions => Some(MessageType::Position),
            MessageType::FullOverlayFrame => Some(MessageType::FullOverlayFrameResponse),
            MessageType::CancelFullOverlayFrame => {
                Some(MessageType::CancelFullOverlayFrameResponse)
            }
            MessageType::Position
            | MessageType::FullOverlayFrameResponse
            | MessageType::CancelFullOverlayFrameResponse => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| format!("unknown message type '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_parse_back() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::from_wire(kind.as_str()), Some(kind));
            assert_eq!(kind.as_str().parse::<MessageType>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(MessageType::from_wire("send-embed-state"), None);
        assert_eq!(MessageType::from_wire(""), None);
        assert!("SEND-POSITIONS".parse::<MessageType>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&MessageType::CancelFullOverlayFrameResponse).unwrap();
        assert_eq!(json, "\"cancel-full-overlay-frame-response\"");
    }

    #[test]
    fn requests_pair_with_responses() {
        let requests: Vec<_> = MessageType::ALL
            .into_iter()
            .filter(|kind| kind.is_request())
            .collect();
        assert_eq!(
            requests,
            vec![
                MessageType::SendPositions,
                MessageType::FullOverlayFrame,
                MessageType::CancelFullOverlayFrame
            ]
        );
        assert_eq!(
            MessageType::SendPositions.response_type(),
            Some(MessageType::Position)
        );
        assert_eq!(MessageType::Position.response_type(), None);
    }
}
