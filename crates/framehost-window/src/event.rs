use std::fmt;

use crate::traits::WindowRef;

/// One message delivered by the shared transport.
#[derive(Clone)]
pub struct MessageEvent {
    /// Raw data as posted by the sender.
    pub data: String,
    /// Origin of the sending document.
    pub origin: String,
    /// Window that posted the message, when the transport knows it.
    pub source: Option<WindowRef>,
}

impl MessageEvent {
    /// Create an event posted by `source`.
    pub fn new(data: impl Into<String>, origin: impl Into<String>, source: WindowRef) -> Self {
        Self {
            data: data.into(),
            origin: origin.into(),
            source: Some(source),
        }
    }

    /// Create an event whose source window is unknown.
    pub fn without_source(data: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            origin: origin.into(),
            source: None,
        }
    }
}

impl fmt::Debug for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEvent")
            .field("data_len", &self.data.len())
            .field("origin", &self.origin)
            .field("source", &self.source.as_ref().map(|w| w.id()))
            .finish()
    }
}
