use std::fmt;

use framehost_codec::{serialize_message, MessageType};
use framehost_window::{WindowId, WindowRef};
use serde::Serialize;

use crate::error::Result;

/// Where responses to one request go: the window and origin that sent it,
/// under the sentinel it claimed.
///
/// Captured by asynchronous completions instead of any host-side
/// bookkeeping.
#[derive(Clone)]
pub struct ReplyTo {
    source: WindowRef,
    origin: String,
    sentinel: String,
}

impl ReplyTo {
    pub fn new(source: WindowRef, origin: impl Into<String>, sentinel: impl Into<String>) -> Self {
        Self {
            source,
            origin: origin.into(),
            sentinel: sentinel.into(),
        }
    }

    /// Encode and post one message to the requester.
    pub fn send<T: Serialize>(&self, kind: MessageType, data: &T) -> Result<()> {
        let wire = serialize_message(kind, &self.sentinel, data)?;
        tracing::trace!(
            sentinel = %self.sentinel,
            kind = %kind,
            window = %self.source.id(),
            origin = %self.origin,
            "sent message"
        );
        self.source.post_message(&wire, &self.origin);
        Ok(())
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn window_id(&self) -> WindowId {
        self.source.id()
    }
}

impl fmt::Debug for ReplyTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyTo")
            .field("window", &self.source.id())
            .field("origin", &self.origin)
            .field("sentinel", &self.sentinel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use framehost_codec::deserialize_message;
    use framehost_window::WindowTree;
    use serde_json::json;

    use super::*;

    #[test]
    fn send_posts_to_source_with_origin() {
        let tree = WindowTree::new();
        let child = tree.add_child(tree.root());
        let reply = ReplyTo::new(tree.window(child), "https://ads.example", "s-1");

        reply
            .send(MessageType::Position, &json!({ "x": 1 }))
            .unwrap();

        let posted = tree.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].window, child);
        assert_eq!(posted[0].origin, "https://ads.example");
        let envelope = deserialize_message(&posted[0].data).unwrap();
        assert_eq!(envelope.sentinel(), Some("s-1"));
        assert_eq!(envelope.message_type(), Some(MessageType::Position));
    }
}
