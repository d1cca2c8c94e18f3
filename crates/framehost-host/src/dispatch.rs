use std::collections::HashMap;
use std::fmt;

use framehost_codec::{Envelope, MessageType};
use framehost_window::{FrameRef, WindowRef};

use crate::error::Result;
use crate::reply::ReplyTo;

/// A request that passed validation and is ready for its handler.
pub struct RoutedRequest {
    /// Trusted frame the request was resolved to.
    pub frame: FrameRef,
    /// Non-empty sentinel of the request.
    pub sentinel: String,
    /// Decoded request.
    pub envelope: Envelope,
    /// Window that posted the request.
    pub source: WindowRef,
    /// Origin of the posting document.
    pub origin: String,
}

impl RoutedRequest {
    /// Reply target for this request.
    pub fn reply_to(&self) -> ReplyTo {
        ReplyTo::new(self.source.clone(), self.origin.clone(), self.sentinel.clone())
    }
}

impl fmt::Debug for RoutedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedRequest")
            .field("sentinel", &self.sentinel)
            .field("kind", &self.envelope.kind)
            .field("source", &self.source.id())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Handles one message kind on behalf of a context `C`.
///
/// Returns `Ok(true)` when the request was serviced and `Ok(false)` when it
/// could not be. `Err` is reserved for failures of consulted services.
pub trait Handler<C> {
    fn handle(&self, ctx: &mut C, request: RoutedRequest) -> Result<bool>;
}

impl<C, F> Handler<C> for F
where
    F: Fn(&mut C, RoutedRequest) -> Result<bool>,
{
    fn handle(&self, ctx: &mut C, request: RoutedRequest) -> Result<bool> {
        self(ctx, request)
    }
}

/// Message-kind keyed table of handlers.
pub struct DispatchTable<C> {
    handlers: HashMap<MessageType, Box<dyn Handler<C>>>,
}

impl<C> DispatchTable<C> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `key`, replacing any previous handler.
    pub fn listen<H>(&mut self, key: MessageType, handler: H)
    where
        H: Handler<C> + 'static,
    {
        self.listen_boxed(key, Box::new(handler));
    }

    /// Register an already boxed handler for `key`.
    pub fn listen_boxed(&mut self, key: MessageType, handler: Box<dyn Handler<C>>) {
        if self.handlers.insert(key, handler).is_some() {
            tracing::debug!(kind = %key, "overriding message handler");
        }
    }

    /// Run the handler registered for `key`.
    ///
    /// Returns the handler's own result, or `Ok(false)` without invoking
    /// anything when no handler is registered.
    pub fn fire(&self, key: MessageType, ctx: &mut C, request: RoutedRequest) -> Result<bool> {
        match self.handlers.get(&key) {
            Some(handler) => handler.handle(ctx, request),
            None => Ok(false),
        }
    }

    /// Whether a handler is registered for `key`.
    pub fn is_registered(&self, key: MessageType) -> bool {
        self.handlers.contains_key(&key)
    }

    /// Registered kinds, in `MessageType::ALL` order.
    pub fn keys(&self) -> Vec<MessageType> {
        MessageType::ALL
            .into_iter()
            .filter(|key| self.handlers.contains_key(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C> Default for DispatchTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use framehost_window::{LayoutRect, WindowTree};
    use serde_json::Map;

    use super::*;

    #[derive(Default)]
    struct Calls {
        seen: Vec<&'static str>,
    }

    fn request(tree: &WindowTree) -> RoutedRequest {
        let child = tree.add_child(tree.root());
        RoutedRequest {
            frame: tree.frame(Some(child), LayoutRect::default()),
            sentinel: "s".to_string(),
            envelope: Envelope::new(MessageType::SendPositions, "s", Map::new()),
            source: tree.window(child),
            origin: "https://ads.example".to_string(),
        }
    }

    #[test]
    fn fire_invokes_registered_handler() {
        let tree = WindowTree::new();
        let mut table = DispatchTable::<Calls>::new();
        table.listen(
            MessageType::SendPositions,
            |ctx: &mut Calls, _req: RoutedRequest| -> Result<bool> {
                ctx.seen.push("first");
                Ok(true)
            },
        );

        let mut calls = Calls::default();
        let handled = table
            .fire(MessageType::SendPositions, &mut calls, request(&tree))
            .unwrap();
        assert!(handled);
        assert_eq!(calls.seen, vec!["first"]);
    }

    #[test]
    fn unregistered_key_returns_false_without_invoking() {
        let tree = WindowTree::new();
        let mut table = DispatchTable::<Calls>::new();
        table.listen(
            MessageType::SendPositions,
            |ctx: &mut Calls, _req: RoutedRequest| -> Result<bool> {
                ctx.seen.push("positions");
                Ok(true)
            },
        );

        let mut calls = Calls::default();
        let handled = table
            .fire(MessageType::FullOverlayFrame, &mut calls, request(&tree))
            .unwrap();
        assert!(!handled);
        assert!(calls.seen.is_empty());
    }

    #[test]
    fn re_registration_replaces_handler() {
        let tree = WindowTree::new();
        let mut table = DispatchTable::<Calls>::new();
        table.listen(
            MessageType::SendPositions,
            |ctx: &mut Calls, _req: RoutedRequest| -> Result<bool> {
                ctx.seen.push("first");
                Ok(true)
            },
        );
        table.listen(
            MessageType::SendPositions,
            |ctx: &mut Calls, _req: RoutedRequest| -> Result<bool> {
                ctx.seen.push("second");
                Ok(false)
            },
        );

        let mut calls = Calls::default();
        let handled = table
            .fire(MessageType::SendPositions, &mut calls, request(&tree))
            .unwrap();
        assert!(!handled);
        assert_eq!(calls.seen, vec!["second"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn keys_follow_message_type_order() {
        let mut table = DispatchTable::<Calls>::new();
        let noop = |_: &mut Calls, _: RoutedRequest| -> Result<bool> { Ok(true) };
        table.listen(MessageType::CancelFullOverlayFrame, noop);
        table.listen(MessageType::SendPositions, noop);

        assert_eq!(
            table.keys(),
            vec![
                MessageType::SendPositions,
                MessageType::CancelFullOverlayFrame
            ]
        );
        assert!(table.is_registered(MessageType::SendPositions));
        assert!(!table.is_registered(MessageType::Position));
    }
}
