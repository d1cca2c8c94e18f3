//! Request handlers and the default dispatch table.

use framehost_codec::MessageType;

use crate::dispatch::{DispatchTable, Handler, RoutedRequest};
use crate::error::Result;
use crate::reply::ReplyTo;
use crate::services::{
    position_channel, OverlayCallback, OverlayResult, OverlayService, PositionData,
    PositionService,
};
use crate::subscriptions::SubscriptionRegistry;

/// State handlers operate on: the services they consult and the
/// position subscriptions made so far.
pub struct HandlerContext {
    pub position: Box<dyn PositionService>,
    pub overlay: Box<dyn OverlayService>,
    pub subscriptions: SubscriptionRegistry,
}

impl HandlerContext {
    pub fn new(position: Box<dyn PositionService>, overlay: Box<dyn OverlayService>) -> Self {
        Self {
            position,
            overlay,
            subscriptions: SubscriptionRegistry::new(),
        }
    }
}

/// Answers `send-positions` with the current geometry and subscribes the
/// sentinel to later changes, once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendPositionsHandler;

impl Handler<HandlerContext> for SendPositionsHandler {
    fn handle(&self, ctx: &mut HandlerContext, request: RoutedRequest) -> Result<bool> {
        let reply = request.reply_to();
        let data = PositionData {
            viewport_rect: ctx.position.viewport_rect()?,
            target_rect: request.frame.bounding_client_rect(),
        };
        reply.send(MessageType::Position, &data)?;

        if ctx.subscriptions.is_subscribed(&request.sentinel) {
            tracing::debug!(sentinel = %request.sentinel, "already observing position");
            return Ok(true);
        }

        let (updates, receiver) = position_channel();
        ctx.subscriptions.insert(reply, receiver);
        ctx.position.observe(&request.frame, updates)?;
        tracing::debug!(sentinel = %request.sentinel, "observing position");
        Ok(true)
    }
}

/// Expands the requesting frame over its container.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnterFullOverlayHandler;

impl Handler<HandlerContext> for EnterFullOverlayHandler {
    fn handle(&self, ctx: &mut HandlerContext, request: RoutedRequest) -> Result<bool> {
        let on_done = respond_on_completion(
            request.reply_to(),
            MessageType::FullOverlayFrameResponse,
        );
        ctx.overlay.expand_frame(&request.frame, on_done)?;
        Ok(true)
    }
}

/// Restores an expanded frame to its original box.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelFullOverlayHandler;

impl Handler<HandlerContext> for CancelFullOverlayHandler {
    fn handle(&self, ctx: &mut HandlerContext, request: RoutedRequest) -> Result<bool> {
        let on_done = respond_on_completion(
            request.reply_to(),
            MessageType::CancelFullOverlayFrameResponse,
        );
        ctx.overlay.collapse_frame(&request.frame, on_done)?;
        Ok(true)
    }
}

/// Completion that reports a successful overlay transition to the requester.
fn respond_on_completion(reply: ReplyTo, kind: MessageType) -> OverlayCallback {
    Box::new(move |box_rect| {
        let result = OverlayResult {
            success: true,
            box_rect,
        };
        if let Err(err) = reply.send(kind, &result) {
            tracing::warn!(sentinel = %reply.sentinel(), kind = %kind, error = %err, "failed to send overlay response");
        }
    })
}

/// Handler for `kind`, or `None` for kinds the host only ever sends.
pub fn handler_for(kind: MessageType) -> Option<Box<dyn Handler<HandlerContext>>> {
    match kind {
        MessageType::SendPositions => Some(Box::new(SendPositionsHandler)),
        MessageType::FullOverlayFrame => Some(Box::new(EnterFullOverlayHandler)),
        MessageType::CancelFullOverlayFrame => Some(Box::new(CancelFullOverlayHandler)),
        MessageType::Position
        | MessageType::FullOverlayFrameResponse
        | MessageType::CancelFullOverlayFrameResponse => None,
    }
}

/// Table with a handler for every request kind.
pub fn default_dispatch_table() -> DispatchTable<HandlerContext> {
    let mut table = DispatchTable::new();
    for kind in MessageType::ALL {
        if let Some(handler) = handler_for(kind) {
            table.listen_boxed(kind, handler);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use framehost_codec::{deserialize_message, Envelope};
    use framehost_window::{FrameRef, LayoutRect, WindowId, WindowTree};
    use serde_json::Map;

    use super::*;
    use crate::error::{HostError, ServiceError};
    use crate::sim::{SimOverlayService, SimPositionService};

    const ORIGIN: &str = "https://ads.example";

    struct Fixture {
        tree: WindowTree,
        child: WindowId,
        frame: FrameRef,
        position: SimPositionService,
        overlay: SimOverlayService,
        ctx: HandlerContext,
    }

    fn fixture(overlay: SimOverlayService) -> Fixture {
        let tree = WindowTree::new();
        let child = tree.add_child(tree.root());
        let frame: FrameRef = tree.frame(Some(child), LayoutRect::ltwh(10.0, 20.0, 300.0, 250.0));
        let position = SimPositionService::new(LayoutRect::ltwh(0.0, 0.0, 1024.0, 768.0));
        let ctx = HandlerContext::new(Box::new(position.clone()), Box::new(overlay.clone()));
        Fixture {
            tree,
            child,
            frame,
            position,
            overlay,
            ctx,
        }
    }

    fn request(fx: &Fixture, kind: MessageType, sentinel: &str) -> RoutedRequest {
        RoutedRequest {
            frame: fx.frame.clone(),
            sentinel: sentinel.to_string(),
            envelope: Envelope::new(kind, sentinel, Map::new()),
            source: fx.tree.window(fx.child),
            origin: ORIGIN.to_string(),
        }
    }

    #[test]
    fn send_positions_replies_and_subscribes_once() {
        let mut fx = fixture(SimOverlayService::new(LayoutRect::default()));

        for _ in 0..2 {
            let req = request(&fx, MessageType::SendPositions, "s");
            assert!(SendPositionsHandler.handle(&mut fx.ctx, req).unwrap());
        }

        let posted = fx.tree.posted_to(fx.child);
        assert_eq!(posted.len(), 2);
        let envelope = deserialize_message(&posted[0].data).unwrap();
        assert_eq!(envelope.message_type(), Some(MessageType::Position));
        assert_eq!(envelope.get("targetRect").unwrap()["left"], 10.0);
        assert_eq!(envelope.get("viewportRect").unwrap()["width"], 1024.0);
        assert_eq!(fx.ctx.subscriptions.len(), 1);
        assert_eq!(fx.position.observer_count(), 1);
    }

    #[test]
    fn unavailable_viewport_is_an_error() {
        let mut fx = fixture(SimOverlayService::new(LayoutRect::default()));
        fx.position.set_unavailable("layout not ready");

        let req = request(&fx, MessageType::SendPositions, "s");
        let err = SendPositionsHandler.handle(&mut fx.ctx, req).unwrap_err();
        assert!(matches!(
            err,
            HostError::Service(ServiceError::Unavailable(_))
        ));
        assert!(fx.tree.posted().is_empty());
        assert!(fx.ctx.subscriptions.is_empty());
    }

    #[test]
    fn enter_overlay_responds_with_container_rect() {
        let container = LayoutRect::ltwh(0.0, 0.0, 1024.0, 768.0);
        let mut fx = fixture(SimOverlayService::new(container));

        let req = request(&fx, MessageType::FullOverlayFrame, "s");
        assert!(EnterFullOverlayHandler.handle(&mut fx.ctx, req).unwrap());

        let posted = fx.tree.posted_to(fx.child);
        assert_eq!(posted.len(), 1);
        let envelope = deserialize_message(&posted[0].data).unwrap();
        assert_eq!(
            envelope.message_type(),
            Some(MessageType::FullOverlayFrameResponse)
        );
        assert_eq!(envelope.get("success"), Some(&serde_json::Value::Bool(true)));
        let rect: LayoutRect =
            serde_json::from_value(envelope.get("boxRect").unwrap().clone()).unwrap();
        assert_eq!(rect, container);
    }

    #[test]
    fn deferred_overlay_responds_only_on_completion() {
        let mut fx = fixture(SimOverlayService::deferred(LayoutRect::default()));

        let req = request(&fx, MessageType::CancelFullOverlayFrame, "s");
        assert!(CancelFullOverlayHandler.handle(&mut fx.ctx, req).unwrap());
        assert!(fx.tree.posted().is_empty());

        assert!(fx.overlay.complete_next());
        let posted = fx.tree.posted_to(fx.child);
        assert_eq!(posted.len(), 1);
        let envelope = deserialize_message(&posted[0].data).unwrap();
        assert_eq!(
            envelope.message_type(),
            Some(MessageType::CancelFullOverlayFrameResponse)
        );
        assert_eq!(envelope.get("boxRect").unwrap()["top"], 20.0);
    }

    #[test]
    fn default_table_covers_request_kinds_only() {
        let table = default_dispatch_table();
        assert_eq!(
            table.keys(),
            vec![
                MessageType::SendPositions,
                MessageType::FullOverlayFrame,
                MessageType::CancelFullOverlayFrame
            ]
        );
        for kind in MessageType::ALL {
            assert_eq!(handler_for(kind).is_some(), kind.is_request());
        }
    }
}
