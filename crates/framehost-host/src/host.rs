use framehost_codec::{deserialize_message, is_protocol_message};
use framehost_window::{FrameRef, MessageEvent, WindowRef};

use crate::config::HostConfig;
use crate::dispatch::{DispatchTable, RoutedRequest};
use crate::error::Result;
use crate::handlers::{default_dispatch_table, HandlerContext};
use crate::resolver::{FrameResolver, Supplied, TrustedFrameSet};
use crate::services::{OverlayService, PositionService};

/// Answers requests from trusted frames embedded in one host window.
///
/// Created once per page; owns the sentinel cache, the position
/// subscriptions and the dispatch table for its lifetime.
pub struct MessagingHost {
    win: WindowRef,
    config: HostConfig,
    resolver: FrameResolver,
    dispatch: DispatchTable<HandlerContext>,
    ctx: HandlerContext,
}

impl MessagingHost {
    /// Create a host for `win` serving `frames`, with default limits.
    pub fn new(
        win: WindowRef,
        frames: Supplied<FrameRef>,
        position: Box<dyn PositionService>,
        overlay: Box<dyn OverlayService>,
    ) -> Self {
        Self::with_config(win, frames, position, overlay, HostConfig::default())
    }

    /// Create a host with explicit limits.
    ///
    /// A malformed `frames` value is logged and treated as an empty set.
    pub fn with_config(
        win: WindowRef,
        frames: Supplied<FrameRef>,
        position: Box<dyn PositionService>,
        overlay: Box<dyn OverlayService>,
        config: HostConfig,
    ) -> Self {
        let frames = TrustedFrameSet::from_supplied(frames);
        tracing::debug!(window = %win.id(), trusted = frames.len(), "messaging host created");
        Self {
            resolver: FrameResolver::new(win.clone(), frames, config.max_ancestry_depth),
            win,
            config,
            dispatch: default_dispatch_table(),
            ctx: HandlerContext::new(position, overlay),
        }
    }

    /// Handle one inbound event.
    ///
    /// Returns `Ok(true)` if a handler serviced it. Foreign data, untrusted
    /// senders and kinds without a handler all give `Ok(false)` and nothing
    /// is posted back. `Err` means a service failed while handling.
    pub fn process_message(&mut self, event: &MessageEvent) -> Result<bool> {
        if event.data.len() > self.config.max_message_len || !is_protocol_message(&event.data) {
            tracing::debug!(len = event.data.len(), "ignored: not a protocol message");
            return Ok(false);
        }
        let envelope = match deserialize_message(&event.data) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(error = %err, "ignored: not a protocol message");
                return Ok(false);
            }
        };
        let Some(sentinel) = envelope.sentinel().map(str::to_owned) else {
            tracing::debug!(kind = %envelope.kind, "ignored: not a protocol message");
            return Ok(false);
        };

        let Some(source) = event.source.clone() else {
            tracing::info!(sentinel = %sentinel, origin = %event.origin, "ignored: untrusted source");
            return Ok(false);
        };
        let Some(frame) = self.resolver.resolve(&source, &sentinel) else {
            tracing::info!(
                sentinel = %sentinel,
                origin = %event.origin,
                window = %source.id(),
                "ignored: untrusted source"
            );
            return Ok(false);
        };

        let Some(kind) = envelope.message_type() else {
            tracing::warn!(sentinel = %sentinel, kind = %envelope.kind, "unprocessed message");
            return Ok(false);
        };
        let request = RoutedRequest {
            frame,
            sentinel,
            envelope,
            source,
            origin: event.origin.clone(),
        };
        let handled = self.dispatch.fire(kind, &mut self.ctx, request)?;
        if !handled {
            tracing::warn!(kind = %kind, "unprocessed message");
        }
        Ok(handled)
    }

    /// Post every pending geometry update to its subscriber.
    ///
    /// Returns the number of `position` messages sent.
    pub fn flush_position_updates(&mut self) -> Result<usize> {
        self.ctx.subscriptions.flush()
    }

    /// Number of sentinels subscribed to position updates.
    pub fn subscription_count(&self) -> usize {
        self.ctx.subscriptions.len()
    }

    pub fn is_subscribed(&self, sentinel: &str) -> bool {
        self.ctx.subscriptions.is_subscribed(sentinel)
    }

    pub fn resolver(&self) -> &FrameResolver {
        &self.resolver
    }

    /// The host window.
    pub fn window(&self) -> &WindowRef {
        &self.win
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}
