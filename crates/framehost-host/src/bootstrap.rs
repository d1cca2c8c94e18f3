//! Per-page installation of the messaging host.
//!
//! Frames may load before the host does. Their messages wait in a
//! [`PendingQueue`] and are replayed, in arrival order, when the host is
//! installed. After that the queue is sealed and live events go straight to
//! the host.

use framehost_window::{FrameRef, MessageEvent, WindowRef};
use serde::Serialize;

use crate::config::HostConfig;
use crate::error::{HostError, Result};
use crate::host::MessagingHost;
use crate::resolver::Supplied;
use crate::services::{OverlayService, PositionService};

/// Messages that arrived before the host was installed.
#[derive(Debug, Default)]
pub struct PendingQueue {
    messages: Supplied<MessageEvent>,
    sealed: bool,
}

impl PendingQueue {
    /// Queue `event` for replay. Dropped once the host is installed.
    pub fn push(&mut self, event: MessageEvent) {
        if self.sealed {
            tracing::debug!(origin = %event.origin, "host installed, dropping queued message");
            return;
        }
        if let Supplied::Missing = self.messages {
            self.messages = Supplied::List(Vec::new());
        }
        match &mut self.messages {
            Supplied::List(messages) => messages.push(event),
            Supplied::Missing | Supplied::Malformed(_) => {
                tracing::debug!(origin = %event.origin, "pending queue is not a list, dropping message");
            }
        }
    }

    /// Replace the queue contents with whatever the page supplied.
    pub fn replace(&mut self, messages: Supplied<MessageEvent>) {
        self.messages = messages;
    }

    pub fn len(&self) -> usize {
        match &self.messages {
            Supplied::List(messages) => messages.len(),
            Supplied::Missing | Supplied::Malformed(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn seal(&mut self) -> Supplied<MessageEvent> {
        self.sealed = true;
        std::mem::take(&mut self.messages)
    }
}

/// Outcome of replaying the pending queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Messages taken from the queue.
    pub replayed: usize,
    /// Messages a handler serviced.
    pub accepted: usize,
    /// Messages whose handling failed.
    pub failed: usize,
}

/// One host page: its window, the frames it trusts, the pending queue and,
/// once installed, the messaging host.
pub struct PageContext {
    win: WindowRef,
    frames: Supplied<FrameRef>,
    pending: PendingQueue,
    host: Option<MessagingHost>,
}

impl PageContext {
    pub fn new(win: WindowRef) -> Self {
        Self {
            win,
            frames: Supplied::Missing,
            pending: PendingQueue::default(),
            host: None,
        }
    }

    /// Set the frames the host will trust.
    pub fn with_frames(mut self, frames: Supplied<FrameRef>) -> Self {
        self.frames = frames;
        self
    }

    /// Set the messages queued before installation.
    pub fn with_pending(mut self, messages: Supplied<MessageEvent>) -> Self {
        self.pending.replace(messages);
        self
    }

    /// Create the host and replay the pending queue through it.
    ///
    /// Each queued message is handled on its own: a failure is logged and
    /// the replay moves on. Fails with [`HostError::AlreadyInitialized`] if
    /// the page already has a host.
    pub fn install_host(
        &mut self,
        position: Box<dyn PositionService>,
        overlay: Box<dyn OverlayService>,
        config: HostConfig,
    ) -> Result<ReplayReport> {
        if self.host.is_some() {
            tracing::info!(window = %self.win.id(), "messaging host already initialized");
            return Err(HostError::AlreadyInitialized);
        }

        let frames = std::mem::take(&mut self.frames);
        let mut host =
            MessagingHost::with_config(self.win.clone(), frames, position, overlay, config);

        let mut report = ReplayReport::default();
        for event in self.pending.seal().into_list("pending messages") {
            report.replayed += 1;
            match process_isolated(&mut host, &event) {
                Some(true) => report.accepted += 1,
                Some(false) => {}
                None => report.failed += 1,
            }
        }
        tracing::debug!(
            replayed = report.replayed,
            accepted = report.accepted,
            failed = report.failed,
            "messaging host installed"
        );

        self.host = Some(host);
        Ok(report)
    }

    /// Deliver a live event.
    ///
    /// Before installation the event is queued and `false` is returned.
    /// Afterwards it is handled like a replayed one: a failure is logged and
    /// reported as `false`.
    pub fn deliver(&mut self, event: MessageEvent) -> bool {
        match self.host.as_mut() {
            Some(host) => process_isolated(host, &event).unwrap_or(false),
            None => {
                self.pending.push(event);
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.host.is_some()
    }

    pub fn host(&self) -> Option<&MessagingHost> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut MessagingHost> {
        self.host.as_mut()
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    /// Enqueue path for frames that load before the host.
    pub fn pending_mut(&mut self) -> &mut PendingQueue {
        &mut self.pending
    }

    pub fn window(&self) -> &WindowRef {
        &self.win
    }
}

/// Process one event, containing any failure. `None` means it failed.
fn process_isolated(host: &mut MessagingHost, event: &MessageEvent) -> Option<bool> {
    match host.process_message(event) {
        Ok(handled) => Some(handled),
        Err(err) => {
            tracing::error!(error = %err, origin = %event.origin, "failed to process message");
            None
        }
    }
}
