//! Interfaces of the services handlers consult.
//!
//! Geometry updates flow through a channel per subscription: the position
//! service keeps the sender and pushes an update whenever the observed
//! frame moves; the host keeps the receiver and forwards what arrives.

use framehost_window::{FrameRef, LayoutRect};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ServiceError;

/// Payload of a `position` message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    /// Visible viewport of the host page.
    pub viewport_rect: LayoutRect,
    /// Frame's bounding rect.
    pub target_rect: LayoutRect,
}

/// Payload of the overlay response messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResult {
    pub success: bool,
    pub box_rect: LayoutRect,
}

/// Sending half of a position subscription.
pub type PositionSender = mpsc::UnboundedSender<PositionData>;

/// Receiving half of a position subscription.
pub type PositionReceiver = mpsc::UnboundedReceiver<PositionData>;

/// Create the channel backing one position subscription.
pub fn position_channel() -> (PositionSender, PositionReceiver) {
    mpsc::unbounded_channel()
}

/// Called once with the frame's resulting rect when an overlay transition ends.
pub type OverlayCallback = Box<dyn FnOnce(LayoutRect)>;

/// Tracks viewport and frame geometry.
pub trait PositionService {
    /// Current viewport rect of the host page.
    fn viewport_rect(&self) -> Result<LayoutRect, ServiceError>;

    /// Start observing `frame`; push to `updates` every time its geometry
    /// changes. The subscription lives until the sender is dropped.
    fn observe(&mut self, frame: &FrameRef, updates: PositionSender) -> Result<(), ServiceError>;
}

/// Expands frames over their container and back.
pub trait OverlayService {
    /// Expand `frame` to fill its container, then call `on_done`.
    fn expand_frame(&mut self, frame: &FrameRef, on_done: OverlayCallback)
        -> Result<(), ServiceError>;

    /// Restore `frame` to its original box, then call `on_done`.
    fn collapse_frame(
        &mut self,
        frame: &FrameRef,
        on_done: OverlayCallback,
    ) -> Result<(), ServiceError>;
}
