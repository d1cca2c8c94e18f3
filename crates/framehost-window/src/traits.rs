use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::LayoutRect;

/// Stable identity of a window.
///
/// Two window handles refer to the same window exactly when their ids are
/// equal. Handles themselves are cheap views and may be recreated freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// A browsing context that can receive posted messages.
pub trait Window {
    /// Identity of this window.
    fn id(&self) -> WindowId;

    /// The parent window.
    ///
    /// A top-level window reports itself as its own parent. A detached
    /// window (one whose frame was removed from its document) reports `None`.
    fn parent(&self) -> Option<WindowRef>;

    /// The top-level window of this window's hierarchy.
    fn top(&self) -> WindowRef;

    /// Post a wire string to this window, restricted to `target_origin`.
    fn post_message(&self, data: &str, target_origin: &str);
}

/// Shared handle to a window.
///
/// `Rc` rather than `Arc`: all windows of a page live on one event loop.
pub type WindowRef = Rc<dyn Window>;

/// A frame element on the host page.
pub trait FrameElement {
    /// The window hosted by this frame, if its document is loaded.
    fn content_window(&self) -> Option<WindowRef>;

    /// Current bounding rectangle of the element, relative to the viewport.
    fn bounding_client_rect(&self) -> LayoutRect;
}

/// Shared handle to a frame element.
pub type FrameRef = Rc<dyn FrameElement>;

/// Returns true if both handles refer to the same window.
pub fn same_window(left: &dyn Window, right: &dyn Window) -> bool {
    left.id() == right.id()
}

impl fmt::Debug for dyn Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window").field("id", &self.id()).finish()
    }
}

impl fmt::Debug for dyn FrameElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameElement")
            .field("content_window", &self.content_window().map(|w| w.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_display() {
        assert_eq!(WindowId(7).to_string(), "window-7");
    }

    #[test]
    fn window_id_serializes_as_number() {
        let json = serde_json::to_string(&WindowId(3)).unwrap();
        assert_eq!(json, "3");
        let back: WindowId = serde_json::from_str("12").unwrap();
        assert_eq!(back, WindowId(12));
    }
}
