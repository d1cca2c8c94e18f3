//! Window hierarchy and frame element abstraction.
//!
//! Provides a unified interface over the pieces of a host page the
//! messaging host needs to reason about:
//! - Windows, identified by [`WindowId`], with a parent chain and a top
//! - Frame elements on the host page and the window each one hosts
//! - Layout rectangles for viewport and frame geometry
//!
//! This is the lowest layer of framehost. Everything else builds on top of
//! the [`Window`] and [`FrameElement`] traits provided here. The [`sim`]
//! module holds an in-memory window tree used by the CLI replay command
//! and by tests.

pub mod event;
pub mod geometry;
pub mod sim;
pub mod traits;

pub use event::MessageEvent;
pub use geometry::LayoutRect;
pub use sim::{PostedMessage, SimFrame, SimWindow, WindowTree};
pub use traits::{same_window, FrameElement, FrameRef, Window, WindowId, WindowRef};
