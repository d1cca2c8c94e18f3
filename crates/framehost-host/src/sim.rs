//! In-memory position and overlay services.
//!
//! Both are cheap handles over shared state: keep a clone to drive the
//! service (move frames, complete transitions) after handing one to the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use framehost_window::{FrameRef, LayoutRect, WindowId};

use crate::error::ServiceError;
use crate::services::{
    OverlayCallback, OverlayService, PositionData, PositionSender, PositionService,
};

struct Observer {
    frame: FrameRef,
    updates: PositionSender,
}

impl Observer {
    fn window_id(&self) -> Option<WindowId> {
        self.frame.content_window().map(|window| window.id())
    }
}

struct PositionState {
    viewport: LayoutRect,
    unavailable: Option<String>,
    observers: Vec<Observer>,
}

/// Position service with a caller-set viewport.
///
/// Geometry changes are announced explicitly with [`notify`](Self::notify)
/// or [`notify_all`](Self::notify_all).
#[derive(Clone)]
pub struct SimPositionService {
    state: Rc<RefCell<PositionState>>,
}

impl SimPositionService {
    pub fn new(viewport: LayoutRect) -> Self {
        Self {
            state: Rc::new(RefCell::new(PositionState {
                viewport,
                unavailable: None,
                observers: Vec::new(),
            })),
        }
    }

    pub fn set_viewport(&self, viewport: LayoutRect) {
        self.state.borrow_mut().viewport = viewport;
    }

    /// Make every viewport query fail with `reason` until [`set_available`](Self::set_available).
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        self.state.borrow_mut().unavailable = Some(reason.into());
    }

    pub fn set_available(&self) {
        self.state.borrow_mut().unavailable = None;
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Observers registered for the frame hosting `window`.
    pub fn observer_count_for(&self, window: WindowId) -> usize {
        self.state
            .borrow()
            .observers
            .iter()
            .filter(|observer| observer.window_id() == Some(window))
            .count()
    }

    /// Push fresh geometry to every observer of the frame hosting `window`.
    ///
    /// Returns the number of updates sent. Observers whose receiver is gone
    /// are dropped.
    pub fn notify(&self, window: WindowId) -> usize {
        self.push_updates(|observer| observer.window_id() == Some(window))
    }

    /// Push fresh geometry to every observer.
    pub fn notify_all(&self) -> usize {
        self.push_updates(|_| true)
    }

    /// Drop every sender, as a service shutting down would.
    pub fn drop_observers(&self) {
        self.state.borrow_mut().observers.clear();
    }

    fn push_updates(&self, selected: impl Fn(&Observer) -> bool) -> usize {
        let mut state = self.state.borrow_mut();
        let viewport = state.viewport;
        let mut sent = 0usize;
        state.observers.retain(|observer| {
            if !selected(observer) {
                return true;
            }
            let data = PositionData {
                viewport_rect: viewport,
                target_rect: observer.frame.bounding_client_rect(),
            };
            match observer.updates.send(data) {
                Ok(()) => {
                    sent += 1;
                    true
                }
                Err(_) => {
                    tracing::debug!("position subscriber gone, dropping observer");
                    false
                }
            }
        });
        sent
    }
}

impl PositionService for SimPositionService {
    fn viewport_rect(&self) -> Result<LayoutRect, ServiceError> {
        let state = self.state.borrow();
        match &state.unavailable {
            Some(reason) => Err(ServiceError::Unavailable(reason.clone())),
            None => Ok(state.viewport),
        }
    }

    fn observe(&mut self, frame: &FrameRef, updates: PositionSender) -> Result<(), ServiceError> {
        if frame.content_window().is_none() {
            return Err(ServiceError::DetachedFrame);
        }
        self.state.borrow_mut().observers.push(Observer {
            frame: Rc::clone(frame),
            updates,
        });
        Ok(())
    }
}

struct OverlayState {
    container: LayoutRect,
    auto_complete: bool,
    pending: VecDeque<(LayoutRect, OverlayCallback)>,
    expansions: usize,
    collapses: usize,
}

/// Overlay service that expands frames to a fixed container rect.
///
/// Collapsing reports the frame's own rect. Transitions complete at once,
/// or, for a [`deferred`](Self::deferred) service, when the caller says so.
#[derive(Clone)]
pub struct SimOverlayService {
    state: Rc<RefCell<OverlayState>>,
}

impl SimOverlayService {
    /// Service whose transitions complete inside the request.
    pub fn new(container: LayoutRect) -> Self {
        Self::build(container, true)
    }

    /// Service whose transitions wait for [`complete_next`](Self::complete_next).
    pub fn deferred(container: LayoutRect) -> Self {
        Self::build(container, false)
    }

    fn build(container: LayoutRect, auto_complete: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(OverlayState {
                container,
                auto_complete,
                pending: VecDeque::new(),
                expansions: 0,
                collapses: 0,
            })),
        }
    }

    pub fn set_container(&self, container: LayoutRect) {
        self.state.borrow_mut().container = container;
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn expansion_count(&self) -> usize {
        self.state.borrow().expansions
    }

    pub fn collapse_count(&self) -> usize {
        self.state.borrow().collapses
    }

    /// Finish the oldest pending transition. Returns false if none is pending.
    pub fn complete_next(&self) -> bool {
        // Release the borrow before the callback runs.
        let next = self.state.borrow_mut().pending.pop_front();
        match next {
            Some((rect, on_done)) => {
                on_done(rect);
                true
            }
            None => false,
        }
    }

    /// Finish every pending transition, oldest first.
    pub fn complete_all(&self) -> usize {
        let mut completed = 0usize;
        while self.complete_next() {
            completed += 1;
        }
        completed
    }

    fn schedule(&self, rect: LayoutRect, on_done: OverlayCallback) {
        let auto_complete = self.state.borrow().auto_complete;
        if auto_complete {
            on_done(rect);
        } else {
            self.state.borrow_mut().pending.push_back((rect, on_done));
        }
    }
}

impl OverlayService for SimOverlayService {
    fn expand_frame(
        &mut self,
        _frame: &FrameRef,
        on_done: OverlayCallback,
    ) -> Result<(), ServiceError> {
        let rect = {
            let mut state = self.state.borrow_mut();
            state.expansions += 1;
            state.container
        };
        self.schedule(rect, on_done);
        Ok(())
    }

    fn collapse_frame(
        &mut self,
        frame: &FrameRef,
        on_done: OverlayCallback,
    ) -> Result<(), ServiceError> {
        self.state.borrow_mut().collapses += 1;
        self.schedule(frame.bounding_client_rect(), on_done);
        Ok(())
    }
}
