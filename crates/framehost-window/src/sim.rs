//! In-memory window tree.
//!
//! Models a page's window hierarchy without a browser: windows are nodes
//! in an arena, handles are lightweight views onto it, and every posted
//! message is recorded in a single outbox in posting order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use crate::geometry::LayoutRect;
use crate::traits::{FrameElement, Window, WindowId, WindowRef};

/// A message recorded by [`WindowTree`] when a window is posted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedMessage {
    /// Window the message was posted to.
    pub window: WindowId,
    /// Target origin passed to `post_message`.
    pub origin: String,
    /// Wire data.
    pub data: String,
}

#[derive(Debug)]
struct Node {
    /// `None` for a top-level window.
    parent: Option<WindowId>,
    detached: bool,
}

#[derive(Debug, Default)]
struct TreeState {
    nodes: Vec<Node>,
    posted: Vec<PostedMessage>,
    parent_lookups: usize,
}

/// Arena of simulated windows sharing one outbox.
///
/// Cloning the tree clones the handle, not the windows.
#[derive(Debug, Clone)]
pub struct WindowTree {
    state: Rc<RefCell<TreeState>>,
}

impl WindowTree {
    /// Create a tree containing a single top-level window.
    pub fn new() -> Self {
        let state = TreeState {
            nodes: vec![Node {
                parent: None,
                detached: false,
            }],
            ..TreeState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// The top-level window created with the tree.
    pub fn root(&self) -> WindowId {
        WindowId(0)
    }

    /// Add a window nested under `parent` and return its id.
    pub fn add_child(&self, parent: WindowId) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = WindowId(state.nodes.len() as u64);
        state.nodes.push(Node {
            parent: Some(parent),
            detached: false,
        });
        id
    }

    /// Re-point a window's parent. Allows building malformed hierarchies.
    pub fn set_parent(&self, id: WindowId, parent: WindowId) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(id.0 as usize) {
            node.parent = Some(parent);
        }
    }

    /// Detach a window from its parent; its `parent()` becomes `None`.
    pub fn detach(&self, id: WindowId) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(id.0 as usize) {
            node.detached = true;
        }
    }

    /// Whether `id` names a window of this tree.
    pub fn contains(&self, id: WindowId) -> bool {
        (id.0 as usize) < self.state.borrow().nodes.len()
    }

    /// Number of windows in the tree.
    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    /// Always false: a tree starts with its top-level window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle to the window `id`.
    pub fn window(&self, id: WindowId) -> WindowRef {
        Rc::new(SimWindow {
            id,
            tree: self.clone(),
        })
    }

    /// Create a frame element hosting `content`, with an initial rect.
    pub fn frame(&self, content: Option<WindowId>, rect: LayoutRect) -> Rc<SimFrame> {
        Rc::new(SimFrame {
            tree: self.clone(),
            content,
            rect: Cell::new(rect),
        })
    }

    /// All posted messages, in posting order.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.state.borrow().posted.clone()
    }

    /// Drain the outbox.
    pub fn take_posted(&self) -> Vec<PostedMessage> {
        std::mem::take(&mut self.state.borrow_mut().posted)
    }

    /// Messages posted to one window, in posting order.
    pub fn posted_to(&self, id: WindowId) -> Vec<PostedMessage> {
        self.state
            .borrow()
            .posted
            .iter()
            .filter(|msg| msg.window == id)
            .cloned()
            .collect()
    }

    /// Number of `parent()` calls made on any window of this tree.
    pub fn parent_lookups(&self) -> usize {
        self.state.borrow().parent_lookups
    }

    fn parent_of(&self, id: WindowId) -> Option<WindowId> {
        let mut state = self.state.borrow_mut();
        state.parent_lookups += 1;
        let node = state.nodes.get(id.0 as usize)?;
        if node.detached {
            return None;
        }
        Some(node.parent.unwrap_or(id))
    }

    fn top_of(&self, id: WindowId) -> WindowId {
        let state = self.state.borrow();
        let mut current = id;
        // Bounded by the node count so a cyclic chain still terminates.
        for _ in 0..state.nodes.len() {
            match state.nodes.get(current.0 as usize) {
                Some(Node {
                    parent: Some(parent),
                    detached: false,
                }) => current = *parent,
                _ => break,
            }
        }
        current
    }

    fn record(&self, message: PostedMessage) {
        self.state.borrow_mut().posted.push(message);
    }
}

impl Default for WindowTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one window of a [`WindowTree`].
#[derive(Debug)]
pub struct SimWindow {
    id: WindowId,
    tree: WindowTree,
}

impl Window for SimWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn parent(&self) -> Option<WindowRef> {
        self.tree
            .parent_of(self.id)
            .map(|parent| self.tree.window(parent))
    }

    fn top(&self) -> WindowRef {
        self.tree.window(self.tree.top_of(self.id))
    }

    fn post_message(&self, data: &str, target_origin: &str) {
        tracing::trace!(window = %self.id, origin = target_origin, len = data.len(), "post");
        self.tree.record(PostedMessage {
            window: self.id,
            origin: target_origin.to_string(),
            data: data.to_string(),
        });
    }
}

/// Simulated frame element whose rect can be moved by the caller.
#[derive(Debug)]
pub struct SimFrame {
    tree: WindowTree,
    content: Option<WindowId>,
    rect: Cell<LayoutRect>,
}

impl SimFrame {
    /// Id of the hosted window, if any.
    pub fn content_id(&self) -> Option<WindowId> {
        self.content
    }

    /// Replace the element's bounding rect.
    pub fn set_rect(&self, rect: LayoutRect) {
        self.rect.set(rect);
    }
}

impl FrameElement for SimFrame {
    fn content_window(&self) -> Option<WindowRef> {
        self.content.map(|id| self.tree.window(id))
    }

    fn bounding_client_rect(&self) -> LayoutRect {
        self.rect.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_window_is_its_own_parent() {
        let tree = WindowTree::new();
        let root = tree.window(tree.root());
        let parent = root.parent().expect("top-level window has a parent");
        assert_eq!(parent.id(), root.id());
        assert_eq!(root.top().id(), root.id());
    }

    #[test]
    fn nested_windows_resolve_parent_and_top() {
        let tree = WindowTree::new();
        let child = tree.add_child(tree.root());
        let grandchild = tree.add_child(child);

        let handle = tree.window(grandchild);
        assert_eq!(handle.parent().unwrap().id(), child);
        assert_eq!(handle.top().id(), tree.root());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn detached_window_has_no_parent() {
        let tree = WindowTree::new();
        let child = tree.add_child(tree.root());
        tree.detach(child);
        assert!(tree.window(child).parent().is_none());
    }

    #[test]
    fn cyclic_chain_top_terminates() {
        let tree = WindowTree::new();
        let a = tree.add_child(tree.root());
        let b = tree.add_child(a);
        tree.set_parent(a, b);
        // Any answer is fine; it must come back.
        let _ = tree.window(a).top();
    }

    #[test]
    fn posts_are_recorded_in_order_per_window() {
        let tree = WindowTree::new();
        let a = tree.add_child(tree.root());
        let b = tree.add_child(tree.root());

        tree.window(a).post_message("one", "https://a.example");
        tree.window(b).post_message("two", "https://b.example");
        tree.window(a).post_message("three", "https://a.example");

        let to_a: Vec<_> = tree.posted_to(a).into_iter().map(|m| m.data).collect();
        assert_eq!(to_a, vec!["one", "three"]);
        assert_eq!(tree.posted().len(), 3);
        assert_eq!(tree.take_posted().len(), 3);
        assert!(tree.posted().is_empty());
    }

    #[test]
    fn parent_lookups_are_counted() {
        let tree = WindowTree::new();
        let child = tree.add_child(tree.root());
        let before = tree.parent_lookups();
        let _ = tree.window(child).parent();
        let _ = tree.window(child).parent();
        assert_eq!(tree.parent_lookups(), before + 2);
    }

    #[test]
    fn frame_reports_content_window_and_rect() {
        let tree = WindowTree::new();
        let child = tree.add_child(tree.root());
        let frame = tree.frame(Some(child), LayoutRect::ltwh(0.0, 0.0, 300.0, 250.0));

        assert_eq!(frame.content_window().unwrap().id(), child);
        frame.set_rect(LayoutRect::ltwh(0.0, 50.0, 300.0, 250.0));
        assert_eq!(frame.bounding_client_rect().top, 50.0);

        let empty = tree.frame(None, LayoutRect::default());
        assert!(empty.content_window().is_none());
    }
}
