use std::collections::HashMap;
use std::rc::Rc;

use framehost_window::{same_window, FrameRef, Window, WindowRef};

/// A collection handed over by the page, which may not be a list at all.
#[derive(Debug, Clone)]
pub enum Supplied<T> {
    /// Nothing was provided.
    Missing,
    /// A well-formed list.
    List(Vec<T>),
    /// Something other than a list; carries a description of what was found.
    Malformed(String),
}

impl<T> Supplied<T> {
    /// Normalize into a list. `Missing` and `Malformed` both become empty;
    /// `Malformed` is logged under `name`.
    pub fn into_list(self, name: &str) -> Vec<T> {
        match self {
            Supplied::List(items) => items,
            Supplied::Missing => Vec::new(),
            Supplied::Malformed(found) => {
                tracing::info!(list = name, found = %found, "invalid page-supplied list, using empty");
                Vec::new()
            }
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Supplied::Malformed(_))
    }
}

impl<T> Default for Supplied<T> {
    fn default() -> Self {
        Supplied::Missing
    }
}

impl<T> From<Vec<T>> for Supplied<T> {
    fn from(items: Vec<T>) -> Self {
        Supplied::List(items)
    }
}

/// Frames the host is willing to serve. Fixed once built.
#[derive(Debug, Clone, Default)]
pub struct TrustedFrameSet {
    frames: Vec<FrameRef>,
}

impl TrustedFrameSet {
    /// Build from page input; a malformed input yields an empty set.
    pub fn from_supplied(frames: Supplied<FrameRef>) -> Self {
        Self {
            frames: frames.into_list("trusted frames"),
        }
    }

    /// The frame whose content window is `window`.
    pub fn find_by_content_window(&self, window: &dyn Window) -> Option<FrameRef> {
        self.frames
            .iter()
            .find(|frame| {
                frame
                    .content_window()
                    .is_some_and(|content| same_window(content.as_ref(), window))
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Maps a message's source window and sentinel to a trusted frame.
///
/// A sentinel, once bound to a frame, stays bound for the host's lifetime.
pub struct FrameResolver {
    win: WindowRef,
    frames: TrustedFrameSet,
    cache: HashMap<String, FrameRef>,
    max_depth: usize,
    walks: usize,
}

impl FrameResolver {
    pub fn new(win: WindowRef, frames: TrustedFrameSet, max_depth: usize) -> Self {
        Self {
            win,
            frames,
            cache: HashMap::new(),
            max_depth,
            walks: 0,
        }
    }

    /// Resolve `sentinel` claimed by `source` to a trusted frame.
    ///
    /// A cached sentinel is answered without touching the window tree.
    pub fn resolve(&mut self, source: &WindowRef, sentinel: &str) -> Option<FrameRef> {
        if let Some(frame) = self.cache.get(sentinel) {
            return Some(Rc::clone(frame));
        }

        let child = self.host_child_ancestor(source);
        let frame = self.frames.find_by_content_window(child.as_ref())?;
        tracing::debug!(sentinel, window = %child.id(), "bound sentinel to frame");
        self.cache.insert(sentinel.to_string(), Rc::clone(&frame));
        Some(frame)
    }

    /// Walk up from `source` to the window directly under the host window.
    ///
    /// Stops early at the host window itself, at the host's top-level window,
    /// at a detached or self-parented window, and after `max_depth` hops.
    fn host_child_ancestor(&mut self, source: &WindowRef) -> WindowRef {
        self.walks += 1;
        let host = self.win.id();
        let top = self.win.top().id();

        let mut current = Rc::clone(source);
        for _ in 0..self.max_depth {
            if current.id() == host || current.id() == top {
                break;
            }
            let Some(parent) = current.parent() else {
                break;
            };
            if parent.id() == host || parent.id() == current.id() {
                break;
            }
            current = parent;
        }
        current
    }

    /// Number of tree walks performed so far.
    pub fn walk_count(&self) -> usize {
        self.walks
    }

    /// Number of sentinels bound to a frame.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Number of trusted frames.
    pub fn trusted_count(&self) -> usize {
        self.frames.len()
    }
}
