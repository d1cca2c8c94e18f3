//! Scenario files for `framehost replay`.
//!
//! A scenario describes a simulated host page: its window tree, the frames
//! the page trusts, the services' geometry, the messages queued before the
//! host loads, the live messages and scripted frame moves.
//!
//! ```json
//! {
//!   "windows": [{ "name": "ad", "parent": "top" }],
//!   "frames": [{ "window": "ad", "rect": { "top": 900, "width": 300, "height": 250 } }],
//!   "viewport": { "width": 1280, "height": 720 },
//!   "messages": [{ "from": "ad", "origin": "https://ads.example",
//!                  "message": { "type": "send-positions", "sentinel": "s1" } }],
//!   "updates": [{ "window": "ad", "rect": { "top": 400, "width": 300, "height": 250 } }]
//! }
//! ```
//!
//! `frames` and `pending` may hold a non-list value to exercise the host's
//! handling of malformed page input.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::rc::Rc;

use framehost_codec::MESSAGE_PREFIX;
use framehost_host::{PageContext, SimOverlayService, SimPositionService, Supplied};
use framehost_window::{FrameRef, LayoutRect, MessageEvent, SimFrame, WindowId, WindowTree};
use serde::Deserialize;
use serde_json::Value;

use crate::exit::{io_error, json_error, CliError, CliResult};

/// Name of the tree's top-level window.
pub const TOP: &str = "top";

const DEFAULT_ORIGIN: &str = "null";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub windows: Vec<WindowEntry>,
    /// Window the host runs in. Defaults to the top-level window.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub frames: Option<Value>,
    #[serde(default)]
    pub viewport: RectEntry,
    /// Rect frames expand to. Defaults to the viewport.
    #[serde(default)]
    pub overlay_container: Option<RectEntry>,
    /// Hold overlay completions until all messages are delivered.
    #[serde(default)]
    pub overlay_deferred: bool,
    #[serde(default)]
    pub pending: Option<Value>,
    #[serde(default)]
    pub messages: Vec<MessageEntry>,
    #[serde(default)]
    pub updates: Vec<UpdateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowEntry {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub detached: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameEntry {
    /// Window hosted by the frame; none for an empty frame.
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub rect: RectEntry,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectEntry {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl From<RectEntry> for LayoutRect {
    fn from(entry: RectEntry) -> Self {
        LayoutRect::ltwh(entry.left, entry.top, entry.width, entry.height)
    }
}

/// One inbound message. Either `data` (sent verbatim) or `message` (a JSON
/// object encoded with the protocol prefix).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageEntry {
    /// Sending window; none for a sourceless event.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEntry {
    pub window: String,
    pub rect: RectEntry,
}

impl Scenario {
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> CliResult<Self> {
        serde_json::from_str(text).map_err(|err| json_error("parse scenario", err))
    }

    /// Build the simulated page. The host is not installed yet.
    pub fn build(self) -> CliResult<SimPage> {
        let tree = WindowTree::new();
        let mut windows = WindowNames::new(tree.root());
        for entry in &self.windows {
            let parent = match &entry.parent {
                Some(name) => windows.lookup(name)?,
                None => tree.root(),
            };
            let id = tree.add_child(parent);
            windows.insert(&entry.name, id)?;
            if entry.detached {
                tree.detach(id);
            }
        }

        let host = match &self.host {
            Some(name) => windows.lookup(name)?,
            None => tree.root(),
        };

        let mut frames = HashMap::new();
        let trusted = match supplied_list::<FrameEntry>(self.frames, "frames")? {
            Supplied::List(entries) => {
                let mut list: Vec<FrameRef> = Vec::with_capacity(entries.len());
                for entry in entries {
                    let content = entry
                        .window
                        .as_deref()
                        .map(|name| windows.lookup(name))
                        .transpose()?;
                    let frame = tree.frame(content, entry.rect.into());
                    if let Some(id) = content {
                        frames.insert(id, Rc::clone(&frame));
                    }
                    list.push(frame);
                }
                Supplied::List(list)
            }
            Supplied::Missing => Supplied::Missing,
            Supplied::Malformed(found) => Supplied::Malformed(found),
        };

        let pending = match supplied_list::<MessageEntry>(self.pending, "pending")? {
            Supplied::List(entries) => Supplied::List(
                entries
                    .into_iter()
                    .map(|entry| event(&tree, &windows, entry))
                    .collect::<CliResult<Vec<_>>>()?,
            ),
            Supplied::Missing => Supplied::Missing,
            Supplied::Malformed(found) => Supplied::Malformed(found),
        };

        let live = self
            .messages
            .into_iter()
            .map(|entry| event(&tree, &windows, entry))
            .collect::<CliResult<Vec<_>>>()?;

        let mut updates = Vec::with_capacity(self.updates.len());
        for entry in self.updates {
            let id = windows.lookup(&entry.window)?;
            let frame = frames.get(&id).ok_or_else(|| {
                CliError::invalid(format!("update for {:?}: window has no frame", entry.window))
            })?;
            updates.push((Rc::clone(frame), id, LayoutRect::from(entry.rect)));
        }

        let viewport = LayoutRect::from(self.viewport);
        let container = self.overlay_container.map_or(viewport, LayoutRect::from);
        let overlay = if self.overlay_deferred {
            SimOverlayService::deferred(container)
        } else {
            SimOverlayService::new(container)
        };

        let page = PageContext::new(tree.window(host))
            .with_frames(trusted)
            .with_pending(pending);

        Ok(SimPage {
            tree,
            names: windows.by_id,
            page,
            position: SimPositionService::new(viewport),
            overlay,
            live,
            updates,
        })
    }
}

/// A page built from a scenario, ready for the host to be installed.
pub struct SimPage {
    pub tree: WindowTree,
    names: BTreeMap<WindowId, String>,
    pub page: PageContext,
    pub position: SimPositionService,
    pub overlay: SimOverlayService,
    /// Messages delivered after installation, in order.
    pub live: Vec<MessageEvent>,
    /// Scripted frame moves: frame, its window, new rect.
    pub updates: Vec<(Rc<SimFrame>, WindowId, LayoutRect)>,
}

impl SimPage {
    /// Scenario name of `id`.
    pub fn window_name(&self, id: WindowId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

struct WindowNames {
    by_name: HashMap<String, WindowId>,
    by_id: BTreeMap<WindowId, String>,
}

impl WindowNames {
    fn new(root: WindowId) -> Self {
        let mut names = Self {
            by_name: HashMap::new(),
            by_id: BTreeMap::new(),
        };
        names.by_name.insert(TOP.to_string(), root);
        names.by_id.insert(root, TOP.to_string());
        names
    }

    fn insert(&mut self, name: &str, id: WindowId) -> CliResult<()> {
        if self.by_name.contains_key(name) {
            return Err(CliError::invalid(format!("duplicate window name {name:?}")));
        }
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
        Ok(())
    }

    fn lookup(&self, name: &str) -> CliResult<WindowId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| CliError::invalid(format!("unknown window {name:?}")))
    }
}

fn event(tree: &WindowTree, windows: &WindowNames, entry: MessageEntry) -> CliResult<MessageEvent> {
    let data = match (entry.data, entry.message) {
        (Some(data), None) => data,
        (None, Some(message)) => format!("{MESSAGE_PREFIX}{message}"),
        _ => {
            return Err(CliError::invalid(
                "each message needs exactly one of \"data\" or \"message\"",
            ))
        }
    };
    match entry.from {
        Some(name) => Ok(MessageEvent::new(
            data,
            entry.origin,
            tree.window(windows.lookup(&name)?),
        )),
        None => Ok(MessageEvent::without_source(data, entry.origin)),
    }
}

/// Interpret an optional page-supplied value as a list of `T`.
///
/// Non-list values are kept as malformed for the host to deal with; list
/// entries that do not parse are an error in the scenario itself.
fn supplied_list<T>(value: Option<Value>, field: &str) -> CliResult<Supplied<T>>
where
    T: for<'de> Deserialize<'de>,
{
    match value {
        None => Ok(Supplied::Missing),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|err| json_error(field, err)))
            .collect::<CliResult<Vec<T>>>()
            .map(Supplied::List),
        Some(other) => Ok(Supplied::Malformed(json_kind(&other).to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
