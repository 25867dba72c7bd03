//! A deterministic, in-memory host.
//!
//! `MemoryDom` is a small arena document with just enough behavior for the element: node kinds,
//! attributes, inline styles, layout sizes, scroll offsets, private render roots, and queued
//! child-list records. `ManualScheduler` hands out frame/microtask handles that the caller fires
//! explicitly. Together they let the element run headless (tests, simulations, servers).

use std::collections::{BTreeMap, BTreeSet};

use crate::{Dom, ElementRegistry, FrameScheduler, MutationRecord, Orientation, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(String),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    size: Option<(f64, f64)>,
    scroll: (f64, f64),
    render_root: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            size: None,
            scroll: (0.0, 0.0),
            render_root: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

#[derive(Clone, Debug)]
struct ObserverState {
    targets: Vec<NodeId>,
    queue: Vec<MutationRecord<NodeId>>,
    active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    observers: Vec<ObserverState>,
    render_roots_refused: bool,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// Creates a detached element. Arena allocation never fails.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(tag.to_owned()))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_owned()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Comment(text.to_owned()))
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attributes.remove(name);
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].style.get(property).map(String::as_str)
    }

    /// Gives `node` a layout box (width, height).
    pub fn set_size(&mut self, node: NodeId, width: f64, height: f64) {
        self.nodes[node.0].size = Some((width, height));
    }

    /// Sets the scroll position directly, as a user scroll would.
    pub fn scroll_to(&mut self, node: NodeId, left: f64, top: f64) {
        self.nodes[node.0].scroll = (left.max(0.0), top.max(0.0));
    }

    /// Makes every later `render_root` request fail, like a host element that cannot carry a
    /// shadow root.
    pub fn refuse_render_roots(&mut self) {
        self.render_roots_refused = true;
    }

    /// Number of observers that have not been disconnected.
    pub fn active_observers(&self) -> usize {
        self.observers.iter().filter(|o| o.active).count()
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if added.is_empty() && removed.is_empty() {
            return;
        }
        for observer in &mut self.observers {
            if observer.active && observer.targets.contains(&target) {
                observer.queue.push(MutationRecord {
                    target,
                    added: added.clone(),
                    removed: removed.clone(),
                });
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Observer = ObserverId;

    fn is_element(&self, node: &NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element(_))
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn children(&self, parent: &NodeId) -> Vec<NodeId> {
        self.nodes[parent.0].children.clone()
    }

    fn detach(&mut self, node: &NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| c != node);
        self.record(parent, Vec::new(), vec![*node]);
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(*parent);
        self.nodes[parent.0].children.push(*child);
        self.record(*parent, vec![*child], Vec::new());
    }

    fn replace_children(&mut self, parent: &NodeId, children: &[NodeId]) {
        let old = core::mem::take(&mut self.nodes[parent.0].children);
        for c in &old {
            self.nodes[c.0].parent = None;
        }
        for c in children {
            self.detach(c);
            self.nodes[c.0].parent = Some(*parent);
            self.nodes[parent.0].children.push(*c);
        }
        self.record(*parent, children.to_vec(), old);
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        let style = &mut self.nodes[node.0].style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_owned(), value.to_owned());
        }
    }

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        Some(MemoryDom::create_element(self, tag))
    }

    fn render_root(&mut self, host: &NodeId) -> Option<NodeId> {
        if let Some(root) = self.nodes[host.0].render_root {
            return Some(root);
        }
        if self.render_roots_refused {
            return None;
        }
        let root = self.alloc(NodeKind::Element("#render-root".to_owned()));
        self.nodes[host.0].render_root = Some(root);
        Some(root)
    }

    fn observe_children(&mut self, targets: &[NodeId]) -> Option<ObserverId> {
        self.observers.push(ObserverState {
            targets: targets.to_vec(),
            queue: Vec::new(),
            active: true,
        });
        Some(ObserverId(self.observers.len() - 1))
    }

    fn take_records(&mut self, observer: &ObserverId) -> Vec<MutationRecord<NodeId>> {
        core::mem::take(&mut self.observers[observer.0].queue)
    }

    fn disconnect(&mut self, observer: ObserverId) {
        let state = &mut self.observers[observer.0];
        state.active = false;
        state.queue.clear();
    }

    fn measure(&self, node: &NodeId, axis: Orientation) -> Option<f64> {
        let (w, h) = self.nodes[node.0].size?;
        Some(match axis {
            Orientation::Vertical => h,
            Orientation::Horizontal => w,
        })
    }

    fn viewport(&self, node: &NodeId) -> Viewport {
        let data = &self.nodes[node.0];
        let (width, height) = data.size.unwrap_or_default();
        Viewport {
            width,
            height,
            scroll_left: data.scroll.0,
            scroll_top: data.scroll.1,
        }
    }

    fn set_scroll_offset(&mut self, node: &NodeId, axis: Orientation, offset: f64) {
        let scroll = &mut self.nodes[node.0].scroll;
        match axis {
            Orientation::Vertical => scroll.1 = offset.max(0.0),
            Orientation::Horizontal => scroll.0 = offset.max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// A scheduler whose callbacks fire only when the caller drains them.
#[derive(Clone, Debug)]
pub struct ManualScheduler {
    next: u64,
    frames: Vec<FrameHandle>,
    microtasks: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    frames_available: bool,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            next: 1,
            frames: Vec::new(),
            microtasks: Vec::new(),
            cancelled: Vec::new(),
            frames_available: true,
        }
    }

    /// A scheduler for a host without paint scheduling; only microtasks are available.
    pub fn without_animation_frames() -> Self {
        Self {
            frames_available: false,
            ..Self::new()
        }
    }

    pub fn pending_frames(&self) -> &[FrameHandle] {
        &self.frames
    }

    pub fn pending_microtasks(&self) -> &[FrameHandle] {
        &self.microtasks
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    /// Takes every queued callback: microtasks first, then frames, each in request order.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        let mut due = core::mem::take(&mut self.microtasks);
        due.append(&mut self.frames);
        due
    }

    fn issue(&mut self) -> FrameHandle {
        let h = FrameHandle(self.next);
        self.next += 1;
        h
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = FrameHandle;

    fn request_animation_frame(&mut self) -> Option<FrameHandle> {
        if !self.frames_available {
            return None;
        }
        let h = self.issue();
        self.frames.push(h);
        Some(h)
    }

    fn cancel_animation_frame(&mut self, handle: FrameHandle) {
        let before = self.frames.len();
        self.frames.retain(|h| *h != handle);
        if self.frames.len() != before {
            self.cancelled.push(handle);
        }
    }

    fn queue_microtask(&mut self) -> FrameHandle {
        let h = self.issue();
        self.microtasks.push(h);
        h
    }
}

/// A custom element registry backed by a set of names.
#[derive(Clone, Debug, Default)]
pub struct MemoryRegistry {
    names: BTreeSet<String>,
}

impl ElementRegistry for MemoryRegistry {
    fn is_defined(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn define(&mut self, name: &str) {
        self.names.insert(name.to_owned());
    }
}
