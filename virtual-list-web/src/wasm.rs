use std::cell::{Cell, OnceCell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Promise, Reflect};
use virtual_list::{
    Dom, ElementRegistry, FrameScheduler, MutationRecord, OBSERVED_ATTRIBUTES, Orientation,
    Viewport, VirtualList,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, MutationObserver, MutationObserverInit, Node, NodeList,
    ResizeObserver, ShadowRootInit, ShadowRootMode, Window,
};

type List = VirtualList<WebDom, WebScheduler>;

/// Back-reference from browser callbacks to the element that owns them, bound once the element
/// is allocated.
#[derive(Clone, Default)]
struct Link(Rc<OnceCell<Weak<RefCell<List>>>>);

impl Link {
    fn bind(&self, list: &Rc<RefCell<List>>) {
        let _ = self.0.set(Rc::downgrade(list));
    }

    /// Runs `f` on the element. Callbacks arriving while the element is busy are dropped.
    fn with<R>(&self, f: impl FnOnce(&mut List) -> R) -> Option<R> {
        let list = self.0.get().and_then(Weak::upgrade)?;
        let mut list = list.try_borrow_mut().ok()?;
        Some(f(&mut list))
    }
}

fn node_list(list: &NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

fn convert_records(records: &Array) -> Vec<MutationRecord<Node>> {
    records
        .iter()
        .filter_map(|r| r.dyn_into::<web_sys::MutationRecord>().ok())
        .filter_map(|r| {
            Some(MutationRecord {
                target: r.target()?,
                added: node_list(&r.added_nodes()),
                removed: node_list(&r.removed_nodes()),
            })
        })
        .collect()
}

/// [`Dom`] over the live document.
pub struct WebDom {
    document: Document,
    link: Link,
}

/// A child-list subscription and the callback that keeps it alive.
pub struct WebObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl Dom for WebDom {
    type Node = Node;
    type Observer = WebObserver;

    fn is_element(&self, node: &Node) -> bool {
        node.node_type() == Node::ELEMENT_NODE
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.set_attribute(name, value);
        }
    }

    fn has_attribute(&self, node: &Node, name: &str) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|el| el.has_attribute(name))
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn children(&self, parent: &Node) -> Vec<Node> {
        node_list(&parent.child_nodes())
    }

    fn detach(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }

    fn append_child(&mut self, parent: &Node, child: &Node) {
        let _ = parent.append_child(child);
    }

    fn replace_children(&mut self, parent: &Node, children: &[Node]) {
        if let Some(el) = parent.dyn_ref::<Element>() {
            let nodes: Array = children.iter().collect();
            let _ = el.replace_children_with_node(&nodes);
            return;
        }
        while let Some(child) = parent.first_child() {
            let _ = parent.remove_child(&child);
        }
        for child in children {
            let _ = parent.append_child(child);
        }
    }

    fn set_style(&mut self, node: &Node, property: &str, value: &str) {
        let Some(el) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = el.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn create_element(&mut self, tag: &str) -> Option<Node> {
        self.document.create_element(tag).ok().map(Into::into)
    }

    fn render_root(&mut self, host: &Node) -> Option<Node> {
        let el = host.dyn_ref::<Element>()?;
        if let Some(root) = el.shadow_root() {
            return Some(root.into());
        }
        // A host that refuses a shadow root leaves the element inactive.
        el.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
            .ok()
            .map(Into::into)
    }

    fn observe_children(&mut self, targets: &[Node]) -> Option<WebObserver> {
        let link = self.link.clone();
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _: MutationObserver| {
                let records = convert_records(&records);
                link.with(|list| list.on_mutations(&records));
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).ok()?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        for target in targets {
            let _ = observer.observe_with_options(target, &init);
        }
        Some(WebObserver {
            observer,
            _callback: callback,
        })
    }

    fn take_records(&mut self, observer: &WebObserver) -> Vec<MutationRecord<Node>> {
        convert_records(&observer.observer.take_records())
    }

    fn disconnect(&mut self, observer: WebObserver) {
        observer.observer.disconnect();
    }

    fn measure(&self, node: &Node, axis: Orientation) -> Option<f64> {
        let rect = node.dyn_ref::<Element>()?.get_bounding_client_rect();
        // A zero box means the node is not laid out.
        if rect.width() == 0.0 && rect.height() == 0.0 {
            return None;
        }
        Some(match axis {
            Orientation::Vertical => rect.height(),
            Orientation::Horizontal => rect.width(),
        })
    }

    fn viewport(&self, node: &Node) -> Viewport {
        let Some(el) = node.dyn_ref::<Element>() else {
            return Viewport::default();
        };
        Viewport {
            width: f64::from(el.client_width()),
            height: f64::from(el.client_height()),
            scroll_left: f64::from(el.scroll_left()),
            scroll_top: f64::from(el.scroll_top()),
        }
    }

    fn set_scroll_offset(&mut self, node: &Node, axis: Orientation, offset: f64) {
        let Some(el) = node.dyn_ref::<Element>() else {
            return;
        };
        let (left, top) = match axis {
            Orientation::Vertical => (f64::from(el.scroll_left()), offset),
            Orientation::Horizontal => (offset, f64::from(el.scroll_top())),
        };
        el.scroll_to_with_x_and_y(left, top);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebHandle {
    Frame(i32),
    Microtask(u32),
}

/// [`FrameScheduler`] over `requestAnimationFrame`, with resolved-promise microtasks.
///
/// Both callbacks are allocated once and reused: the element keeps at most one frame
/// outstanding, and microtasks run in the order they were queued.
pub struct WebScheduler {
    window: Option<Window>,
    requested: Rc<Cell<Option<i32>>>,
    frame: Closure<dyn FnMut(f64)>,
    queued: Rc<RefCell<VecDeque<u32>>>,
    microtask: Closure<dyn FnMut(JsValue)>,
    next_microtask: u32,
}

impl WebScheduler {
    fn new(window: Option<Window>, link: Link) -> Self {
        let requested = Rc::new(Cell::new(None));
        let frame = {
            let requested = Rc::clone(&requested);
            let link = link.clone();
            Closure::<dyn FnMut(f64)>::new(move |_: f64| {
                if let Some(id) = requested.take() {
                    link.with(|list| list.on_frame(WebHandle::Frame(id)));
                }
            })
        };
        let queued = Rc::new(RefCell::new(VecDeque::new()));
        let microtask = {
            let queued = Rc::clone(&queued);
            Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
                let next = queued.borrow_mut().pop_front();
                if let Some(id) = next {
                    link.with(|list| list.on_frame(WebHandle::Microtask(id)));
                }
            })
        };
        Self {
            window,
            requested,
            frame,
            queued,
            microtask,
            next_microtask: 0,
        }
    }
}

impl FrameScheduler for WebScheduler {
    type Handle = WebHandle;

    fn request_animation_frame(&mut self) -> Option<WebHandle> {
        let id = self
            .window
            .as_ref()?
            .request_animation_frame(self.frame.as_ref().unchecked_ref())
            .ok()?;
        self.requested.set(Some(id));
        Some(WebHandle::Frame(id))
    }

    fn cancel_animation_frame(&mut self, handle: WebHandle) {
        let WebHandle::Frame(id) = handle else {
            return;
        };
        if let Some(window) = &self.window {
            let _ = window.cancel_animation_frame(id);
        }
        if self.requested.get() == Some(id) {
            self.requested.set(None);
        }
    }

    fn queue_microtask(&mut self) -> WebHandle {
        let id = self.next_microtask;
        self.next_microtask = self.next_microtask.wrapping_add(1);
        self.queued.borrow_mut().push_back(id);
        let _ = Promise::resolve(&JsValue::UNDEFINED).then(&self.microtask);
        WebHandle::Microtask(id)
    }
}

/// Scroll and resize subscriptions on the viewport part.
struct ViewportListeners {
    viewport: Element,
    on_scroll: Closure<dyn FnMut(Event)>,
    resize: ResizeObserver,
    _on_resize: Closure<dyn FnMut(Array)>,
}

impl ViewportListeners {
    fn attach(viewport: Element, link: &Link) -> Option<Self> {
        let scroll_link = link.clone();
        let on_scroll = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            scroll_link.with(List::on_scroll);
        });
        let resize_link = link.clone();
        let on_resize = Closure::<dyn FnMut(Array)>::new(move |_: Array| {
            resize_link.with(List::on_resize);
        });
        let resize = ResizeObserver::new(on_resize.as_ref().unchecked_ref()).ok()?;
        viewport
            .add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
            .ok()?;
        resize.observe(&viewport);
        Some(Self {
            viewport,
            on_scroll,
            resize,
            _on_resize: on_resize,
        })
    }

    fn detach(self) {
        let _ = self
            .viewport
            .remove_event_listener_with_callback("scroll", self.on_scroll.as_ref().unchecked_ref());
        self.resize.disconnect();
    }
}

/// One `<virtual-list>` instance, driven by the custom element class registered in [`define`].
#[wasm_bindgen]
pub struct VirtualListElement {
    list: Rc<RefCell<List>>,
    link: Link,
    listeners: Option<ViewportListeners>,
}

#[wasm_bindgen]
impl VirtualListElement {
    #[wasm_bindgen(constructor)]
    pub fn new(host: HtmlElement) -> Result<VirtualListElement, JsValue> {
        let window = web_sys::window();
        let document = host
            .owner_document()
            .or_else(|| window.as_ref().and_then(Window::document))
            .ok_or_else(|| JsValue::from_str("virtual-list: no document"))?;
        let link = Link::default();
        let dom = WebDom {
            document,
            link: link.clone(),
        };
        let scheduler = WebScheduler::new(window, link.clone());
        let list = Rc::new(RefCell::new(VirtualList::new(dom, scheduler, host.into())));
        link.bind(&list);
        Ok(Self {
            list,
            link,
            listeners: None,
        })
    }

    pub fn connect(&mut self) {
        let viewport = self.link.with(|list| {
            list.connect();
            list.parts()
                .and_then(|parts| parts.viewport.dyn_ref::<Element>().cloned())
        });
        if self.listeners.is_none() {
            self.listeners = viewport
                .flatten()
                .and_then(|viewport| ViewportListeners::attach(viewport, &self.link));
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            listeners.detach();
        }
        self.link.with(List::disconnect);
    }

    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&mut self, name: &str, old: Option<String>, new: Option<String>) {
        self.link
            .with(|list| list.attribute_changed(name, old.as_deref(), new.as_deref()));
    }

    #[wasm_bindgen(js_name = scrollToIndex)]
    pub fn scroll_to_index(&mut self, index: usize, align: Option<String>) {
        let align = crate::parse_align(align.as_deref());
        self.link.with(|list| list.scroll_to_index(index, align));
    }

    #[wasm_bindgen(js_name = scrollToOffset)]
    pub fn scroll_to_offset(&mut self, offset: f64) {
        let offset = if offset.is_finite() { offset.max(0.0) as u64 } else { 0 };
        self.link.with(|list| list.scroll_to_offset(offset));
    }

    /// Number of logical items.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.list.try_borrow().map(|list| list.len()).unwrap_or(0)
    }
}

#[wasm_bindgen(inline_js = r#"
export function register_element(registry, name, attributes, create) {
    class VirtualListHost extends HTMLElement {
        static get observedAttributes() {
            return attributes;
        }
        __list() {
            if (!this.__virtualList) {
                this.__virtualList = create(this);
            }
            return this.__virtualList;
        }
        connectedCallback() {
            this.__list()?.connect();
        }
        disconnectedCallback() {
            this.__list()?.disconnect();
        }
        attributeChangedCallback(attr, oldValue, newValue) {
            this.__list()?.attributeChanged(attr, oldValue, newValue);
        }
        scrollToIndex(index, align) {
            this.__list()?.scrollToIndex(index, align);
        }
        scrollToOffset(offset) {
            this.__list()?.scrollToOffset(offset);
        }
        get length() {
            return this.__list()?.length ?? 0;
        }
    }
    registry.define(name, VirtualListHost);
}
"#)]
extern "C" {
    fn register_element(registry: &JsValue, name: &str, attributes: &Array, create: &JsValue);
}

/// The page's `customElements` registry.
struct WebRegistry {
    registry: JsValue,
}

impl ElementRegistry for WebRegistry {
    fn is_defined(&self, name: &str) -> bool {
        Reflect::get(&self.registry, &JsValue::from_str("get"))
            .ok()
            .and_then(|get| get.dyn_into::<Function>().ok())
            .and_then(|get| get.call1(&self.registry, &JsValue::from_str(name)).ok())
            .is_some_and(|ctor| !ctor.is_undefined())
    }

    fn define(&mut self, name: &str) {
        let attributes: Array = OBSERVED_ATTRIBUTES
            .iter()
            .map(|attr| JsValue::from_str(attr))
            .collect();
        let create = Closure::<dyn FnMut(HtmlElement) -> JsValue>::new(|host: HtmlElement| {
            VirtualListElement::new(host)
                .map(JsValue::from)
                .unwrap_or(JsValue::UNDEFINED)
        })
        .into_js_value();
        register_element(&self.registry, name, &attributes, &create);
    }
}

/// Registers `<virtual-list>`. Returns `false` when there is no `customElements` registry or the
/// name is already taken.
#[wasm_bindgen]
pub fn define() -> bool {
    let mut registry = Reflect::get(&js_sys::global(), &JsValue::from_str("customElements"))
        .ok()
        .filter(JsValue::is_object)
        .map(|registry| WebRegistry { registry });
    virtual_list::define(registry.as_mut())
}
