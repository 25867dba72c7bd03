use core::mem;

use virtualizer::{Align, VirtualItem};

use crate::adapter::{ChangeFlag, recompute_options};
use crate::reconcile::{Reconciled, capture, reconcile};
use crate::render::{ROLE_LIST, RenderParts, measure_rendered, render_window};
use crate::{
    Attribute, Config, Dom, Engine, EngineOptions, FrameScheduler, MeasureSlot, MutationRecord,
    Registry, VirtualizerEngine,
};

/// Where an element is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
    TornDown,
}

enum Lifecycle<E, O> {
    Uninitialized,
    Active { engine: E, observer: O },
    TornDown,
}

impl<E, O> Lifecycle<E, O> {
    fn state(&self) -> LifecycleState {
        match self {
            Self::Uninitialized => LifecycleState::Uninitialized,
            Self::Active { .. } => LifecycleState::Active,
            Self::TornDown => LifecycleState::TornDown,
        }
    }
}

type EngineFactory<E> = Box<dyn Fn(EngineOptions) -> E>;

/// A list element that renders only the items in the engine's current window.
///
/// The element is host-driven. The host forwards its lifecycle callbacks
/// ([`connect`](Self::connect), [`disconnect`](Self::disconnect),
/// [`attribute_changed`](Self::attribute_changed)), delivers child-list batches
/// ([`on_mutations`](Self::on_mutations)), fires scheduled frames ([`on_frame`](Self::on_frame)),
/// and reports viewport changes ([`on_scroll`](Self::on_scroll), [`on_resize`](Self::on_resize)).
///
/// Items are the host's element children. On activation they are moved out of the host into the
/// registry; each render pass moves the visible subset into the private render tree, so nodes
/// keep their identity, listeners and focus across passes.
pub struct VirtualList<D: Dom, S: FrameScheduler, E: Engine = VirtualizerEngine> {
    dom: D,
    scheduler: S,
    host: D::Node,
    config: Config,
    registry: Registry<D::Node>,
    parts: Option<RenderParts<D::Node>>,
    lifecycle: Lifecycle<E, D::Observer>,
    measure_slot: MeasureSlot<S::Handle>,
    changed: ChangeFlag,
    window: Vec<VirtualItem>,
    make_engine: EngineFactory<E>,
}

impl<D: Dom, S: FrameScheduler> VirtualList<D, S> {
    pub fn new(dom: D, scheduler: S, host: D::Node) -> Self {
        Self::with_engine(dom, scheduler, host, VirtualizerEngine::new)
    }
}

impl<D: Dom, S: FrameScheduler, E: Engine> VirtualList<D, S, E> {
    /// Creates an element whose engine instances are built by `make_engine`.
    ///
    /// The configuration is read from the host's current attributes.
    pub fn with_engine(
        dom: D,
        scheduler: S,
        host: D::Node,
        make_engine: impl Fn(EngineOptions) -> E + 'static,
    ) -> Self {
        let config = Config::from_attributes(|name| dom.attribute(&host, name));
        Self {
            dom,
            scheduler,
            host,
            config,
            registry: Registry::default(),
            parts: None,
            lifecycle: Lifecycle::Uninitialized,
            measure_slot: MeasureSlot::default(),
            changed: ChangeFlag::default(),
            window: Vec::new(),
            make_engine: Box::new(make_engine),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the document, for edits made on behalf of the page.
    ///
    /// Child-list edits made here are picked up by the next delivered or flushed batch.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn host(&self) -> &D::Node {
        &self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The logical items, in order.
    pub fn items(&self) -> &[D::Node] {
        self.registry.as_slice()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn parts(&self) -> Option<&RenderParts<D::Node>> {
        self.parts.as_ref()
    }

    pub fn engine(&self) -> Option<&E> {
        match &self.lifecycle {
            Lifecycle::Active { engine, .. } => Some(engine),
            _ => None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// The window of the last render pass.
    pub fn window(&self) -> &[VirtualItem] {
        &self.window
    }

    pub fn pending_measurement(&self) -> Option<S::Handle> {
        self.measure_slot.pending_handle()
    }

    /// Activates the element: builds the render tree (once), captures the host's children,
    /// subscribes to child-list changes and creates a fresh engine instance.
    ///
    /// Does nothing while already active, or when the host cannot provide a render tree or a
    /// child-list subscription (the element stays inactive and the host's children stay put).
    pub fn connect(&mut self) {
        if self.is_active() {
            return;
        }
        let parts = match &self.parts {
            Some(parts) => parts.clone(),
            None => {
                let Some(parts) = RenderParts::build(&mut self.dom, &self.host) else {
                    vdebug!("connect: no render tree");
                    return;
                };
                self.parts = Some(parts.clone());
                parts
            }
        };
        let Some(observer) = self
            .dom
            .observe_children(&[self.host.clone(), parts.items.clone()])
        else {
            vdebug!("connect: no child-list subscription");
            return;
        };
        if !self.dom.has_attribute(&self.host, "role") {
            self.dom.set_attribute(&self.host, "role", ROLE_LIST);
        }

        capture(&mut self.dom, &self.host, &mut self.registry);

        let options = recompute_options(&self.dom, &self.registry, &self.config, &self.changed);
        let mut engine = (self.make_engine)(options);
        engine.will_update(self.dom.viewport(&parts.viewport));
        engine.mount();
        self.lifecycle = Lifecycle::Active { engine, observer };
        vdebug!(count = self.registry.len(), "connect");

        self.render();
        self.discard_own_records();
    }

    /// Tears the element down: cancels the pending measurement, releases the child-list
    /// subscription and unmounts the engine.
    ///
    /// Calling it again, or before [`connect`](Self::connect), is a no-op.
    pub fn disconnect(&mut self) {
        self.flush_mutations();
        self.measure_slot.cancel(&mut self.scheduler);
        if !self.is_active() {
            return;
        }
        let Lifecycle::Active {
            mut engine,
            observer,
        } = mem::replace(&mut self.lifecycle, Lifecycle::TornDown)
        else {
            return;
        };
        self.dom.disconnect(observer);
        engine.unmount();
        vdebug!(count = self.registry.len(), "disconnect");
    }

    /// Reacts to a change of one of the host's attributes.
    ///
    /// Unknown attributes and unchanged values are ignored.
    pub fn attribute_changed(&mut self, name: &str, old: Option<&str>, new: Option<&str>) {
        if old == new {
            return;
        }
        let Ok(attr) = name.parse::<Attribute>() else {
            return;
        };
        self.flush_mutations();
        if !self.config.apply(attr, new) {
            return;
        }
        vdebug!(attribute = name, value = new, "attribute_changed");
        self.update();
        self.discard_own_records();
    }

    /// Applies a batch of child-list records delivered by the host.
    pub fn on_mutations(&mut self, records: &[MutationRecord<D::Node>]) {
        if !self.is_active() {
            return;
        }
        self.apply_mutations(records);
        self.discard_own_records();
    }

    /// Takes the records queued on the subscription and applies them as one batch.
    ///
    /// Every other entry point does this first, so page edits made synchronously before it are
    /// never mistaken for the element's own.
    pub fn flush_mutations(&mut self) {
        let Lifecycle::Active { observer, .. } = &self.lifecycle else {
            return;
        };
        let records = self.dom.take_records(observer);
        if records.is_empty() {
            return;
        }
        self.apply_mutations(&records);
        self.discard_own_records();
    }

    /// Runs a scheduled callback. Only the most recently scheduled one measures.
    pub fn on_frame(&mut self, handle: S::Handle) {
        if !self.measure_slot.fire(handle) {
            vtrace!(?handle, "on_frame: stale");
            return;
        }
        self.flush_mutations();
        let axis = self.config.orientation;
        let (Some(parts), Lifecycle::Active { engine, .. }) = (&self.parts, &mut self.lifecycle)
        else {
            return;
        };
        let (changed, adjust) = measure_rendered(&self.dom, parts, &self.registry, engine, axis);
        if adjust != 0 {
            let current = self.dom.viewport(&parts.viewport).scroll_offset(axis);
            self.dom
                .set_scroll_offset(&parts.viewport, axis, current + adjust as f64);
            engine.will_update(self.dom.viewport(&parts.viewport));
        }
        vtrace!(changed, adjust, "on_frame: measured");
        if changed {
            self.render();
        }
        self.discard_own_records();
    }

    /// The scroll element scrolled.
    pub fn on_scroll(&mut self) {
        self.flush_mutations();
        self.sync_viewport();
        self.discard_own_records();
    }

    /// The scroll element was resized.
    pub fn on_resize(&mut self) {
        self.on_scroll();
    }

    /// Scrolls so the item at `index` is placed according to `align`, honoring scroll padding.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) {
        self.flush_mutations();
        let Some(offset) = self
            .engine()
            .map(|engine| engine.scroll_to_index_offset(index, align))
        else {
            return;
        };
        self.write_scroll_offset(offset);
    }

    pub fn scroll_to_offset(&mut self, offset: u64) {
        self.flush_mutations();
        if !self.is_active() {
            return;
        }
        self.write_scroll_offset(offset);
    }

    fn write_scroll_offset(&mut self, offset: u64) {
        let Some(parts) = &self.parts else {
            return;
        };
        self.dom
            .set_scroll_offset(&parts.viewport, self.config.orientation, offset as f64);
        self.sync_viewport();
        self.discard_own_records();
    }

    fn sync_viewport(&mut self) {
        let (Some(parts), Lifecycle::Active { engine, .. }) = (&self.parts, &mut self.lifecycle)
        else {
            return;
        };
        engine.will_update(self.dom.viewport(&parts.viewport));
        if self.changed.take() {
            self.render();
        }
    }

    fn apply_mutations(&mut self, records: &[MutationRecord<D::Node>]) -> Reconciled {
        let outcome = reconcile(&mut self.dom, &self.host, &mut self.registry, records);
        if outcome.is_significant() {
            self.update();
        }
        outcome
    }

    /// Pushes fresh options into the live engine and re-renders.
    fn update(&mut self) {
        let options = recompute_options(&self.dom, &self.registry, &self.config, &self.changed);
        let (Some(parts), Lifecycle::Active { engine, .. }) = (&self.parts, &mut self.lifecycle)
        else {
            return;
        };
        engine.will_update(self.dom.viewport(&parts.viewport));
        engine.set_options(options);
        engine.measure();
        self.render();
    }

    fn render(&mut self) {
        let (Some(parts), Lifecycle::Active { engine, .. }) = (&self.parts, &self.lifecycle) else {
            return;
        };
        render_window(
            &mut self.dom,
            parts,
            &self.registry,
            engine,
            self.config.orientation,
            &mut self.window,
        );
        self.changed.take();
        self.measure_slot.schedule(&mut self.scheduler);
    }

    /// Drops records caused by the element's own moves.
    fn discard_own_records(&mut self) {
        if let Lifecycle::Active { observer, .. } = &self.lifecycle {
            let _ = self.dom.take_records(observer);
        }
    }
}

impl<D, S, E> core::fmt::Debug for VirtualList<D, S, E>
where
    D: Dom,
    S: FrameScheduler,
    E: Engine,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualList")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("len", &self.registry.len())
            .field("state", &self.state())
            .field("pending_measurement", &self.measure_slot.pending_handle())
            .finish_non_exhaustive()
    }
}
