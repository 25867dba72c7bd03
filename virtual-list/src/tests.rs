use crate::memory::{ManualScheduler, MemoryDom, MemoryRegistry, NodeId, NodeKind};
use crate::render::render_window;
use crate::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type List<E = VirtualizerEngine> = VirtualList<MemoryDom, ManualScheduler, E>;

fn host_with_items(n: usize) -> (MemoryDom, NodeId, Vec<NodeId>) {
    let mut dom = MemoryDom::new();
    let host = dom.create_element(TAG_NAME);
    let mut items = Vec::with_capacity(n);
    for _ in 0..n {
        let item = dom.create_element("div");
        dom.append_child(&host, &item);
        items.push(item);
    }
    (dom, host, items)
}

fn set_attrs(dom: &mut MemoryDom, host: NodeId, attrs: &[(&str, &str)]) {
    for (name, value) in attrs {
        dom.set_attribute(&host, name, value);
    }
}

/// Connects `list` and gives its viewport a layout box.
fn activate<E: Engine>(list: &mut List<E>, width: f64, height: f64) {
    list.connect();
    let viewport = list.parts().unwrap().viewport;
    list.dom_mut().set_size(viewport, width, height);
    list.on_resize();
}

fn connected(n: usize, attrs: &[(&str, &str)]) -> (List, Vec<NodeId>) {
    let (mut dom, host, items) = host_with_items(n);
    set_attrs(&mut dom, host, attrs);
    let mut list = VirtualList::new(dom, ManualScheduler::new(), host);
    activate(&mut list, 300.0, 480.0);
    (list, items)
}

fn run_frames<E: Engine>(list: &mut List<E>) {
    for handle in list.scheduler_mut().take_due() {
        list.on_frame(handle);
    }
}

fn rendered<E: Engine>(list: &List<E>) -> Vec<NodeId> {
    list.dom().children(&list.parts().unwrap().items)
}

fn attr<E: Engine>(list: &List<E>, node: NodeId, name: &str) -> Option<String> {
    list.dom().attribute(&node, name)
}

fn sizer_style<E: Engine>(list: &List<E>, property: &str) -> Option<String> {
    let sizer = list.parts().unwrap().sizer;
    list.dom().style(sizer, property).map(str::to_owned)
}

fn items_style<E: Engine>(list: &List<E>, property: &str) -> Option<String> {
    let items = list.parts().unwrap().items;
    list.dom().style(items, property).map(str::to_owned)
}

#[derive(Clone, Debug, Default)]
struct Counters {
    created: Arc<AtomicUsize>,
    set_options: Arc<AtomicUsize>,
    mounted: Arc<AtomicUsize>,
    unmounted: Arc<AtomicUsize>,
}

impl Counters {
    fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

struct CountingEngine {
    inner: VirtualizerEngine,
    counters: Counters,
}

impl Engine for CountingEngine {
    fn set_options(&mut self, options: EngineOptions) {
        self.counters.set_options.fetch_add(1, Ordering::SeqCst);
        self.inner.set_options(options);
    }

    fn will_update(&mut self, viewport: Viewport) {
        self.inner.will_update(viewport);
    }

    fn mount(&mut self) {
        self.counters.mounted.fetch_add(1, Ordering::SeqCst);
        self.inner.mount();
    }

    fn unmount(&mut self) {
        self.counters.unmounted.fetch_add(1, Ordering::SeqCst);
        self.inner.unmount();
    }

    fn measure(&mut self) {
        self.inner.measure();
    }

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn total_size(&self) -> u64 {
        self.inner.total_size()
    }

    fn scroll_offset(&self) -> u64 {
        self.inner.scroll_offset()
    }

    fn item_size(&self, index: usize) -> Option<u32> {
        self.inner.item_size(index)
    }

    fn virtual_items(&self, out: &mut Vec<VirtualItem>) {
        self.inner.virtual_items(out);
    }

    fn measure_element(&mut self, index: usize, size: u32) -> i64 {
        self.inner.measure_element(index, size)
    }

    fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        self.inner.scroll_to_index_offset(index, align)
    }
}

fn counting(n: usize) -> (List<CountingEngine>, Vec<NodeId>, Counters) {
    let (dom, host, items) = host_with_items(n);
    let counters = Counters::default();
    let factory_counters = counters.clone();
    let mut list = VirtualList::with_engine(dom, ManualScheduler::new(), host, move |options| {
        factory_counters.created.fetch_add(1, Ordering::SeqCst);
        CountingEngine {
            inner: VirtualizerEngine::new(options),
            counters: factory_counters.clone(),
        }
    });
    activate(&mut list, 300.0, 480.0);
    (list, items, counters)
}

#[test]
fn capture_moves_elements_and_discards_other_nodes() {
    let mut dom = MemoryDom::new();
    let host = dom.create_element(TAG_NAME);
    let a = dom.create_element("div");
    let text = dom.create_text("hello");
    let comment = dom.create_comment("note");
    let b = dom.create_element("div");
    dom.set_attribute(&b, "role", "option");
    for node in [a, text, comment, b] {
        dom.append_child(&host, &node);
    }

    let mut list = VirtualList::new(dom, ManualScheduler::new(), host);
    list.connect();

    assert_eq!(list.items(), &[a, b]);
    assert!(list.dom().children(&host).is_empty());
    assert_eq!(list.dom().parent(&text), None);
    assert_eq!(list.dom().parent(&comment), None);
    assert_eq!(list.dom().kind(text), &NodeKind::Text("hello".into()));
    assert_eq!(list.dom().kind(comment), &NodeKind::Comment("note".into()));
    assert_eq!(attr(&list, a, "role").as_deref(), Some(ROLE_LISTITEM));
    assert_eq!(attr(&list, b, "role").as_deref(), Some("option"));
    assert_eq!(attr(&list, host, "role").as_deref(), Some(ROLE_LIST));
    assert_eq!(list.state(), LifecycleState::Active);
}

#[test]
fn accessibility_attributes_cover_the_whole_list() {
    let (list, items) = connected(100, &[]);

    let shown = rendered(&list);
    // 480px viewport / 48px rows = 10 visible, plus 2 overscan after (none before index 0).
    assert_eq!(shown.len(), 12);
    assert_eq!(shown, items[..12].to_vec());
    for node in &shown {
        let index: usize = attr(&list, *node, INDEX_ATTRIBUTE).unwrap().parse().unwrap();
        assert_eq!(attr(&list, *node, "aria-setsize").as_deref(), Some("100"));
        assert_eq!(
            attr(&list, *node, "aria-posinset"),
            Some((index + 1).to_string())
        );
        assert_eq!(items[index], *node);
    }
    assert_eq!(list.engine().unwrap().count(), 100);
}

#[test]
fn appended_items_are_reconciled_once_per_batch() {
    let (mut list, _items, counters) = counting(4);
    assert_eq!(Counters::get(&counters.set_options), 0);

    let host = *list.host();
    let added: Vec<NodeId> = (0..3)
        .map(|_| {
            let dom = list.dom_mut();
            let node = dom.create_element("div");
            dom.append_child(&host, &node);
            node
        })
        .collect();
    list.flush_mutations();

    assert_eq!(Counters::get(&counters.set_options), 1);
    assert_eq!(list.engine().unwrap().count(), 7);
    assert_eq!(&list.items()[4..], added.as_slice());
    assert!(list.dom().children(&host).is_empty());
    for node in &added {
        assert_eq!(attr(&list, *node, "role").as_deref(), Some(ROLE_LISTITEM));
    }
    for node in rendered(&list) {
        assert_eq!(attr(&list, node, "aria-setsize").as_deref(), Some("7"));
    }

    // Nothing else is pending: a second flush is a no-op.
    list.flush_mutations();
    assert_eq!(Counters::get(&counters.set_options), 1);
}

#[test]
fn delivered_batches_are_applied_like_flushed_ones() {
    let (mut list, _items) = connected(2, &[]);
    let host = *list.host();
    let node = list.dom_mut().create_element("div");
    list.dom_mut().append_child(&host, &node);

    list.on_mutations(&[MutationRecord::added(host, [node])]);

    assert_eq!(list.len(), 3);
    assert!(list.dom().children(&host).is_empty());
    assert_eq!(list.engine().unwrap().count(), 3);
}

#[test]
fn non_element_additions_are_rejected() {
    let (mut list, _items, counters) = counting(3);
    let host = *list.host();
    let text = list.dom_mut().create_text("stray");
    list.dom_mut().append_child(&host, &text);
    list.flush_mutations();

    assert_eq!(list.dom().parent(&text), None);
    assert!(list.dom().children(&host).is_empty());
    assert_eq!(list.len(), 3);
    assert_eq!(Counters::get(&counters.set_options), 0);
}

#[test]
fn removing_a_visible_item_updates_the_set() {
    let (mut list, items) = connected(5, &[]);
    assert_eq!(rendered(&list), items);

    list.dom_mut().detach(&items[2]);
    list.flush_mutations();

    assert_eq!(list.engine().unwrap().count(), 4);
    let shown = rendered(&list);
    assert_eq!(shown, vec![items[0], items[1], items[3], items[4]]);
    assert_eq!(attr(&list, items[3], "aria-posinset").as_deref(), Some("3"));
    for node in shown {
        assert_eq!(attr(&list, node, "aria-setsize").as_deref(), Some("4"));
    }
}

#[test]
fn add_then_remove_in_one_batch_nets_out() {
    let (mut list, _items) = connected(3, &[]);
    let host = *list.host();
    let node = list.dom_mut().create_element("div");
    list.dom_mut().append_child(&host, &node);
    list.dom_mut().detach(&node);
    list.flush_mutations();

    assert_eq!(list.len(), 3);
    assert!(!list.items().contains(&node));
    assert_eq!(list.engine().unwrap().count(), 3);
}

#[test]
fn moving_an_item_is_a_remove_then_add() {
    let (mut list, items) = connected(5, &[]);
    let host = *list.host();
    list.dom_mut().append_child(&host, &items[0]);
    list.flush_mutations();

    assert_eq!(list.items(), &[items[1], items[2], items[3], items[4], items[0]]);
    assert_eq!(attr(&list, items[0], "aria-posinset").as_deref(), Some("5"));
    assert!(list.dom().children(&host).is_empty());
}

#[test]
fn moving_an_offscreen_item_appends_it() {
    let (mut list, items, counters) = counting(100);
    assert!(!rendered(&list).contains(&items[50]));

    let host = *list.host();
    list.dom_mut().append_child(&host, &items[50]);
    list.flush_mutations();

    assert_eq!(list.items().iter().position(|n| *n == items[50]), Some(99));
    assert_eq!(list.items()[50], items[51]);
    assert_eq!(list.len(), 100);
    assert_eq!(list.engine().unwrap().count(), 100);
    assert_eq!(Counters::get(&counters.set_options), 1);
    assert!(list.dom().children(&host).is_empty());

    list.scroll_to_index(99, Align::End);
    assert_eq!(attr(&list, items[50], "aria-posinset").as_deref(), Some("100"));
}

#[test]
fn unchanged_attribute_values_do_not_recompute() {
    let (mut list, _items, counters) = counting(10);

    list.attribute_changed("overscan", Some("3"), Some("3"));
    assert_eq!(Counters::get(&counters.set_options), 0);

    // Same effective value as the default.
    list.attribute_changed("overscan", None, Some("2"));
    assert_eq!(Counters::get(&counters.set_options), 0);

    list.attribute_changed("data-whatever", None, Some("1"));
    assert_eq!(Counters::get(&counters.set_options), 0);

    list.attribute_changed("overscan", Some("2"), Some("4"));
    assert_eq!(Counters::get(&counters.set_options), 1);
    assert_eq!(list.config().overscan, 4);
}

#[test]
fn orientation_switch_changes_extent_and_translation_axis() {
    let (mut list, _items) = connected(10, &[("padding-start", "10")]);
    assert_eq!(sizer_style(&list, "height").as_deref(), Some("490px"));
    assert_eq!(sizer_style(&list, "width").as_deref(), Some("100%"));
    assert_eq!(
        items_style(&list, "transform").as_deref(),
        Some("translate(0px, 10px)")
    );

    let horizontal = Orientation::Horizontal.to_string();
    assert_eq!(horizontal, "horizontal");
    list.attribute_changed("orientation", None, Some(&horizontal));

    assert_eq!(list.config().orientation, Orientation::Horizontal);
    assert_eq!(sizer_style(&list, "width").as_deref(), Some("490px"));
    assert_eq!(sizer_style(&list, "height").as_deref(), Some("100%"));
    assert_eq!(
        items_style(&list, "transform").as_deref(),
        Some("translate(10px, 0px)")
    );
    assert_eq!(items_style(&list, "flex-direction").as_deref(), Some("row"));
}

#[test]
fn padding_adds_to_total_extent() {
    let (list, items) = connected(
        2,
        &[
            ("estimate-size", "24"),
            ("padding-start", "24"),
            ("padding-end", "24"),
        ],
    );
    assert_eq!(list.engine().unwrap().total_size(), 96);
    assert_eq!(sizer_style(&list, "height").as_deref(), Some("96px"));
    assert_eq!(
        items_style(&list, "transform").as_deref(),
        Some("translate(0px, 24px)")
    );
    assert_eq!(rendered(&list), items);
}

#[test]
fn negative_overscan_clamps_to_zero() {
    let mut config = Config::default();
    assert!(config.apply(Attribute::Overscan, Some("7")));
    assert!(config.apply(Attribute::Overscan, Some("-5")));
    assert_eq!(config.overscan, 0);

    let (mut list, _items) = connected(100, &[("overscan", "7")]);
    list.attribute_changed("overscan", Some("7"), Some("-5"));
    assert_eq!(list.config().overscan, 0);
    assert_eq!(rendered(&list).len(), 10);
}

#[test]
fn malformed_configuration_falls_back_to_defaults() {
    let mut config = Config::default();
    config.apply(Attribute::EstimateSize, Some("abc"));
    assert_eq!(config.estimate_size, DEFAULT_ESTIMATE_SIZE);
    config.apply(Attribute::EstimateSize, Some("0"));
    assert_eq!(config.estimate_size, DEFAULT_ESTIMATE_SIZE);
    config.apply(Attribute::EstimateSize, Some(" 30.5 "));
    assert_eq!(config.estimate_size, 30.5);
    config.apply(Attribute::Overscan, Some("NaN"));
    assert_eq!(config.overscan, DEFAULT_OVERSCAN);
    config.apply(Attribute::Overscan, Some("3.9"));
    assert_eq!(config.overscan, 3);
    config.apply(Attribute::PaddingStart, Some("-3"));
    assert_eq!(config.padding_start, 0.0);
    config.apply(Attribute::ScrollPaddingEnd, Some("inf"));
    assert_eq!(config.scroll_padding_end, 0.0);
    config.apply(Attribute::Orientation, Some("HORIZONTAL"));
    assert_eq!(config.orientation, Orientation::Horizontal);
    config.apply(Attribute::Orientation, Some("diagonal"));
    assert_eq!(config.orientation, Orientation::Vertical);
    config.apply(Attribute::Overscan, None);
    assert_eq!(config.overscan, DEFAULT_OVERSCAN);

    assert_eq!("scroll-padding-start".parse::<Attribute>(), Ok(Attribute::ScrollPaddingStart));
    assert_eq!("padding".parse::<Attribute>(), Err(UnknownAttribute));
    let names: Vec<&str> = Attribute::ALL.iter().map(|a| a.name()).collect();
    assert_eq!(names, OBSERVED_ATTRIBUTES);
}

#[test]
fn teardown_is_idempotent() {
    let (mut list, _items, counters) = counting(20);
    let pending = list.pending_measurement().unwrap();
    assert_eq!(Counters::get(&counters.mounted), 1);

    list.disconnect();
    assert!(list.scheduler().cancelled().contains(&pending));
    assert_eq!(list.pending_measurement(), None);
    assert_eq!(Counters::get(&counters.unmounted), 1);
    assert_eq!(list.state(), LifecycleState::TornDown);
    assert_eq!(list.dom().active_observers(), 0);
    assert!(list.engine().is_none());

    list.disconnect();
    assert_eq!(Counters::get(&counters.unmounted), 1);
    assert_eq!(list.state(), LifecycleState::TornDown);
}

#[test]
fn reconnect_creates_a_fresh_engine() {
    let (mut list, items, counters) = counting(3);
    list.disconnect();

    let host = *list.host();
    let late = list.dom_mut().create_element("div");
    list.dom_mut().append_child(&host, &late);

    list.connect();
    assert_eq!(Counters::get(&counters.created), 2);
    assert_eq!(Counters::get(&counters.mounted), 2);
    assert_eq!(list.items(), &[items[0], items[1], items[2], late]);
    assert_eq!(rendered(&list).len(), 4);
}

#[test]
fn operations_before_activation_are_no_ops() {
    let (dom, host, _items) = host_with_items(3);
    let mut list = VirtualList::new(dom, ManualScheduler::new(), host);

    list.attribute_changed("overscan", None, Some("5"));
    list.on_scroll();
    list.flush_mutations();
    list.scroll_to_index(2, Align::Start);
    list.disconnect();

    assert_eq!(list.config().overscan, 5);
    assert_eq!(list.state(), LifecycleState::Uninitialized);
    assert!(list.parts().is_none());
    assert_eq!(list.pending_measurement(), None);
    assert!(list.scheduler().pending_frames().is_empty());
}

#[test]
fn missing_render_tree_leaves_the_element_inactive() {
    let (mut dom, host, items) = host_with_items(3);
    dom.refuse_render_roots();
    let mut list = VirtualList::new(dom, ManualScheduler::new(), host);

    list.connect();
    assert_eq!(list.state(), LifecycleState::Uninitialized);
    assert!(list.parts().is_none());
    assert!(list.items().is_empty());
    assert!(list.engine().is_none());
    assert_eq!(list.dom().children(&host), items);
    assert_eq!(attr(&list, host, "role"), None);
    assert_eq!(list.dom().active_observers(), 0);

    list.on_scroll();
    list.scroll_to_offset(100);
    list.disconnect();
    assert_eq!(list.state(), LifecycleState::Uninitialized);
    assert_eq!(list.pending_measurement(), None);
    assert!(list.scheduler().pending_frames().is_empty());
}

#[test]
fn render_passes_coalesce_into_one_measurement() {
    let (mut list, _items) = connected(50, &[]);
    let first = list.pending_measurement().unwrap();

    list.attribute_changed("overscan", Some("2"), Some("3"));
    list.attribute_changed("overscan", Some("3"), Some("4"));

    let latest = list.pending_measurement().unwrap();
    assert_ne!(first, latest);
    assert_eq!(list.scheduler().pending_frames(), &[latest]);
    assert!(list.scheduler().cancelled().contains(&first));

    // A stale handle never consumes the slot.
    list.on_frame(first);
    assert_eq!(list.pending_measurement(), Some(latest));
}

#[test]
fn microtasks_replace_missing_frames() {
    let (dom, host, items) = host_with_items(4);
    let mut list = VirtualList::new(dom, ManualScheduler::without_animation_frames(), host);
    activate(&mut list, 300.0, 480.0);
    for item in &items {
        list.dom_mut().set_size(*item, 300.0, 20.0);
    }

    assert!(list.scheduler().pending_frames().is_empty());
    let queued = list.scheduler().pending_microtasks().to_vec();
    assert_eq!(queued.len(), 2);
    assert_eq!(list.pending_measurement(), Some(queued[1]));

    // The replaced microtask still fires but does nothing.
    list.on_frame(queued[0]);
    assert_eq!(list.engine().unwrap().total_size(), 4 * 48);

    list.on_frame(queued[1]);
    assert_eq!(list.engine().unwrap().total_size(), 4 * 20);
}

#[test]
fn measurement_refines_sizes_and_settles() {
    let (mut list, items) = connected(5, &[]);
    for item in &items {
        list.dom_mut().set_size(*item, 300.0, 30.0);
    }

    run_frames(&mut list);
    assert_eq!(list.engine().unwrap().total_size(), 150);
    assert_eq!(sizer_style(&list, "height").as_deref(), Some("150px"));
    assert!(list.pending_measurement().is_some());

    run_frames(&mut list);
    assert_eq!(list.pending_measurement(), None);
}

#[test]
fn measuring_above_the_viewport_adjusts_scroll() {
    let (mut list, items) = connected(100, &[]);
    let viewport = list.parts().unwrap().viewport;
    list.dom_mut().scroll_to(viewport, 0.0, 960.0);
    list.on_scroll();
    run_frames(&mut list);

    // Item 18 is rendered as overscan above the viewport.
    assert_eq!(rendered(&list)[0], items[18]);
    list.dom_mut().set_size(items[18], 300.0, 100.0);
    list.attribute_changed("overscan", Some("2"), Some("3"));
    run_frames(&mut list);

    assert_eq!(list.dom().viewport(&viewport).scroll_top, 1012.0);
    assert_eq!(list.engine().unwrap().scroll_offset(), 1012);
}

#[test]
fn scrolling_moves_the_window() {
    let (mut list, items) = connected(100, &[]);
    let viewport = list.parts().unwrap().viewport;
    list.dom_mut().scroll_to(viewport, 0.0, 960.0);
    list.on_scroll();

    let shown = rendered(&list);
    assert_eq!(shown.len(), 14);
    assert_eq!(shown[0], items[18]);
    assert_eq!(attr(&list, items[18], "aria-posinset").as_deref(), Some("19"));
    assert_eq!(
        items_style(&list, "transform").as_deref(),
        Some("translate(0px, 864px)")
    );
    // Items that left the window are detached, not destroyed.
    assert_eq!(list.dom().parent(&items[0]), None);
    assert_eq!(list.items()[0], items[0]);
}

#[test]
fn scroll_to_index_honors_scroll_padding() {
    let (mut list, items) = connected(100, &[("scroll-padding-start", "10")]);
    list.scroll_to_index(50, Align::Start);

    let viewport = list.parts().unwrap().viewport;
    assert_eq!(list.dom().viewport(&viewport).scroll_top, 2390.0);
    assert!(rendered(&list).contains(&items[50]));
    assert_eq!(attr(&list, items[50], "aria-posinset").as_deref(), Some("51"));

    list.scroll_to_offset(0);
    assert_eq!(rendered(&list)[0], items[0]);
}

#[test]
fn item_overrides_feed_keys_and_estimates() {
    let (mut dom, host, items) = host_with_items(3);
    dom.set_attribute(&items[0], ITEM_ID_ATTRIBUTE, "first");
    dom.set_attribute(&items[1], ITEM_SIZE_ATTRIBUTE, "100");
    dom.set_attribute(&items[2], ITEM_SIZE_ATTRIBUTE, "-1");

    assert_eq!(item_key(&dom, &items[0], 0), ItemKey::Id(Arc::from("first")));
    assert_eq!(item_key(&dom, &items[1], 1), ItemKey::Index(1));
    assert_eq!(item_size(&dom, &items[1]), Some(100));
    assert_eq!(item_size(&dom, &items[2]), None);

    dom.set_attribute(&items[2], ITEM_ID_ATTRIBUTE, "third");
    assert_eq!(item_key(&dom, &items[2], 2), ItemKey::Id(Arc::from("third")));
    dom.remove_attribute(items[2], ITEM_ID_ATTRIBUTE);
    assert_eq!(item_key(&dom, &items[2], 2), ItemKey::Index(2));

    let mut list = VirtualList::new(dom, ManualScheduler::new(), host);
    activate(&mut list, 300.0, 480.0);
    assert_eq!(list.engine().unwrap().total_size(), 48 + 100 + 48);
}

#[test]
fn stale_window_indices_are_skipped() {
    let mut dom = MemoryDom::new();
    let host = dom.create_element(TAG_NAME);
    let parts = RenderParts::build(&mut dom, &host).unwrap();
    let mut registry = Registry::default();
    for _ in 0..3 {
        let node = dom.create_element("div");
        registry.push(node);
    }

    let mut engine = VirtualizerEngine::new(EngineOptions::new(5, 10));
    engine.will_update(Viewport {
        width: 100.0,
        height: 100.0,
        ..Viewport::default()
    });
    let mut window = Vec::new();
    let count = render_window(
        &mut dom,
        &parts,
        &registry,
        &engine,
        Orientation::Vertical,
        &mut window,
    );

    assert_eq!(window.len(), 5);
    assert_eq!(count, 3);
    assert_eq!(dom.children(&parts.items), registry.as_slice());
    for node in registry.iter() {
        assert_eq!(dom.attribute(node, "aria-setsize").as_deref(), Some("3"));
    }
}

#[test]
fn measure_slot_keeps_one_pending_callback() {
    let mut scheduler = ManualScheduler::new();
    let mut slot = MeasureSlot::default();

    let a = slot.schedule(&mut scheduler);
    let b = slot.schedule(&mut scheduler);
    assert_eq!(scheduler.pending_frames(), &[b]);
    assert_eq!(scheduler.cancelled(), &[a]);

    assert!(!slot.fire(a));
    assert!(slot.fire(b));
    assert!(!slot.is_pending());
    assert!(!slot.fire(b));

    slot.schedule(&mut scheduler);
    slot.cancel(&mut scheduler);
    assert!(!slot.is_pending());
    assert_eq!(scheduler.cancelled().len(), 2);
}

#[test]
fn registry_tracks_identity() {
    let mut registry = Registry::default();
    assert!(registry.push(1u32));
    assert!(registry.push(2));
    assert!(!registry.push(1));
    assert!(registry.push(3));
    assert_eq!(registry.remove(&2), Some(1));
    assert_eq!(registry.remove(&2), None);
    assert_eq!(registry.as_slice(), &[1, 3]);
    assert_eq!(registry.position(&3), Some(1));
}

#[test]
fn define_is_a_no_op_without_registry() {
    let mut registry = MemoryRegistry::default();
    assert!(define(Some(&mut registry)));
    assert!(registry.is_defined(TAG_NAME));
    assert!(!define(Some(&mut registry)));
    assert!(!define::<MemoryRegistry>(None));
}

#[test]
fn change_flag_is_raised_by_the_engine() {
    let flag = ChangeFlag::default();
    let mut options = EngineOptions::new(10, 10);
    options.on_change = Some(flag.callback());
    let mut engine = VirtualizerEngine::new(options);
    assert!(!flag.take());
    assert!(!engine.is_mounted());

    engine.mount();
    assert!(engine.is_mounted());
    assert!(engine.virtualizer().enabled());
    flag.take();

    engine.will_update(Viewport {
        width: 50.0,
        height: 50.0,
        ..Viewport::default()
    });
    assert!(flag.take());
    assert!(!flag.take());
    assert_eq!(engine.virtualizer().scroll_rect().main, 50);

    engine.unmount();
    assert!(!engine.is_mounted());
    assert!(!engine.virtualizer().enabled());
    flag.take();
    engine.will_update(Viewport::default());
    assert!(!flag.take());
}
