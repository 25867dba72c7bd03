use std::sync::Arc;

use virtualizer::{Align, OnChangeCallback, Rect, VirtualItem, Virtualizer, VirtualizerOptions};

use crate::config::to_px;
use crate::{Orientation, Viewport};

/// Stable identity of a logical item.
///
/// Index keys are only stable as long as items are not reordered; items that should keep their
/// measured size across reorders need an explicit identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    Id(Arc<str>),
    Index(usize),
}

/// The option set pushed into an [`Engine`].
///
/// Closures are `Arc`s so that cloning options never reallocates them.
#[derive(Clone)]
pub struct EngineOptions {
    pub count: usize,
    pub estimate_size: Arc<dyn Fn(usize) -> u32 + Send + Sync>,
    pub get_item_key: Arc<dyn Fn(usize) -> ItemKey + Send + Sync>,
    pub overscan: usize,
    pub horizontal: bool,
    pub padding_start: u32,
    pub padding_end: u32,
    pub scroll_padding_start: u32,
    pub scroll_padding_end: u32,
    /// Fired whenever the engine's window may have changed.
    pub on_change: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl EngineOptions {
    /// Index-keyed options with a uniform estimate and no change callback.
    pub fn new(count: usize, estimate: u32) -> Self {
        Self {
            count,
            estimate_size: Arc::new(move |_| estimate),
            get_item_key: Arc::new(ItemKey::Index),
            overscan: 0,
            horizontal: false,
            padding_start: 0,
            padding_end: 0,
            scroll_padding_start: 0,
            scroll_padding_end: 0,
            on_change: None,
        }
    }

    pub fn axis(&self) -> Orientation {
        if self.horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

impl core::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .field("horizontal", &self.horizontal)
            .field("padding_start", &self.padding_start)
            .field("padding_end", &self.padding_end)
            .field("scroll_padding_start", &self.scroll_padding_start)
            .field("scroll_padding_end", &self.scroll_padding_end)
            .finish_non_exhaustive()
    }
}

/// The virtualization engine as seen by the element.
///
/// The element never computes windows or extents itself; any engine with this contract can be
/// substituted (see [`crate::VirtualList::with_engine`]).
pub trait Engine {
    fn set_options(&mut self, options: EngineOptions);
    /// Pre-update hook: receives the scroll element's current geometry.
    fn will_update(&mut self, viewport: Viewport);
    fn mount(&mut self);
    /// Teardown. The element calls this once per instance.
    fn unmount(&mut self);
    /// Discards measured sizes so the next measurement pass starts over.
    fn measure(&mut self);

    fn count(&self) -> usize;
    fn total_size(&self) -> u64;
    fn scroll_offset(&self) -> u64;
    /// Current size (measured or estimated) of the item at `index`.
    fn item_size(&self, index: usize) -> Option<u32>;
    /// Collects the current window into `out` (clears `out` first).
    fn virtual_items(&self, out: &mut Vec<VirtualItem>);
    /// Records the rendered size of the item at `index`.
    ///
    /// Returns the scroll adjustment to apply so content above the viewport does not jump.
    fn measure_element(&mut self, index: usize, size: u32) -> i64;
    fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64;
}

/// [`Engine`] backed by [`virtualizer::Virtualizer`].
#[derive(Clone, Debug)]
pub struct VirtualizerEngine {
    v: Virtualizer<ItemKey>,
    axis: Orientation,
    viewport: Viewport,
    mounted: bool,
}

impl VirtualizerEngine {
    pub fn new(options: EngineOptions) -> Self {
        let axis = options.axis();
        Self {
            v: Virtualizer::new(to_virtualizer_options(options)),
            axis,
            viewport: Viewport::default(),
            mounted: false,
        }
    }

    pub fn virtualizer(&self) -> &Virtualizer<ItemKey> {
        &self.v
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn apply_viewport(&mut self) {
        let axis = self.axis;
        let rect = Rect {
            main: to_px(self.viewport.main(axis)),
            cross: to_px(self.viewport.cross(axis)),
        };
        let offset = u64::from(to_px(self.viewport.scroll_offset(axis)));
        self.v.batch_update(|v| {
            v.set_scroll_rect(rect);
            v.set_scroll_offset(offset);
        });
    }
}

fn to_virtualizer_options(options: EngineOptions) -> VirtualizerOptions<ItemKey> {
    let EngineOptions {
        count,
        estimate_size,
        get_item_key,
        overscan,
        padding_start,
        padding_end,
        scroll_padding_start,
        scroll_padding_end,
        on_change,
        ..
    } = options;
    let mut out = VirtualizerOptions::new_with_key(
        count,
        move |i| estimate_size(i),
        move |i| get_item_key(i),
    )
    .with_overscan(overscan)
    .with_padding(padding_start, padding_end)
    .with_scroll_padding(scroll_padding_start, scroll_padding_end);
    out.on_change = on_change.map(|f| {
        Arc::new(move |_: &Virtualizer<ItemKey>, _: bool| f()) as OnChangeCallback<ItemKey>
    });
    out
}

impl Engine for VirtualizerEngine {
    fn set_options(&mut self, options: EngineOptions) {
        let axis = options.axis();
        let enabled = self.v.enabled();
        let mut next = to_virtualizer_options(options);
        next.enabled = enabled;
        self.v.set_options(next);
        if axis != self.axis {
            // The last viewport must be re-read along the new axis.
            self.axis = axis;
            self.apply_viewport();
        }
    }

    fn will_update(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.apply_viewport();
    }

    fn mount(&mut self) {
        self.mounted = true;
        self.v.set_enabled(true);
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.v.update_options(|o| {
            o.on_change = None;
            o.enabled = false;
        });
    }

    fn measure(&mut self) {
        self.v.reset_measurements();
    }

    fn count(&self) -> usize {
        self.v.count()
    }

    fn total_size(&self) -> u64 {
        self.v.total_size()
    }

    fn scroll_offset(&self) -> u64 {
        self.v.scroll_offset()
    }

    fn item_size(&self, index: usize) -> Option<u32> {
        self.v.item_size(index)
    }

    fn virtual_items(&self, out: &mut Vec<VirtualItem>) {
        out.clear();
        self.v.for_each_virtual_item(|item| out.push(item));
    }

    fn measure_element(&mut self, index: usize, size: u32) -> i64 {
        self.v.resize_item(index, size)
    }

    fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        self.v.scroll_to_index_offset(index, align)
    }
}
