use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{parse_number, to_px};
use crate::{Config, Dom, EngineOptions, ItemKey, Registry};

/// Per-item size override, in pixels.
pub const ITEM_SIZE_ATTRIBUTE: &str = "data-estimate-size";
/// Explicit item identifier used as the stable key.
pub const ITEM_ID_ATTRIBUTE: &str = "id";

/// Raised by the engine's change callback; drained by the element before rendering.
#[derive(Clone, Debug, Default)]
pub struct ChangeFlag(Arc<AtomicBool>);

impl ChangeFlag {
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether the flag was raised since the last call, and lowers it.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn callback(&self) -> Arc<dyn Fn() + Send + Sync> {
        let flag = Arc::clone(&self.0);
        Arc::new(move || flag.store(true, Ordering::Release))
    }
}

/// Reads the stable key of one item: its identifier if present, else its index.
pub fn item_key<D: Dom>(dom: &D, node: &D::Node, index: usize) -> ItemKey {
    match dom.attribute(node, ITEM_ID_ATTRIBUTE) {
        Some(id) if !id.is_empty() => ItemKey::Id(Arc::from(id)),
        _ => ItemKey::Index(index),
    }
}

/// Reads the per-item size override of one item, if it declares a valid one.
pub fn item_size<D: Dom>(dom: &D, node: &D::Node) -> Option<u32> {
    let raw = dom.attribute(node, ITEM_SIZE_ATTRIBUTE)?;
    parse_number(Some(&raw))
        .filter(|v| *v > 0.0)
        .map(to_px)
}

/// Builds the engine options for the current registry and configuration.
///
/// Keys and size overrides are snapshotted here, so the closures handed to the engine stay pure
/// no matter how often it calls them. Every registry change recomputes the options.
pub fn recompute_options<D: Dom>(
    dom: &D,
    registry: &Registry<D::Node>,
    config: &Config,
    changed: &ChangeFlag,
) -> EngineOptions {
    let mut keys = Vec::with_capacity(registry.len());
    let mut sizes = Vec::with_capacity(registry.len());
    for (i, node) in registry.iter().enumerate() {
        keys.push(item_key(dom, node, i));
        sizes.push(item_size(dom, node));
    }
    let keys: Arc<[ItemKey]> = keys.into();
    let sizes: Arc<[Option<u32>]> = sizes.into();

    let default_size = config.estimate_px();
    let (padding_start, padding_end) = config.padding_px();
    let (scroll_padding_start, scroll_padding_end) = config.scroll_padding_px();

    EngineOptions {
        count: registry.len(),
        estimate_size: Arc::new(move |i| sizes.get(i).copied().flatten().unwrap_or(default_size)),
        get_item_key: Arc::new(move |i| keys.get(i).cloned().unwrap_or(ItemKey::Index(i))),
        overscan: config.overscan,
        horizontal: config.orientation.is_horizontal(),
        padding_start,
        padding_end,
        scroll_padding_start,
        scroll_padding_end,
        on_change: Some(changed.callback()),
    }
}
