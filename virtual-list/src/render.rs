use virtualizer::VirtualItem;

use crate::config::to_px;
use crate::{Dom, Engine, Orientation, Registry};

pub const ROLE_LIST: &str = "list";
pub const ROLE_LISTITEM: &str = "listitem";
/// Logical index stamped on every rendered item, read back by the measurement pass.
pub const INDEX_ATTRIBUTE: &str = "data-index";

/// The element's private render tree: a scrolling viewport holding a sizer that spans the total
/// extent, which in turn holds the translated items container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderParts<N> {
    pub root: N,
    pub viewport: N,
    pub sizer: N,
    pub items: N,
}

impl<N: Clone + PartialEq + core::fmt::Debug> RenderParts<N> {
    pub(crate) fn build<D: Dom<Node = N>>(dom: &mut D, host: &N) -> Option<Self> {
        let root = dom.render_root(host)?;
        let viewport = dom.create_element("div")?;
        let sizer = dom.create_element("div")?;
        let items = dom.create_element("div")?;

        dom.set_attribute(&viewport, "part", "viewport");
        dom.set_style(&viewport, "overflow", "auto");
        dom.set_style(&viewport, "contain", "strict");
        dom.set_style(&viewport, "width", "100%");
        dom.set_style(&viewport, "height", "100%");

        dom.set_attribute(&sizer, "part", "sizer");
        dom.set_style(&sizer, "position", "relative");

        dom.set_attribute(&items, "part", "items");
        dom.set_style(&items, "position", "absolute");
        dom.set_style(&items, "top", "0");
        dom.set_style(&items, "left", "0");
        dom.set_style(&items, "display", "flex");

        dom.append_child(&root, &viewport);
        dom.append_child(&viewport, &sizer);
        dom.append_child(&sizer, &items);

        Some(Self {
            root,
            viewport,
            sizer,
            items,
        })
    }
}

/// Moves the registry items of the current window into the items container.
///
/// `window` is a scratch buffer reused across passes. Returns the number of rendered items.
pub(crate) fn render_window<D: Dom, E: Engine + ?Sized>(
    dom: &mut D,
    parts: &RenderParts<D::Node>,
    registry: &Registry<D::Node>,
    engine: &E,
    axis: Orientation,
    window: &mut Vec<VirtualItem>,
) -> usize {
    engine.virtual_items(window);

    let set_size = registry.len().to_string();
    let mut fragment = Vec::with_capacity(window.len());
    let mut first_start = None;
    for item in window.iter() {
        // Indices past the end of a just-shrunk registry are skipped.
        let Some(node) = registry.get(item.index) else {
            continue;
        };
        dom.set_attribute(node, "aria-setsize", &set_size);
        dom.set_attribute(node, "aria-posinset", &(item.index + 1).to_string());
        dom.set_attribute(node, INDEX_ATTRIBUTE, &item.index.to_string());
        first_start.get_or_insert(item.start);
        fragment.push(node.clone());
    }
    dom.replace_children(&parts.items, &fragment);

    dom.set_style(
        &parts.sizer,
        axis.extent_property(),
        &format!("{}px", engine.total_size()),
    );
    dom.set_style(&parts.sizer, axis.cross_property(), "100%");
    dom.set_style(&parts.items, axis.cross_property(), "100%");
    dom.set_style(&parts.items, axis.extent_property(), "");
    dom.set_style(
        &parts.items,
        "flex-direction",
        match axis {
            Orientation::Vertical => "column",
            Orientation::Horizontal => "row",
        },
    );
    dom.set_style(
        &parts.items,
        "transform",
        &axis.translate(first_start.unwrap_or(0)),
    );

    vtrace!(
        rendered = fragment.len(),
        count = registry.len(),
        total = engine.total_size(),
        "render_window"
    );
    fragment.len()
}

/// Feeds the real size of every rendered item back into the engine.
///
/// Iterates the live children of the items container, which are exactly the rendered subset.
/// Items whose size already matches the engine are skipped. Returns whether any size changed and
/// the accumulated scroll adjustment requested by the engine.
pub(crate) fn measure_rendered<D: Dom, E: Engine + ?Sized>(
    dom: &D,
    parts: &RenderParts<D::Node>,
    registry: &Registry<D::Node>,
    engine: &mut E,
    axis: Orientation,
) -> (bool, i64) {
    let mut changed = false;
    let mut adjust = 0i64;
    for child in dom.children(&parts.items) {
        if !dom.is_element(&child) {
            continue;
        }
        let Some(index) = dom
            .attribute(&child, INDEX_ATTRIBUTE)
            .and_then(|s| s.parse::<usize>().ok())
        else {
            continue;
        };
        if registry.get(index) != Some(&child) {
            continue;
        }
        let Some(size) = dom.measure(&child, axis) else {
            continue;
        };
        let size = to_px(size);
        if engine.item_size(index) == Some(size) {
            continue;
        }
        changed = true;
        adjust = adjust.saturating_add(engine.measure_element(index, size));
    }
    (changed, adjust)
}
