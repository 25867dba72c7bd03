use core::fmt;

use crate::Orientation;

/// One batch entry of child-list changes on an observed node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord<N> {
    pub target: N,
    pub added: Vec<N>,
    pub removed: Vec<N>,
}

impl<N> MutationRecord<N> {
    pub fn added(target: N, nodes: impl IntoIterator<Item = N>) -> Self {
        Self {
            target,
            added: nodes.into_iter().collect(),
            removed: Vec::new(),
        }
    }

    pub fn removed(target: N, nodes: impl IntoIterator<Item = N>) -> Self {
        Self {
            target,
            added: Vec::new(),
            removed: nodes.into_iter().collect(),
        }
    }
}

/// Geometry of the scrolling element, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl Viewport {
    /// Size along `axis`.
    pub fn main(&self, axis: Orientation) -> f64 {
        match axis {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }

    /// Size across `axis`.
    pub fn cross(&self, axis: Orientation) -> f64 {
        match axis {
            Orientation::Vertical => self.width,
            Orientation::Horizontal => self.height,
        }
    }

    pub fn scroll_offset(&self, axis: Orientation) -> f64 {
        match axis {
            Orientation::Vertical => self.scroll_top,
            Orientation::Horizontal => self.scroll_left,
        }
    }
}

/// The document operations the element needs from its host.
///
/// Nodes are handles: cloning one never clones the underlying node, and `==` compares identity.
/// Every operation is infallible from the caller's point of view; implementations swallow host
/// errors and fall back to a neutral result.
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;
    /// A live child-list subscription.
    type Observer;

    fn is_element(&self, node: &Self::Node) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    /// The live children of `parent`, in document order, of every node type.
    fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;
    /// Detaches `node` from its parent, if any.
    fn detach(&mut self, node: &Self::Node);
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
    /// Replaces the whole child set of `parent` in one operation, moving `children` in order.
    fn replace_children(&mut self, parent: &Self::Node, children: &[Self::Node]);

    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);
    /// Creates a detached element, or `None` when the host refuses.
    fn create_element(&mut self, tag: &str) -> Option<Self::Node>;
    /// Returns the root of `host`'s private render tree, creating it on first use.
    ///
    /// Children of the render root are never reported as children of `host`. `None` when the
    /// host cannot provide one; the element then stays inactive.
    fn render_root(&mut self, host: &Self::Node) -> Option<Self::Node>;

    /// Subscribes to child-list changes of every node in `targets`, as one stream.
    fn observe_children(&mut self, targets: &[Self::Node]) -> Option<Self::Observer>;
    /// Drains records queued for `observer` that have not been delivered yet.
    fn take_records(&mut self, observer: &Self::Observer) -> Vec<MutationRecord<Self::Node>>;
    fn disconnect(&mut self, observer: Self::Observer);

    /// Rendered size of `node` along `axis`, or `None` when it has no layout.
    fn measure(&self, node: &Self::Node, axis: Orientation) -> Option<f64>;
    fn viewport(&self, node: &Self::Node) -> Viewport;
    fn set_scroll_offset(&mut self, node: &Self::Node, axis: Orientation, offset: f64);
}

/// A host's custom element registry.
pub trait ElementRegistry {
    fn is_defined(&self, name: &str) -> bool;
    fn define(&mut self, name: &str);
}

/// The tag name the element registers under.
pub const TAG_NAME: &str = "virtual-list";

/// Registers the element tag.
///
/// Returns `false` without doing anything when the host has no registry or the tag is taken.
pub fn define<R: ElementRegistry + ?Sized>(registry: Option<&mut R>) -> bool {
    let Some(registry) = registry else {
        vdebug!("define: no custom element registry");
        return false;
    };
    if registry.is_defined(TAG_NAME) {
        return false;
    }
    registry.define(TAG_NAME);
    true
}
