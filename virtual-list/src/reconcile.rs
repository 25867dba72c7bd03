use crate::render::ROLE_LISTITEM;
use crate::{Dom, MutationRecord, Registry};

/// Outcome of applying one batch of child-list records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub added: usize,
    pub removed: usize,
    /// Non-element nodes that were detached again.
    pub rejected: usize,
}

impl Reconciled {
    /// Whether the registry changed, which calls for new engine options and a render pass.
    pub fn is_significant(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

fn ensure_listitem_role<D: Dom>(dom: &mut D, node: &D::Node) {
    if !dom.has_attribute(node, "role") {
        dom.set_attribute(node, "role", ROLE_LISTITEM);
    }
}

/// Moves every current child of `host` into the registry, in document order.
///
/// Non-element children are detached and forgotten. Afterwards `host` has no children.
pub(crate) fn capture<D: Dom>(
    dom: &mut D,
    host: &D::Node,
    registry: &mut Registry<D::Node>,
) -> usize {
    let mut captured = 0;
    for node in dom.children(host) {
        dom.detach(&node);
        if !dom.is_element(&node) {
            continue;
        }
        ensure_listitem_role(dom, &node);
        if registry.push(node) {
            captured += 1;
        }
    }
    vdebug!(captured, total = registry.len(), "capture");
    captured
}

/// Applies a batch of child-list records to the registry.
///
/// Records targeting `host` may add and remove items. Records targeting any other observed node
/// (the render tree) only report removals: an item the caller removes from wherever it is
/// currently rendered leaves the registry too. Removal always matches by identity, so an item
/// added and removed within one batch nets out.
pub(crate) fn reconcile<D: Dom>(
    dom: &mut D,
    host: &D::Node,
    registry: &mut Registry<D::Node>,
    records: &[MutationRecord<D::Node>],
) -> Reconciled {
    let mut out = Reconciled::default();
    for record in records {
        if record.target == *host {
            for node in &record.added {
                let attached_to_host = dom.parent(node).as_ref() == Some(host);
                if !dom.is_element(node) {
                    if attached_to_host {
                        dom.detach(node);
                    }
                    out.rejected += 1;
                    continue;
                }
                ensure_listitem_role(dom, node);
                if attached_to_host {
                    dom.detach(node);
                }
                // Re-appending a tracked item moves it to the end, rendered or not.
                if registry.remove(node).is_some() {
                    out.removed += 1;
                }
                registry.push(node.clone());
                out.added += 1;
            }
        }
        for node in &record.removed {
            // A node removed from the host but re-attached there later in the same batch is
            // still an item.
            if record.target == *host && dom.parent(node).as_ref() == Some(host) {
                continue;
            }
            if registry.remove(node).is_some() {
                out.removed += 1;
            }
        }
    }
    vdebug!(
        added = out.added,
        removed = out.removed,
        rejected = out.rejected,
        count = registry.len(),
        "reconcile"
    );
    out
}
