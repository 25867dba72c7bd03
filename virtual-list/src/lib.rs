//! A virtual list element core built on the `virtualizer` crate.
//!
//! The element owns an ordered registry of externally created item nodes and renders only the
//! ones in the engine's current window (plus overscan), while the sizer keeps the full scroll
//! extent and every rendered item carries `aria-posinset`/`aria-setsize` for the full list.
//!
//! It is host-driven and holds no browser bindings. A host provides:
//! - a [`Dom`] (tree edits, attributes, styles, child-list observation, layout reads)
//! - a [`FrameScheduler`] (next-paint callbacks, with a microtask fallback)
//! - lifecycle, mutation, frame and scroll callbacks forwarded to [`VirtualList`]
//!
//! [`memory`] contains a deterministic in-memory host. For a browser host, see the
//! `virtual-list-web` crate.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod adapter;
mod config;
mod dom;
mod element;
mod engine;
pub mod memory;
mod reconcile;
mod registry;
mod render;
mod schedule;

#[cfg(test)]
mod tests;

pub use adapter::{
    ChangeFlag, ITEM_ID_ATTRIBUTE, ITEM_SIZE_ATTRIBUTE, item_key, item_size, recompute_options,
};
pub use config::{
    Attribute, Config, DEFAULT_ESTIMATE_SIZE, DEFAULT_OVERSCAN, OBSERVED_ATTRIBUTES,
    Orientation, UnknownAttribute,
};
pub use dom::{Dom, ElementRegistry, MutationRecord, TAG_NAME, Viewport, define};
pub use element::{LifecycleState, VirtualList};
pub use engine::{Engine, EngineOptions, ItemKey, VirtualizerEngine};
pub use reconcile::Reconciled;
pub use registry::Registry;
pub use render::{INDEX_ATTRIBUTE, ROLE_LIST, ROLE_LISTITEM, RenderParts};
pub use schedule::{FrameScheduler, MeasureSlot};

pub use virtualizer::{Align, VirtualItem};
