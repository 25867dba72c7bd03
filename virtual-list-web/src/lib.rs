#![forbid(unsafe_code)]

//! WASM frontend for `virtual-list`.
//!
//! Implements the core's host traits over `web-sys` and registers the `<virtual-list>` custom
//! element:
//! - [`Dom`](virtual_list::Dom) over live DOM nodes, with the render tree in an open shadow root
//!   and child-list subscriptions backed by `MutationObserver`
//! - [`FrameScheduler`](virtual_list::FrameScheduler) over `requestAnimationFrame`, falling back
//!   to a resolved-promise microtask
//! - `define()`, which registers the element class when `customElements` exists

use virtual_list::Align;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{VirtualListElement, WebDom, WebHandle, WebObserver, WebScheduler, define};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays green on
/// non-wasm targets. There is no custom element registry here.
#[cfg(not(target_arch = "wasm32"))]
pub fn define() -> bool {
    false
}

/// Parses a scroll alignment as accepted by `scrollToIndex` (`start`, `center`, `end`, `auto`).
///
/// Unknown or missing values mean `auto`.
pub fn parse_align(value: Option<&str>) -> Align {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("start") => Align::Start,
        Some(v) if v.eq_ignore_ascii_case("center") => Align::Center,
        Some(v) if v.eq_ignore_ascii_case("end") => Align::End,
        _ => Align::Auto,
    }
}
