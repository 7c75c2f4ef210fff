//! Video Manager - Drives the page's single video element outside the render cycle.
//! The controller is host-agnostic; the browser bindings only exist on wasm.

mod controller;
mod host;
mod listener_set;
#[cfg(target_arch = "wasm32")]
mod listeners;
#[cfg(target_arch = "wasm32")]
mod web_host;

#[cfg(target_arch = "wasm32")]
pub use listeners::mount;
