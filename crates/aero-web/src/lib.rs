#![forbid(unsafe_code)]

//! Browser adapter for Aero reflow.
//!
//! This crate connects `aero-core` to a real document:
//!
//! - [`bridge`]: JSON parsing of the JS-facing config and table objects.
//! - [`ContextCore`]: manager plus observation port for one document,
//!   generic over the DOM host so it runs natively under test.
//! - `WebDom` (wasm32 only): [`DomHost`](aero_core::DomHost) over `web-sys`.
//! - `AeroContext` (wasm32 only): the `wasm-bindgen` class exposed to JS. It
//!   installs one `resize` listener and one document-wide `MutationObserver`.
//!
//! ```js
//! const ctx = new AeroContext();
//! ctx.create({ element: '.element-to-move', type: 'reorder',
//!              md: ['#top > .content', 'insertBefore'] });
//! ctx.create();                       // body class per breakpoint
//! ctx.updateAllBreakpoints({ xl: 1400, md: 900, xs: 0 });
//! ```

pub mod bridge;
mod context_core;

pub use bridge::{BridgeError, config_from_json, table_from_json};
pub use context_core::ContextCore;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
#[cfg(target_arch = "wasm32")]
pub use wasm::AeroContext;
