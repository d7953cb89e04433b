// Decorative particle background and contact form logic for a portfolio
// site, compiled to WebAssembly.
//
// The simulation, lifecycle and form modules are platform independent and
// tested natively; `web` holds the `web-sys` implementations and the
// `#[wasm_bindgen]` exports the page calls.

pub mod assets;
pub mod color;
pub mod config;
pub mod contact;
pub mod cursor;
pub mod email;
pub mod error;
pub mod field;
pub mod input;
pub mod lifecycle;
pub mod particle;
pub mod pointer;
pub mod renderer;
pub mod storage;
pub mod surface;
pub mod web;

use wasm_bindgen::prelude::*;

pub use config::{BoundaryMode, EffectConfig, PointerMode, Theme};
pub use contact::{ContactFields, ContactForm, Field, FieldError, Notification};
pub use error::{EffectError, EmailError, StorageError};
pub use field::ParticleField;
pub use lifecycle::{Activation, Host, OptOut, ParticleEffect};
pub use surface::{Surface, Viewport};
pub use web::{drive_download, drive_thumbnail, ContactFormHandle, ImageHandle, ParticleBackground};

// Use `wee_alloc` as the global allocator when the feature is on
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Call once before anything else: routes panics and `log` output to the
/// browser console.
#[wasm_bindgen]
pub fn initialize() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("portfolio-particles {} initialized", env!("CARGO_PKG_VERSION"));
}
