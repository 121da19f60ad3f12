//! Cupid mascot core crate.
//!
//! A floating mascot that peeks, runs and hops around the page, dodges a nearby
//! pointer, and can be "caught" with a click. All behaviour lives in
//! [`MascotController`], a single-clock state machine that is pure Rust and
//! testable on the host; the [`web`] module mounts it into a page through
//! `wasm-bindgen` / `web-sys`.
//!
//! JS usage:
//!
//! ```js
//! const handle = mount_mascot(await fetchConfigRow());
//! const sub = realtime.on("cupid_mascot", (row) => handle.push_config(JSON.stringify(row)));
//! handle.set_unsubscribe(() => sub.unsubscribe());
//! // later
//! handle.unmount();
//! ```

use wasm_bindgen::prelude::*;

pub mod capabilities;
pub mod config;
pub mod error;
pub mod feed;
pub mod mascot;
pub mod preset;
pub mod render;
pub mod scheduler;
pub mod web;

pub use capabilities::{KeyValueStore, MemoryStore, RandomSource, SeededRandom, SilentTones, Tone, ToneEmitter};
pub use config::{ConfigPatch, MascotConfig, MascotSettings};
pub use error::MascotError;
pub use feed::{ConfigFeed, ConfigPublisher, config_channel};
pub use mascot::{InteractionOutcome, MascotController, MascotState, Motion};
pub use preset::{Corner, Preset, Viewport};
pub use render::RenderDirectives;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Err only when the embedding page already installed a logger.
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// Admin helpers: the shape an admin surface writes to the shared config row
// -----------------------------------------------------------------------------

/// Identifier of the shared config row.
#[wasm_bindgen]
pub fn config_id() -> String {
    config::CONFIG_ID.to_owned()
}

/// Default config record, used to seed the row.
#[wasm_bindgen]
pub fn default_config_record() -> Result<String, JsValue> {
    Ok(MascotConfig::default().to_record_json()?)
}

/// Merge `patch_json` onto `record_json` (either may be partial) and return
/// the sanitized full record, ready to save.
#[wasm_bindgen]
pub fn merge_config_record(record_json: Option<String>, patch_json: &str) -> Result<String, JsValue> {
    Ok(merged_record(record_json.as_deref(), patch_json)?)
}

fn merged_record(record_json: Option<&str>, patch_json: &str) -> Result<String, MascotError> {
    let mut config = MascotConfig::from_remote(record_json);
    config.apply(&ConfigPatch::from_json(patch_json)?);
    config.to_record_json()
}
