//! Browser bindings: `localStorage`, Web Audio and the DOM host.

mod audio;
mod host;
mod storage;

pub use audio::WebTones;
pub use host::{MascotHandle, mount_mascot};
pub use storage::LocalStore;
