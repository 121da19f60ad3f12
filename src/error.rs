//! Error type for the fallible edges of the widget (config decode, browser APIs).
//!
//! Nothing here reaches the end user: the controller logs these and falls back
//! to defaults. Only the `wasm_bindgen` exports hand them to JS, as `JsValue`.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum MascotError {
    #[error("invalid mascot config payload: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("audio unavailable: {0}")]
    Audio(String),

    #[error("dom operation failed: {0}")]
    Dom(String),

    #[error("no global window")]
    NoWindow,
}

impl MascotError {
    /// Wrap a JS exception thrown by a `web-sys` call.
    pub(crate) fn dom(err: JsValue) -> Self {
        MascotError::Dom(describe(&err))
    }

    pub(crate) fn audio(err: JsValue) -> Self {
        MascotError::Audio(describe(&err))
    }

    pub(crate) fn storage(err: JsValue) -> Self {
        MascotError::Storage(describe(&err))
    }
}

impl From<MascotError> for JsValue {
    fn from(err: MascotError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
