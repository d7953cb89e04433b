use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("host error: {0}")]
    Host(String),
    #[error("invalid effect config: {0}")]
    Config(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email service is not configured: missing {0}")]
    MissingConfig(&'static str),
    #[error("invalid email config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("email request failed: {0}")]
    Transport(String),
    #[error("email service responded with HTTP {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage operation failed: {0}")]
    Operation(String),
    #[error("stored draft is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

// Everything crossing into JS becomes a plain message string.
impl From<EffectError> for JsValue {
    fn from(err: EffectError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

impl From<EmailError> for JsValue {
    fn from(err: EmailError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
