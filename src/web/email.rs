use std::future::Future;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::email::{request_body, EmailJsConfig, EmailMessage, EmailService, EMAILJS_ENDPOINT};
use crate::error::{js_message, EmailError};

/// Sends contact messages through the EmailJS REST endpoint with `fetch`.
pub struct EmailJsClient {
    config: EmailJsConfig,
}

impl EmailJsClient {
    pub fn new(config: EmailJsConfig) -> Self {
        EmailJsClient { config }
    }
}

impl EmailService for EmailJsClient {
    fn send(&self, message: &EmailMessage) -> impl Future<Output = Result<(), EmailError>> {
        let body = request_body(&self.config, message);
        async move {
            let body = body?;
            let window = web_sys::window().ok_or_else(|| EmailError::Transport("no window".to_owned()))?;

            let opts = RequestInit::new();
            opts.set_method("POST");
            opts.set_mode(RequestMode::Cors);
            opts.set_body(&JsValue::from_str(&body));

            let request = Request::new_with_str_and_init(EMAILJS_ENDPOINT, &opts)
                .map_err(|e| EmailError::Transport(js_message(&e)))?;
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| EmailError::Transport(js_message(&e)))?;

            let resp_value = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(|e| EmailError::Transport(js_message(&e)))?;
            let resp: Response = resp_value
                .dyn_into()
                .map_err(|_| EmailError::Transport("invalid response".to_owned()))?;

            if !resp.ok() {
                return Err(EmailError::Status(resp.status()));
            }
            Ok(())
        }
    }
}
