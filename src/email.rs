// The EmailJS contract: three opaque identifiers and a JSON POST.
// The browser transport is `web::email::EmailJsClient`.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::EmailError;

pub const EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl EmailJsConfig {
    /// Identifiers baked in at build time from `EMAILJS_SERVICE_ID`,
    /// `EMAILJS_TEMPLATE_ID` and `EMAILJS_PUBLIC_KEY`.
    pub fn from_env() -> Result<EmailJsConfig, EmailError> {
        EmailJsConfig::from_lookup(|key| {
            let value = match key {
                "EMAILJS_SERVICE_ID" => option_env!("EMAILJS_SERVICE_ID"),
                "EMAILJS_TEMPLATE_ID" => option_env!("EMAILJS_TEMPLATE_ID"),
                "EMAILJS_PUBLIC_KEY" => option_env!("EMAILJS_PUBLIC_KEY"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<EmailJsConfig, EmailError> {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(EmailError::MissingConfig(key))
        };
        Ok(EmailJsConfig {
            service_id: get("EMAILJS_SERVICE_ID")?,
            template_id: get("EMAILJS_TEMPLATE_ID")?,
            public_key: get("EMAILJS_PUBLIC_KEY")?,
        })
    }

    pub fn from_json(json: &str) -> Result<EmailJsConfig, EmailError> {
        let config: EmailJsConfig = serde_json::from_str(json)?;
        if config.service_id.trim().is_empty() {
            return Err(EmailError::MissingConfig("service_id"));
        }
        if config.template_id.trim().is_empty() {
            return Err(EmailError::MissingConfig("template_id"));
        }
        if config.public_key.trim().is_empty() {
            return Err(EmailError::MissingConfig("public_key"));
        }
        Ok(config)
    }
}

/// Template parameters of one contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a EmailMessage,
}

/// JSON body for the EmailJS send endpoint.
pub fn request_body(config: &EmailJsConfig, message: &EmailMessage) -> Result<String, EmailError> {
    let body = serde_json::to_string(&SendRequest {
        service_id: &config.service_id,
        template_id: &config.template_id,
        user_id: &config.public_key,
        template_params: message,
    })?;
    Ok(body)
}

/// Something that can deliver a contact message. Futures are not `Send`;
/// everything runs on the page's event loop.
pub trait EmailService {
    fn send(&self, message: &EmailMessage) -> impl Future<Output = Result<(), EmailError>>;
}
