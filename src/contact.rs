// Contact form state: field validation, debounced draft persistence and
// the submit flow around an `EmailService`.
//
// Submission is split into `ContactForm::begin_submit` and
// `ContactForm::finish_submit` so the browser glue can await the network
// without holding a borrow of the form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::email::{EmailMessage, EmailService};
use crate::error::EmailError;
use crate::storage::DraftStore;

pub const DRAFT_KEY: &str = "contact-form-draft";
pub const DRAFT_DEBOUNCE_MS: f64 = 1000.0;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_SUBJECT_LEN: usize = 3;
pub const MIN_MESSAGE_LEN: usize = 10;

pub const SUCCESS_MESSAGE: &str = "Thanks for reaching out! Your message has been sent.";
pub const FAILURE_MESSAGE: &str = "Sorry, your message could not be sent. Please try again later.";
pub const INVALID_MESSAGE: &str = "Please fix the highlighted fields.";
pub const SENDING_MESSAGE: &str = "Sending your message...";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).trim().is_empty())
    }

    fn to_message(&self) -> EmailMessage {
        EmailMessage {
            from_name: self.name.trim().to_owned(),
            from_email: self.email.trim().to_owned(),
            subject: self.subject.trim().to_owned(),
            message: self.message.trim().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "name" => Some(Field::Name),
            "email" => Some(Field::Email),
            "subject" => Some(Field::Subject),
            "message" => Some(Field::Message),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TooShort { min: usize },
    InvalidEmail,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => write!(f, "This field is required"),
            FieldError::TooShort { min } => write!(f, "Must be at least {} characters", min),
            FieldError::InvalidEmail => write!(f, "Please enter a valid email address"),
        }
    }
}

pub type FieldErrors = BTreeMap<Field, FieldError>;

pub fn validate_field(field: Field, value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Some(FieldError::Required);
    }
    let min = match field {
        Field::Name => MIN_NAME_LEN,
        Field::Subject => MIN_SUBJECT_LEN,
        Field::Message => MIN_MESSAGE_LEN,
        Field::Email => {
            return if is_valid_email(value) {
                None
            } else {
                Some(FieldError::InvalidEmail)
            };
        }
    };
    if value.chars().count() < min {
        Some(FieldError::TooShort { min })
    } else {
        None
    }
}

pub fn validate(fields: &ContactFields) -> FieldErrors {
    Field::ALL
        .iter()
        .filter_map(|field| validate_field(*field, fields.get(*field)).map(|err| (*field, err)))
        .collect()
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot in the
/// domain with something on both sides of it.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1,
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
    /// A send is already in flight.
    Pending(String),
}

impl Notification {
    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Notification::Success(text) | Notification::Error(text) | Notification::Pending(text) => text,
        }
    }
}

/// Runs a save `delay_ms` after the most recent edit.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: f64,
    due_at: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Debounce {
        Debounce { delay_ms, due_at: None }
    }

    pub fn schedule(&mut self, now_ms: f64) {
        self.due_at = Some(now_ms + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// True once when the deadline has passed.
    pub fn fire(&mut self, now_ms: f64) -> bool {
        match self.due_at {
            Some(due) if now_ms >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

pub struct ContactForm<S: DraftStore> {
    fields: ContactFields,
    errors: FieldErrors,
    store: S,
    autosave: Debounce,
    submitting: bool,
    notification: Option<Notification>,
}

impl<S: DraftStore> ContactForm<S> {
    /// New form, pre-filled from a saved draft if there is one.
    pub fn new(store: S) -> ContactForm<S> {
        ContactForm::with_debounce(store, DRAFT_DEBOUNCE_MS)
    }

    pub fn with_debounce(store: S, debounce_ms: f64) -> ContactForm<S> {
        let mut form = ContactForm {
            fields: ContactFields::default(),
            errors: FieldErrors::new(),
            store,
            autosave: Debounce::new(debounce_ms),
            submitting: false,
            notification: None,
        };
        form.restore_draft();
        form
    }

    fn restore_draft(&mut self) {
        let raw = match self.store.load(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                log::warn!("could not read contact draft: {}", err);
                return;
            }
        };
        match serde_json::from_str::<ContactFields>(&raw) {
            Ok(fields) => {
                log::debug!("restored contact draft");
                self.fields = fields;
            }
            Err(err) => {
                log::warn!("discarding malformed contact draft: {}", err);
                let _ = self.store.remove(DRAFT_KEY);
            }
        }
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Edit a field. Its error is cleared until the next validation and a
    /// draft save is scheduled.
    pub fn set_field(&mut self, field: Field, value: &str, now_ms: f64) {
        *self.fields.get_mut(field) = value.to_owned();
        self.errors.remove(&field);
        self.autosave.schedule(now_ms);
    }

    /// Flush the draft if the debounce has elapsed. Returns true if it wrote.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.autosave.fire(now_ms) {
            return false;
        }
        self.save_draft();
        true
    }

    fn save_draft(&mut self) {
        let result = if self.fields.is_empty() {
            self.store.remove(DRAFT_KEY)
        } else {
            match serde_json::to_string(&self.fields) {
                Ok(json) => self.store.save(DRAFT_KEY, &json),
                Err(err) => Err(err.into()),
            }
        };
        if let Err(err) = result {
            log::warn!("could not save contact draft: {}", err);
        }
    }

    /// Validate every field, storing the errors. True when the form is valid.
    pub fn validate(&mut self) -> bool {
        self.errors = validate(&self.fields);
        self.errors.is_empty()
    }

    /// Start a submission: the message to hand to the email service, or the
    /// notification to show instead. A resubmit while sending leaves the
    /// form and its notification untouched.
    pub fn begin_submit(&mut self) -> Result<EmailMessage, Notification> {
        if self.submitting {
            return Err(Notification::Pending(SENDING_MESSAGE.to_owned()));
        }
        if !self.validate() {
            let notification = Notification::Error(INVALID_MESSAGE.to_owned());
            self.notification = Some(notification.clone());
            return Err(notification);
        }
        self.submitting = true;
        self.notification = None;
        Ok(self.fields.to_message())
    }

    pub fn finish_submit(&mut self, result: Result<(), EmailError>) -> Notification {
        self.submitting = false;
        let notification = match result {
            Ok(()) => {
                log::info!("contact message sent");
                self.fields = ContactFields::default();
                self.errors.clear();
                self.autosave.cancel();
                if let Err(err) = self.store.remove(DRAFT_KEY) {
                    log::warn!("could not clear contact draft: {}", err);
                }
                Notification::Success(SUCCESS_MESSAGE.to_owned())
            }
            Err(err) => {
                log::error!("contact message failed: {}", err);
                Notification::Error(FAILURE_MESSAGE.to_owned())
            }
        };
        self.notification = Some(notification.clone());
        notification
    }

    pub async fn submit<E: EmailService>(&mut self, service: &E) -> Notification {
        let message = match self.begin_submit() {
            Ok(message) => message,
            Err(notification) => return notification,
        };
        let result = service.send(&message).await;
        self.finish_submit(result)
    }
}
