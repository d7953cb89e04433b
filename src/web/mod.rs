// JavaScript-facing exports and the browser implementations behind them.

pub mod canvas;
pub mod email;
pub mod host;
pub mod storage;
pub mod timer;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::assets::{self, ImageState};
use crate::config::{EffectConfig, Theme};
use crate::contact::{ContactForm, Field, Notification};
use crate::email::{EmailJsConfig, EmailService};
use crate::lifecycle::{Activation, ParticleEffect};

use self::email::EmailJsClient;
use self::host::WebHost;
use self::storage::LocalDraftStore;
use self::timer::Timer;

/// The decorative background. Create it with `mount`, drop it with
/// `unmount` (or `free()`); either way every listener and the frame loop go
/// away with it. `mount` never throws: anything that keeps the effect from
/// starting leaves an inert background.
#[wasm_bindgen]
pub struct ParticleBackground {
    effect: Option<Rc<RefCell<ParticleEffect<WebHost>>>>,
}

#[wasm_bindgen]
impl ParticleBackground {
    /// Attach to the `<canvas id=canvas_id>` element. `config_json` may be
    /// empty.
    pub fn mount(canvas_id: &str, config_json: &str) -> ParticleBackground {
        let config = match EffectConfig::from_json(config_json) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("bad particle config, using defaults: {}", err);
                EffectConfig::default()
            }
        };
        let host = match WebHost::new(canvas_id) {
            Ok(host) => host,
            Err(err) => {
                log::info!("particle background inert: {}", err);
                return ParticleBackground { effect: None };
            }
        };
        let profile = config.profile;
        let frame_callback = host.frame_callback();
        let effect = Rc::new(RefCell::new(ParticleEffect::new(host, config)));

        // Weak, or the closure stored inside the host would keep the effect alive forever
        let weak = Rc::downgrade(&effect);
        *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let effect = match weak.upgrade() {
                Some(effect) => effect,
                None => return,
            };
            let _timer = if profile { Some(Timer::new("particle frame")) } else { None };
            let mut effect = effect.borrow_mut();
            if let Err(err) = effect.frame(timestamp) {
                log::warn!("particle frame failed, stopping: {}", err);
                effect.deactivate();
            }
        }) as Box<dyn FnMut(f64)>));

        // Failed activation has already released whatever it acquired
        let activation = effect.borrow_mut().activate();
        match activation {
            Ok(Activation::Running) => {}
            Ok(Activation::OptedOut(reason)) => log::info!("particle background inert: {:?}", reason),
            Err(err) => log::warn!("particle background failed to start: {}", err),
        }
        ParticleBackground { effect: Some(effect) }
    }

    pub fn unmount(&self) {
        if let Some(effect) = &self.effect {
            effect.borrow_mut().deactivate();
        }
    }

    /// `"dark"` or `"light"`; anything else is ignored.
    pub fn set_theme(&self, name: &str) {
        let theme = match Theme::from_name(name) {
            Some(theme) => theme,
            None => {
                log::warn!("unknown theme {:?}", name);
                return;
            }
        };
        if let Some(effect) = &self.effect {
            effect.borrow_mut().set_theme(theme);
        }
    }

    pub fn is_running(&self) -> bool {
        self.effect
            .as_ref()
            .map(|effect| effect.borrow().is_running())
            .unwrap_or(false)
    }

    pub fn particle_count(&self) -> usize {
        self.effect
            .as_ref()
            .and_then(|effect| effect.borrow().field().map(|field| field.particles().len()))
            .unwrap_or(0)
    }

    pub fn pointer_over_interactive(&self) -> bool {
        self.effect
            .as_ref()
            .map(|effect| effect.borrow().over_interactive())
            .unwrap_or(false)
    }
}

/// Contact form state for the page's form markup.
#[wasm_bindgen]
pub struct ContactFormHandle {
    form: Rc<RefCell<ContactForm<LocalDraftStore>>>,
    client: Rc<EmailJsClient>,
}

#[wasm_bindgen]
impl ContactFormHandle {
    /// `email_config_json` holds `service_id`, `template_id` and
    /// `public_key`; when empty the build-time environment is used.
    #[wasm_bindgen(constructor)]
    pub fn new(email_config_json: &str) -> Result<ContactFormHandle, JsValue> {
        let config = if email_config_json.trim().is_empty() {
            EmailJsConfig::from_env()?
        } else {
            EmailJsConfig::from_json(email_config_json)?
        };
        Ok(ContactFormHandle {
            form: Rc::new(RefCell::new(ContactForm::new(LocalDraftStore::new()))),
            client: Rc::new(EmailJsClient::new(config)),
        })
    }

    pub fn set_field(&self, name: &str, value: &str) -> Result<(), JsValue> {
        let field = parse_field(name)?;
        self.form.borrow_mut().set_field(field, value, js_sys::Date::now());
        Ok(())
    }

    pub fn field(&self, name: &str) -> Result<String, JsValue> {
        let field = parse_field(name)?;
        Ok(self.form.borrow().fields().get(field).to_owned())
    }

    /// Call from a timer; writes the draft once the debounce has elapsed.
    pub fn tick(&self) -> bool {
        self.form.borrow_mut().tick(js_sys::Date::now())
    }

    /// JSON object of field name to error message.
    pub fn errors(&self) -> String {
        let form = self.form.borrow();
        let errors: serde_json::Map<String, serde_json::Value> = form
            .errors()
            .iter()
            .map(|(field, err)| (field.as_str().to_owned(), err.to_string().into()))
            .collect();
        serde_json::Value::Object(errors).to_string()
    }

    pub fn is_submitting(&self) -> bool {
        self.form.borrow().is_submitting()
    }

    /// Resolves to `{"kind": "success" | "error" | "pending", "text": ...}`.
    pub fn submit(&self) -> js_sys::Promise {
        let form = self.form.clone();
        let client = self.client.clone();
        future_to_promise(async move {
            let started = form.borrow_mut().begin_submit();
            let notification = match started {
                Ok(message) => {
                    let result = client.send(&message).await;
                    form.borrow_mut().finish_submit(result)
                }
                Err(notification) => notification,
            };
            Ok(JsValue::from_str(&notification_json(&notification)))
        })
    }
}

/// Load state of one `<img>`: point its `src` at `display_src()` and forward
/// the element's `load`/`error` events.
#[wasm_bindgen]
pub struct ImageHandle {
    state: ImageState,
}

#[wasm_bindgen]
impl ImageHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(src: &str) -> ImageHandle {
        ImageHandle { state: ImageState::new(src) }
    }

    pub fn on_load(&mut self) {
        self.state.on_load();
    }

    pub fn on_error(&mut self) {
        self.state.on_error();
    }

    pub fn display_src(&self) -> String {
        self.state.display_src().to_owned()
    }

    pub fn failed(&self) -> bool {
        self.state == ImageState::Failed
    }
}

#[wasm_bindgen]
pub fn drive_thumbnail(url: &str, width: u32) -> String {
    assets::drive_thumbnail_url(url, width)
}

#[wasm_bindgen]
pub fn drive_download(url: &str) -> String {
    assets::drive_download_url(url)
}

fn parse_field(name: &str) -> Result<Field, JsValue> {
    Field::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown field {:?}", name)))
}

fn notification_json(notification: &Notification) -> String {
    let kind = match notification {
        Notification::Success(_) => "success",
        Notification::Error(_) => "error",
        Notification::Pending(_) => "pending",
    };
    serde_json::json!({ "kind": kind, "text": notification.text() }).to_string()
}
