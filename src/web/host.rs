// Browser side of the particle background: media queries, the canvas,
// DOM listeners and requestAnimationFrame.
//
// Listener closures only push into the shared input queue; the frame
// callback drains it. Every closure is kept in `listeners` until removed so
// nothing is leaked with `forget()`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

use crate::error::{js_message, EffectError};
use crate::input::{HostEvent, InputQueue};
use crate::lifecycle::{EventKind, FrameHandle, Host, ListenerId, ListenerTarget};
use crate::pointer::Rect;
use crate::surface::Viewport;
use crate::web::canvas::CanvasSurface;

pub const INTERACTIVE_SELECTOR: &str =
    "a, button, [role=\"button\"], input, textarea, select, [data-magnetic]";

pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Listener {
    target: ListenerTarget,
    kind: EventKind,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct WebHost {
    window: Window,
    document: Document,
    body: HtmlElement,
    canvas_id: String,
    queue: Rc<RefCell<InputQueue>>,
    listeners: HashMap<u32, Listener>,
    next_listener: u32,
    frame_callback: FrameCallback,
}

impl WebHost {
    pub fn new(canvas_id: &str) -> Result<Self, EffectError> {
        let window = web_sys::window().ok_or_else(|| EffectError::Host("no window".to_owned()))?;
        let document = window
            .document()
            .ok_or_else(|| EffectError::Host("no document".to_owned()))?;
        let body = document
            .body()
            .ok_or_else(|| EffectError::Host("no document body".to_owned()))?;
        Ok(WebHost {
            window,
            document,
            body,
            canvas_id: canvas_id.to_owned(),
            queue: Rc::new(RefCell::new(InputQueue::new())),
            listeners: HashMap::new(),
            next_listener: 0,
            frame_callback: Rc::new(RefCell::new(None)),
        })
    }

    /// Slot for the requestAnimationFrame closure. The owner installs it
    /// after wrapping the effect, since the closure has to call back into it.
    pub fn frame_callback(&self) -> FrameCallback {
        self.frame_callback.clone()
    }

    fn matches_media(&self, query: &str) -> bool {
        self.window
            .match_media(query)
            .ok()
            .flatten()
            .map(|list| list.matches())
            .unwrap_or(false)
    }

    fn window_size(window: &Window) -> (f64, f64) {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (width, height)
    }

    fn make_callback(&self, kind: EventKind) -> Closure<dyn FnMut(Event)> {
        let queue = self.queue.clone();
        match kind {
            EventKind::PointerMove | EventKind::PointerEnter => Closure::wrap(Box::new(move |event: Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    let (x, y) = (event.client_x() as f64, event.client_y() as f64);
                    let event = if kind == EventKind::PointerEnter {
                        HostEvent::PointerEnter { x, y }
                    } else {
                        HostEvent::PointerMove { x, y }
                    };
                    queue.borrow_mut().push(event);
                }
            }) as Box<dyn FnMut(Event)>),
            EventKind::PointerLeave => Closure::wrap(Box::new(move |_event: Event| {
                queue.borrow_mut().push(HostEvent::PointerLeave);
            }) as Box<dyn FnMut(Event)>),
            EventKind::Resize => {
                let window = self.window.clone();
                Closure::wrap(Box::new(move |_event: Event| {
                    let (width, height) = WebHost::window_size(&window);
                    queue.borrow_mut().push(HostEvent::Resize { width, height });
                }) as Box<dyn FnMut(Event)>)
            }
        }
    }

    fn target(&self, target: ListenerTarget) -> &web_sys::EventTarget {
        match target {
            ListenerTarget::Window => self.window.as_ref(),
            ListenerTarget::Document => self.body.as_ref(),
        }
    }
}

impl Host for WebHost {
    type Surface = CanvasSurface;

    fn prefers_reduced_motion(&self) -> bool {
        self.matches_media("(prefers-reduced-motion: reduce)")
    }

    fn has_coarse_pointer(&self) -> bool {
        self.matches_media("(pointer: coarse)")
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = WebHost::window_size(&self.window);
        Viewport::new(width, height)
    }

    fn acquire_surface(&mut self, _viewport: Viewport) -> Result<CanvasSurface, EffectError> {
        let id = &self.canvas_id;
        let canvas = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| EffectError::SurfaceUnavailable(format!("no element #{}", id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EffectError::SurfaceUnavailable(format!("#{} is not a canvas", id)))?;
        CanvasSurface::new(canvas, self.window.device_pixel_ratio())
    }

    fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EffectError> {
        let callback = self.make_callback(kind);
        let target = kind.target();
        self.target(target)
            .add_event_listener_with_callback(kind.dom_name(), callback.as_ref().unchecked_ref())
            .map_err(|e| EffectError::Host(js_message(&e)))?;

        self.next_listener += 1;
        let id = self.next_listener;
        self.listeners.insert(id, Listener { target, kind, callback });
        Ok(ListenerId(id))
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if let Some(listener) = self.listeners.remove(&id.0) {
            let _ = self.target(listener.target).remove_event_listener_with_callback(
                listener.kind.dom_name(),
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }

    fn request_frame(&mut self) -> Result<FrameHandle, EffectError> {
        let callback = self.frame_callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| EffectError::Host("frame callback not installed".to_owned()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(|e| EffectError::Host(js_message(&e)))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }

    fn drain_events(&mut self) -> Vec<HostEvent> {
        self.queue.borrow_mut().drain()
    }

    fn interactive_rects(&self) -> Vec<Rect> {
        let nodes = match self.document.query_selector_all(INTERACTIVE_SELECTOR) {
            Ok(nodes) => nodes,
            Err(_) => return Vec::new(),
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
            })
            .filter(|rect| rect.width > 0.0 && rect.height > 0.0)
            .collect()
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        let ids: Vec<u32> = self.listeners.keys().copied().collect();
        for id in ids {
            self.remove_listener(ListenerId(id));
        }
        self.queue.borrow_mut().clear();
    }
}
