//! DOM host: mounts the mascot element, wires input listeners and drives the
//! controller from a `requestAnimationFrame` loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, Window, window};

use super::audio::WebTones;
use super::storage::LocalStore;
use crate::capabilities::SeededRandom;
use crate::config::MascotConfig;
use crate::error::MascotError;
use crate::feed::{ConfigPublisher, config_channel};
use crate::mascot::{InteractionOutcome, MascotController};

const ELEMENT_ID: &str = "cupid-mascot";

type WebController = MascotController<LocalStore, WebTones, SeededRandom>;
type Shared = Rc<RefCell<WebController>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn viewport_of(win: &Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

fn paint(element: &HtmlElement, controller: &WebController) {
    let d = controller.render();
    element.set_class_name(&d.class_name());
    if let Err(err) = element.set_attribute("style", &d.style) {
        log::debug!("{}", MascotError::dom(err));
    }
    let hidden = if d.visible { "false" } else { "true" };
    let _ = element.set_attribute("aria-hidden", hidden);
}

/// Feed the box's on-screen center to the controller, so proximity checks see
/// where a CSS transition currently has it rather than where it is headed.
fn report_rendered_center(element: &HtmlElement, controller: &mut WebController) {
    let rect = element.get_bounding_client_rect();
    if rect.width() > 0.0 && rect.height() > 0.0 {
        controller.set_rendered_center(
            rect.left() + rect.width() / 2.0,
            rect.top() + rect.height() / 2.0,
        );
    }
}

/// Event listener kept alive for the lifetime of the handle and removed on unmount.
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, MascotError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(MascotError::dom)?;
        Ok(Self { target, event, closure })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Animation-frame loop. The callback holds a clone of its own slot; `cancel`
/// clears the slot to break the cycle.
struct FrameLoop {
    alive: Rc<Cell<bool>>,
    request_id: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl FrameLoop {
    fn start(win: &Window, controller: Shared, element: HtmlElement) -> Result<Self, MascotError> {
        let alive = Rc::new(Cell::new(true));
        let request_id = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let slot = callback.clone();
        let alive_cb = alive.clone();
        let request_cb = request_id.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            if !alive_cb.get() {
                return;
            }
            {
                let mut c = controller.borrow_mut();
                if c.state().visible {
                    report_rendered_center(&element, &mut c);
                }
                c.tick(now_ms());
                paint(&element, &c);
            }
            if let (Some(w), Some(cb)) = (window(), slot.borrow().as_ref()) {
                match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => request_cb.set(Some(id)),
                    Err(err) => log::warn!("frame loop stopped: {}", MascotError::dom(err)),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let first = callback
            .borrow()
            .as_ref()
            .map(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()))
            .transpose()
            .map_err(MascotError::dom)?;
        request_id.set(first);
        Ok(Self { alive, request_id, callback })
    }

    fn cancel(&self) {
        self.alive.set(false);
        if let (Some(w), Some(id)) = (window(), self.request_id.take()) {
            let _ = w.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

/// A mounted mascot. Dropping the handle (or calling `unmount`) removes the
/// element, detaches listeners, stops the frame loop and closes the config feed.
#[wasm_bindgen]
pub struct MascotHandle {
    controller: Shared,
    element: HtmlElement,
    publisher: Option<ConfigPublisher>,
    unsubscribe: Option<js_sys::Function>,
    listeners: Vec<Listener>,
    frames: Option<FrameLoop>,
}

/// Mount the mascot. `config_json` is the result of the initial config read;
/// pass `null` / `undefined` when the read failed or found nothing.
#[wasm_bindgen]
pub fn mount_mascot(config_json: Option<String>) -> Result<MascotHandle, JsValue> {
    Ok(mount(config_json.as_deref())?)
}

fn mount(config_json: Option<&str>) -> Result<MascotHandle, MascotError> {
    let win = window().ok_or(MascotError::NoWindow)?;
    let doc = win
        .document()
        .ok_or_else(|| MascotError::Dom("no document".to_owned()))?;
    let body = doc
        .body()
        .ok_or_else(|| MascotError::Dom("no body".to_owned()))?;

    // Reuse a leftover element from a previous mount instead of stacking copies.
    let element: HtmlElement = match doc.get_element_by_id(ELEMENT_ID) {
        Some(el) => el
            .dyn_into()
            .map_err(|_| MascotError::Dom("mascot element is not an HtmlElement".to_owned()))?,
        None => {
            let el: HtmlElement = doc
                .create_element("div")
                .map_err(MascotError::dom)?
                .dyn_into()
                .map_err(|_| MascotError::Dom("div is not an HtmlElement".to_owned()))?;
            el.set_id(ELEMENT_ID);
            body.append_child(&el).map_err(MascotError::dom)?;
            el
        }
    };
    element.set_attribute("role", "button").map_err(MascotError::dom)?;
    element.set_attribute("aria-label", "Catch Cupid").map_err(MascotError::dom)?;
    element.set_tab_index(0);

    let config = MascotConfig::from_remote(config_json);
    let (publisher, feed) = config_channel();
    let mut controller = MascotController::new(
        config,
        LocalStore::open(&win),
        WebTones::default(),
        SeededRandom::from_entropy(),
    );
    controller.attach_feed(feed);
    let (w, h) = viewport_of(&win);
    controller.set_viewport(w, h);
    controller.start(now_ms());
    paint(&element, &controller);
    let controller: Shared = Rc::new(RefCell::new(controller));

    let mut handle = MascotHandle {
        controller: controller.clone(),
        element: element.clone(),
        publisher: Some(publisher),
        unsubscribe: None,
        listeners: Vec::new(),
        frames: None,
    };
    // On any wiring failure the handle drops here and tears down what was attached.
    handle.wire_listeners(&win)?;
    handle.frames = Some(FrameLoop::start(&win, controller, element)?);
    log::info!("mascot mounted");
    Ok(handle)
}

impl MascotHandle {
    fn wire_listeners(&mut self, win: &Window) -> Result<(), MascotError> {
        let win_target: EventTarget = win.clone().into();
        let el_target: EventTarget = self.element.clone().into();

        let c = self.controller.clone();
        self.listeners.push(Listener::attach(win_target.clone(), "pointermove", move |ev| {
            if let Some(m) = ev.dyn_ref::<MouseEvent>() {
                c.borrow_mut().pointer_moved(m.client_x() as f64, m.client_y() as f64);
            }
        })?);

        let c = self.controller.clone();
        self.listeners.push(Listener::attach(win_target.clone(), "blur", move |_| {
            c.borrow_mut().pointer_left();
        })?);

        // pointerleave on the root element fires when the pointer exits the viewport
        if let Some(root) = win.document().and_then(|d| d.document_element()) {
            let c = self.controller.clone();
            self.listeners.push(Listener::attach(root.into(), "pointerleave", move |_| {
                c.borrow_mut().pointer_left();
            })?);
        }

        let c = self.controller.clone();
        self.listeners.push(Listener::attach(win_target, "resize", move |_| {
            if let Some(w) = window() {
                let (width, height) = viewport_of(&w);
                c.borrow_mut().set_viewport(width, height);
            }
        })?);

        let c = self.controller.clone();
        let el = self.element.clone();
        self.listeners.push(Listener::attach(el_target.clone(), "click", move |_| {
            let mut ctl = c.borrow_mut();
            let outcome = ctl.activate(now_ms());
            log::debug!("click -> {outcome:?}");
            paint(&el, &ctl);
        })?);

        let c = self.controller.clone();
        let el = self.element.clone();
        self.listeners.push(Listener::attach(el_target, "keydown", move |ev| {
            let Some(k) = ev.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let mut ctl = c.borrow_mut();
            if let Some(outcome) = ctl.key_activated(&k.key(), now_ms()) {
                ev.prevent_default();
                if outcome != InteractionOutcome::Ignored {
                    paint(&el, &ctl);
                }
            }
        })?);
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(frames) = self.frames.take() {
            frames.cancel();
        }
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        self.publisher = None;
        if let Some(unsubscribe) = self.unsubscribe.take() {
            if let Err(err) = unsubscribe.call0(&JsValue::NULL) {
                log::warn!("config unsubscribe failed: {}", MascotError::dom(err));
            }
        }
        self.controller.borrow_mut().stop();
        self.element.remove();
    }
}

#[wasm_bindgen]
impl MascotHandle {
    /// Forward a realtime config payload (same shape as the initial record).
    pub fn push_config(&self, payload: &str) -> bool {
        self.publisher
            .as_ref()
            .is_some_and(|p| p.publish(payload))
    }

    /// The realtime subscription dropped. The mascot keeps its last config.
    pub fn subscription_closed(&mut self) {
        self.publisher = None;
    }

    /// Callback invoked on unmount to release the realtime subscription.
    pub fn set_unsubscribe(&mut self, unsubscribe: js_sys::Function) {
        self.unsubscribe = Some(unsubscribe);
    }

    pub fn is_caught(&self) -> bool {
        self.controller.borrow().state().caught
    }

    pub fn is_visible(&self) -> bool {
        self.controller.borrow().state().visible
    }

    /// Whether a pointer position is currently being evaded.
    pub fn is_tracking_pointer(&self) -> bool {
        self.controller.borrow().has_pointer()
    }

    pub fn reset(&self) {
        let mut c = self.controller.borrow_mut();
        c.reset_caught(now_ms());
        paint(&self.element, &c);
    }

    pub fn hide_for(&self, duration_ms: f64) -> bool {
        let mut c = self.controller.borrow_mut();
        let hidden = c.hide_for(duration_ms, now_ms());
        paint(&self.element, &c);
        hidden
    }

    pub fn unmount(&mut self) {
        self.teardown();
        log::info!("mascot unmounted");
    }
}

impl Drop for MascotHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}
