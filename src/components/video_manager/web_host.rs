// Browser implementations of the controller host traits (wasm only).
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlLinkElement, HtmlVideoElement, Window};

use super::host::{
    is_icon_relation, FillStyle, FullscreenCall, PageError, PageHost, PageResult, Scheduler,
    TimerId, TimerTask, VideoSurface,
};

fn rejected(err: JsValue) -> PageError {
    let reason = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    PageError::Rejected(reason)
}

/// Look up the controlled `<video>` by id.
pub fn find_video(document: &Document, id: &str) -> PageResult<HtmlVideoElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| PageError::MissingElement(id.to_string()))?
        .dyn_into::<HtmlVideoElement>()
        .map_err(|_| PageError::WrongElementType(id.to_string()))
}

#[derive(Clone)]
pub struct WebVideo {
    element: HtmlVideoElement,
}

impl WebVideo {
    pub fn new(element: HtmlVideoElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.element
    }
}

impl VideoSurface for WebVideo {
    fn hide_controls(&self) -> PageResult {
        self.element.set_controls(false);
        self.element.remove_attribute("controls").map_err(rejected)
    }

    fn set_muted(&self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn set_volume(&self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn apply_style(&self, style: &FillStyle) -> PageResult {
        let css = self.element.style();
        for (name, value) in style.declarations() {
            css.set_property(name, value).map_err(rejected)?;
        }
        Ok(())
    }

    fn play(&self) -> PageResult {
        let promise = self.element.play().map_err(rejected)?;
        // Autoplay policy rejections land here; nothing waits on them.
        wasm_bindgen_futures::spawn_local(async move {
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        });
        Ok(())
    }

    fn pause(&self) -> PageResult {
        self.element.pause().map_err(rejected)
    }

    fn request_fullscreen(&self) -> PageResult {
        request_fullscreen_on(self.element.as_ref(), FullscreenCall::Standard)
    }

    fn request_fullscreen_webkit(&self) -> PageResult {
        request_fullscreen_on(self.element.as_ref(), FullscreenCall::Webkit)
    }
}

/// The binding of `requestFullscreen` drops the returned promise, so every
/// variant goes through [`call_method`] to keep refusals out of the console.
fn request_fullscreen_on(target: &JsValue, call: FullscreenCall) -> PageResult {
    let method = call.method();
    let present = js_sys::Reflect::has(target.unchecked_ref(), &method.into()).unwrap_or(false);
    if !present {
        return Err(PageError::Unsupported(method));
    }
    call_method(target, method)
}

/// Invoke a zero-argument method looked up by name, swallowing any returned promise.
fn call_method(target: &JsValue, name: &'static str) -> PageResult {
    let method = js_sys::Reflect::get(target, &name.into()).map_err(rejected)?;
    let Some(method) = method.dyn_ref::<js_sys::Function>() else {
        return Err(PageError::Unsupported(name));
    };
    let returned = method.call0(target).map_err(rejected)?;
    if let Ok(promise) = returned.dyn_into::<js_sys::Promise>() {
        wasm_bindgen_futures::spawn_local(async move {
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn current() -> PageResult<Self> {
        let window = web_sys::window().ok_or(PageError::Unavailable("window"))?;
        let document = window
            .document()
            .ok_or(PageError::Unavailable("document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl PageHost for WebPage {
    fn is_fullscreen(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn request_root_fullscreen(&self) -> PageResult {
        let root = self
            .document
            .document_element()
            .ok_or(PageError::Unavailable("document element"))?;
        request_fullscreen_on(root.as_ref(), FullscreenCall::Standard)
    }

    fn close_window(&self) -> PageResult {
        self.window.close().map_err(rejected)
    }

    fn navigate(&self, url: &str) -> PageResult {
        self.window.location().set_href(url).map_err(rejected)
    }

    fn clear_media_session_metadata(&self) -> PageResult {
        let navigator = self.window.navigator();
        let session = js_sys::Reflect::get(navigator.as_ref(), &"mediaSession".into())
            .map_err(rejected)?;
        if session.is_undefined() || session.is_null() {
            return Err(PageError::Unsupported("navigator.mediaSession"));
        }
        js_sys::Reflect::set(&session, &"metadata".into(), &JsValue::NULL)
            .map_err(rejected)
            .map(|_| ())
    }

    fn replace_icon(&self, href: &str, mime: &str) -> PageResult {
        let head = self.document.head().ok_or(PageError::Unavailable("head"))?;

        let existing = self
            .document
            .query_selector_all("link[rel]")
            .map_err(rejected)?;
        for index in 0..existing.length() {
            let Some(link) = existing
                .item(index)
                .and_then(|node| node.dyn_into::<HtmlLinkElement>().ok())
            else {
                continue;
            };
            if is_icon_relation(&link.rel()) {
                link.remove();
            }
        }

        let link: HtmlLinkElement = self
            .document
            .create_element("link")
            .map_err(rejected)?
            .dyn_into()
            .map_err(|_| PageError::Unsupported("HTMLLinkElement"))?;
        link.set_rel("icon");
        link.set_type(mime);
        link.set_href(href);
        head.append_child(&link).map_err(rejected)?;
        Ok(())
    }
}

type Dispatch = Rc<dyn Fn(TimerId, TimerTask)>;

/// `setTimeout`-backed scheduler. Cancelled ids are dropped from the pending
/// set, so their futures wake up and return without dispatching.
#[derive(Clone, Default)]
pub struct WebScheduler {
    next_id: Rc<RefCell<u64>>,
    pending: Rc<RefCell<HashSet<TimerId>>>,
    dispatch: Rc<RefCell<Option<Dispatch>>>,
}

impl WebScheduler {
    /// Route fired timers to `dispatch`. Timers firing before this is set are dropped.
    pub fn set_dispatch(&self, dispatch: impl Fn(TimerId, TimerTask) + 'static) {
        *self.dispatch.borrow_mut() = Some(Rc::new(dispatch));
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&mut self, delay_ms: u32, task: TimerTask) -> TimerId {
        let id = {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            TimerId(*next)
        };
        self.pending.borrow_mut().insert(id);

        let pending = self.pending.clone();
        let dispatch = self.dispatch.clone();
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            if !pending.borrow_mut().remove(&id) {
                return;
            }
            let callback = dispatch.borrow().clone();
            if let Some(callback) = callback {
                callback(id, task);
            }
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.borrow_mut().remove(&id);
    }
}
