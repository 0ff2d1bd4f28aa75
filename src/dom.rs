//! Browser reads and writes the controllers need. Everything touching
//! `web_sys` is compiled for wasm32 only; host builds get inert fallbacks so
//! the controller logic stays testable without a browser.

use crate::chrome::Theme;
use crate::navigation::SectionBounds;
#[cfg(target_arch = "wasm32")]
use crate::reveal::ObserveOptions;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

pub const HEADER_ID: &str = "header";

#[cfg(target_arch = "wasm32")]
fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

#[cfg(target_arch = "wasm32")]
fn html_element(id: &str) -> Option<web_sys::HtmlElement> {
    document()?
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}

#[cfg(target_arch = "wasm32")]
pub fn scroll_y() -> f64 {
    web_sys::window()
        .and_then(|window| window.scroll_y().ok())
        .unwrap_or(0.0)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn scroll_y() -> f64 {
    0.0
}

#[cfg(target_arch = "wasm32")]
pub fn smooth_scroll_to(top: f64) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let options = web_sys::ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn smooth_scroll_to(top: f64) {
    tracing::debug!("dom: scroll to {top} skipped outside the browser");
}

#[cfg(target_arch = "wasm32")]
pub fn section_top(id: &str) -> Option<f64> {
    html_element(id).map(|element| f64::from(element.offset_top()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn section_top(_id: &str) -> Option<f64> {
    None
}

/// Measured height of the fixed header, `None` when it is missing or not laid out.
#[cfg(target_arch = "wasm32")]
pub fn header_height() -> Option<f64> {
    let height = html_element(HEADER_ID)?.offset_height();
    (height > 0).then(|| f64::from(height))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn header_height() -> Option<f64> {
    None
}

/// Every `section[id]` in document order.
#[cfg(target_arch = "wasm32")]
pub fn section_bounds() -> Vec<SectionBounds> {
    let Some(document) = document() else {
        return Vec::new();
    };
    let Ok(nodes) = document.query_selector_all("section[id]") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .map(|element| SectionBounds {
            id: element.id(),
            top: f64::from(element.offset_top()),
            height: f64::from(element.offset_height()),
        })
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn section_bounds() -> Vec<SectionBounds> {
    Vec::new()
}

#[cfg(target_arch = "wasm32")]
pub fn set_scroll_locked(locked: bool) {
    let Some(body) = document().and_then(|document| document.body()) else {
        return;
    };
    let style = body.style();
    if locked {
        let _ = style.set_property("overflow", "hidden");
    } else {
        let _ = style.remove_property("overflow");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_scroll_locked(_locked: bool) {}

#[cfg(target_arch = "wasm32")]
pub fn prefers_dark_scheme() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn prefers_dark_scheme() -> bool {
    false
}

#[cfg(target_arch = "wasm32")]
pub fn apply_theme(theme: Theme) {
    let Some(root) = document().and_then(|document| document.document_element()) else {
        return;
    };
    match theme {
        Theme::Dark => {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        Theme::Light => {
            let _ = root.remove_attribute("data-theme");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn apply_theme(_theme: Theme) {}

#[cfg(target_arch = "wasm32")]
pub fn scroll_into_view(id: &str) {
    let Some(element) = document().and_then(|document| document.get_element_by_id(id)) else {
        return;
    };
    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    options.set_block(web_sys::ScrollLogicalPosition::Nearest);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn scroll_into_view(_id: &str) {}

#[cfg(target_arch = "wasm32")]
pub fn element_exists(id: &str) -> bool {
    document()
        .and_then(|document| document.get_element_by_id(id))
        .is_some()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn element_exists(_id: &str) -> bool {
    false
}

#[cfg(target_arch = "wasm32")]
pub fn count_matching(selector: &str) -> u32 {
    document()
        .and_then(|document| document.query_selector_all(selector).ok())
        .map(|nodes| nodes.length())
        .unwrap_or(0)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn count_matching(_selector: &str) -> u32 {
    0
}

/// True when the event target sits inside any of the elements with the given ids.
#[cfg(target_arch = "wasm32")]
pub fn event_within(event: &web_sys::Event, ids: &[&str]) -> bool {
    let Some(target) = event.target() else {
        return false;
    };
    let Some(node) = target.dyn_ref::<web_sys::Node>() else {
        return false;
    };
    let Some(document) = document() else {
        return false;
    };
    ids.iter()
        .filter_map(|id| document.get_element_by_id(id))
        .any(|container| container.contains(Some(node)))
}

#[cfg(target_arch = "wasm32")]
pub struct ListenerHandle {
    target: web_sys::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

#[cfg(target_arch = "wasm32")]
pub fn listen<F>(
    target: &web_sys::EventTarget,
    event: &'static str,
    handler: F,
) -> Result<ListenerHandle, String>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|_| format!("failed to attach {event} listener"))?;
    Ok(ListenerHandle {
        target: target.clone(),
        event,
        closure,
    })
}

#[cfg(target_arch = "wasm32")]
pub fn window_target() -> Option<web_sys::EventTarget> {
    web_sys::window().map(|window| window.unchecked_into())
}

#[cfg(target_arch = "wasm32")]
pub fn document_target() -> Option<web_sys::EventTarget> {
    document().map(|document| document.unchecked_into())
}

#[cfg(target_arch = "wasm32")]
type ObserverCallback = Closure<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>;

#[cfg(target_arch = "wasm32")]
pub struct ObserverHandle {
    observer: web_sys::IntersectionObserver,
    _closure: Rc<ObserverCallback>,
}

#[cfg(target_arch = "wasm32")]
impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Watches `target` and calls `on_visible` on its first intersection, then
/// stops observing it.
#[cfg(target_arch = "wasm32")]
pub fn observe_once<F>(
    target: &web_sys::Element,
    options: ObserveOptions,
    on_visible: F,
) -> Result<ObserverHandle, String>
where
    F: FnMut() + 'static,
{
    let on_visible = RefCell::new(on_visible);
    let closure = Rc::new(Closure::wrap(Box::new(
        move |entries: js_sys::Array, observer: web_sys::IntersectionObserver| {
            for entry in entries.iter() {
                let entry: web_sys::IntersectionObserverEntry = entry.unchecked_into();
                if !entry.is_intersecting() {
                    continue;
                }
                observer.unobserve(&entry.target());
                let mut callback = on_visible.borrow_mut();
                (*callback)();
            }
        },
    ) as Box<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>));

    let init = web_sys::IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(options.root_margin);
    let observer = web_sys::IntersectionObserver::new_with_options(
        closure.as_ref().as_ref().unchecked_ref(),
        &init,
    )
    .map_err(|_| "intersection observer unavailable".to_string())?;
    observer.observe(target);
    Ok(ObserverHandle {
        observer,
        _closure: closure,
    })
}

/// Calls `step` with the frame timestamp on every animation frame until it
/// returns `false`.
#[cfg(target_arch = "wasm32")]
pub fn run_frames<F>(step: F)
where
    F: FnMut(f64) -> bool + 'static,
{
    let slot = Rc::new(RefCell::new(None));
    schedule_frame(slot, Rc::new(RefCell::new(step)));
}

#[cfg(target_arch = "wasm32")]
fn schedule_frame<F>(
    slot: Rc<RefCell<Option<gloo_render::AnimationFrame>>>,
    step: Rc<RefCell<F>>,
) where
    F: FnMut(f64) -> bool + 'static,
{
    let next_slot = Rc::clone(&slot);
    let handle = gloo_render::request_animation_frame(move |timestamp| {
        let keep_going = {
            let mut step = step.borrow_mut();
            (*step)(timestamp)
        };
        if keep_going {
            schedule_frame(next_slot, step);
        } else {
            next_slot.borrow_mut().take();
        }
    });
    *slot.borrow_mut() = Some(handle);
}

/// Runs `work` on the next animation frame; the returned handle cancels it when dropped.
#[cfg(target_arch = "wasm32")]
pub fn next_frame<F>(work: F) -> gloo_render::AnimationFrame
where
    F: FnOnce() + 'static,
{
    gloo_render::request_animation_frame(move |_| work())
}

