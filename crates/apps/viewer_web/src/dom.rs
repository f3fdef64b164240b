use foundation::ids::ViewToken;
use map_view::event::{ATTR_ACTION, ATTR_VIEW, ATTR_WAYPOINT};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, Element, Event, HtmlElement};

/// A click that landed on (or inside) an element carrying `data-action`.
#[derive(Debug, Clone)]
pub struct ActionClick {
    pub action: String,
    pub view: Option<ViewToken>,
    pub waypoint: Option<String>,
    pub element: Element,
}

impl ActionClick {
    fn from_event(event: &Event) -> Option<Self> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        let element = target.closest(&format!("[{ATTR_ACTION}]")).ok()??;
        let action = element.get_attribute(ATTR_ACTION)?;
        let view = element
            .get_attribute(ATTR_VIEW)
            .and_then(|raw| raw.parse::<ViewToken>().ok());
        let waypoint = element.get_attribute(ATTR_WAYPOINT);
        Some(Self {
            action,
            view,
            waypoint,
            element,
        })
    }
}

/// Click listener delegated to one container. Removed on drop.
pub struct ClickDelegate {
    element: Element,
    closure: Closure<dyn FnMut(Event)>,
}

impl ClickDelegate {
    pub fn install(
        element: &Element,
        mut handler: impl FnMut(ActionClick) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(click) = ActionClick::from_event(&event) {
                handler(click);
            }
        });
        element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        Ok(Self {
            element: element.clone(),
            closure,
        })
    }
}

impl Drop for ClickDelegate {
    fn drop(&mut self) {
        let _ = self
            .element
            .remove_event_listener_with_callback("click", self.closure.as_ref().unchecked_ref());
    }
}

pub fn element_by_id(id: &str) -> Option<HtmlElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlElement>()
        .ok()
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    document.create_element(tag)
}

pub fn user_agent() -> Option<String> {
    web_sys::window()?.navigator().user_agent().ok()
}

/// Fires a `CustomEvent` on `window` so the host page can re-render.
pub fn announce(name: &str, detail: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(detail));
    match CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(event) => {
            let _ = window.dispatch_event(&event);
        }
        Err(err) => tracing::warn!(event = name, ?err, "could not build custom event"),
    }
}
