use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn, Level};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::geo::LngLat;
use foundation::ids::{TokenSource, ViewToken};
use gateway::{GatewayConfig, ImageUpload, ListOrder, RestGateway, WaypointGateway, WaypointId};
use map_view::{CameraTarget, MapEvent, ViewEffect, WaypointMapView};
use runtime::event_bus::EventBus;
use runtime::sequence::RequestToken;
use screens::{detail, list, AddWaypointForm, DetailOverlay, MobileAdvisory, Notice, Route, WaypointList};

mod dom;
mod logging;
mod mapbox;
use dom::{ActionClick, ClickDelegate};
use mapbox::{LocationPicker, MapboxRenderer};

/// Fired on `window` whenever the map's detail overlay opens or closes.
const EVENT_MAP_SELECTION: &str = "waypoints:map-selection";
const EVENT_LIST_SELECTION: &str = "waypoints:list-selection";
const EVENT_LIST_LOADED: &str = "waypoints:list-loaded";
const EVENT_PARAMETERS_LOADED: &str = "waypoints:parameters-loaded";
const EVENT_LOCATION_PICKED: &str = "waypoints:location-picked";
const EVENT_NOTICE: &str = "waypoints:notice";

struct MountedMap {
    view: WaypointMapView<MapboxRenderer>,
    _clicks: Option<ClickDelegate>,
}

#[derive(Default)]
struct AppState {
    gateway: Option<Rc<RestGateway>>,
    tokens: TokenSource,
    bus: EventBus<MapEvent>,
    map: Option<MountedMap>,
    map_detail: Option<DetailOverlay>,
    list: WaypointList,
    list_detail: Option<DetailOverlay>,
    form: AddWaypointForm,
    picker: Option<LocationPicker>,
    advisory: Option<MobileAdvisory>,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

fn with_state<T>(f: impl FnOnce(&mut AppState) -> T) -> T {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

fn gateway() -> Result<Rc<RestGateway>, JsValue> {
    with_state(|s| s.gateway.clone()).ok_or_else(|| JsValue::from_str("call init() first"))
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    logging::init(Level::DEBUG);
    Ok(())
}

/// Configures the backend and the map library.
///
/// `config_json` is a serialized `GatewayConfig`.
#[wasm_bindgen]
pub fn init(config_json: &str, map_access_token: &str) -> Result<(), JsValue> {
    let config = GatewayConfig::from_json(config_json).map_err(js_err)?;
    mapbox::set_access_token(map_access_token)?;
    let advisory = dom::user_agent()
        .map(|ua| MobileAdvisory::for_user_agent(&ua))
        .unwrap_or_else(|| MobileAdvisory::for_user_agent(""));
    info!(base = config.base(), "waypoints app configured");
    with_state(|s| {
        s.gateway = Some(Rc::new(RestGateway::new(config)));
        s.advisory = Some(advisory);
    });
    Ok(())
}

// ---- map screen ----

/// Mounts the map view into `container_id` and starts the first fetch.
///
/// Neither a missing container nor a widget that fails to start is an error:
/// the view mounts without a widget and nothing is drawn.
#[wasm_bindgen]
pub fn mount_map(container_id: &str) {
    unmount_map();
    let token = with_state(|s| s.tokens.next_view());
    let renderer = MapboxRenderer::attach(
        container_id,
        token,
        CameraTarget::initial(),
        Default::default(),
    );
    let clicks = renderer
        .as_ref()
        .and_then(|_| dom::element_by_id(container_id))
        .and_then(|container| match ClickDelegate::install(&container, on_map_click) {
            Ok(clicks) => Some(clicks),
            Err(err) => {
                warn!(container = container_id, ?err, "map click delegation unavailable");
                None
            }
        });
    let request = with_state(|s| {
        let mut view = WaypointMapView::initialize(token, renderer, &mut s.bus);
        let request = view.begin_fetch();
        s.map = Some(MountedMap {
            view,
            _clicks: clicks,
        });
        request
    });
    spawn_map_fetch(token, request);
}

#[wasm_bindgen]
pub fn unmount_map() {
    let mounted = with_state(|s| {
        let mut mounted = s.map.take()?;
        mounted.view.teardown(&mut s.bus);
        s.map_detail = None;
        Some(mounted)
    });
    // Dropped outside the borrow; the listener removal calls into JS.
    drop(mounted);
}

/// Switches basemap and returns the glyph the toggle control should show.
#[wasm_bindgen]
pub fn toggle_map_style() -> Option<String> {
    with_state(|s| {
        let view = &mut s.map.as_mut()?.view;
        Some(view.toggle_style().toggle_glyph().to_string())
    })
}

#[wasm_bindgen]
pub fn map_style_glyph() -> String {
    with_state(|s| {
        s.map
            .as_ref()
            .map(|m| m.view.style())
            .unwrap_or_default()
            .toggle_glyph()
            .to_string()
    })
}

#[wasm_bindgen]
pub fn map_detail_html() -> Option<String> {
    with_state(|s| s.map_detail.as_ref().map(DetailOverlay::render))
}

#[wasm_bindgen]
pub fn close_map_detail() {
    let closed = with_state(|s| {
        if let Some(m) = s.map.as_mut() {
            m.view.close_detail();
        }
        s.map_detail.take()
    });
    if let Some(overlay) = closed {
        overlay.close(|w| debug!(id = %w.id, "map detail closed"));
        dom::announce(EVENT_MAP_SELECTION, "");
    }
}

#[wasm_bindgen]
pub fn toggle_map_favorite() -> bool {
    with_state(|s| s.map_detail.as_mut().is_some_and(DetailOverlay::toggle_favorite))
}

fn on_map_click(click: ActionClick) {
    let (Some(view), Some(id)) = (click.view, click.waypoint.as_deref()) else {
        return;
    };
    if let Some(event) = MapEvent::from_action(&click.action, id) {
        dispatch_map_event(view, event);
    }
}

/// Queues `event` for the view owning `token` and lets that view react.
///
/// Runs on the next microtask, after any borrow of the app state held by the
/// caller has been released.
pub(crate) fn dispatch_map_event(token: ViewToken, event: MapEvent) {
    spawn_local(async move {
        let accepted = with_state(|s| s.bus.emit(token, event));
        if accepted {
            pump_map();
        }
    });
}

fn pump_map() {
    let pumped = with_state(|s| {
        let mounted = s.map.as_mut()?;
        let effects = mounted.view.pump(&mut s.bus);
        Some((mounted.view.token(), effects))
    });
    let Some((token, effects)) = pumped else {
        return;
    };
    for effect in effects {
        match effect {
            ViewEffect::Fetch(request) => spawn_map_fetch(token, request),
            ViewEffect::SelectionChanged => {
                let selected = with_state(|s| {
                    let waypoint = s.map.as_ref()?.view.selected()?.clone();
                    let id = waypoint.id.to_string();
                    s.map_detail = Some(DetailOverlay::new(waypoint));
                    Some(id)
                });
                if let Some(id) = selected {
                    dom::announce(EVENT_MAP_SELECTION, &id);
                }
            }
        }
    }
}

fn spawn_map_fetch(token: ViewToken, request: RequestToken) {
    let gateway = match gateway() {
        Ok(g) => g,
        Err(_) => {
            warn!(view = %token, "gateway not configured; skipping fetch");
            return;
        }
    };
    spawn_local(async move {
        let result = gateway.list_waypoints(ListOrder::Unspecified).await;
        with_state(|s| match s.map.as_mut() {
            Some(m) if m.view.token() == token => {
                m.view.complete_fetch(request, result);
            }
            _ => debug!(view = %token, "map view gone; dropping fetch result"),
        });
    });
}

// ---- list screen ----

#[wasm_bindgen]
pub fn load_list() -> Result<(), JsValue> {
    let gateway = gateway()?;
    let request = with_state(|s| s.list.begin_load());
    spawn_local(async move {
        let result = gateway.list_waypoints(ListOrder::NewestFirst).await;
        if with_state(|s| s.list.complete_load(request, result)) {
            dom::announce(EVENT_LIST_LOADED, "");
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn set_list_search(term: &str) -> String {
    with_state(|s| {
        s.list.set_search(term);
        s.list.render()
    })
}

#[wasm_bindgen]
pub fn list_html() -> String {
    with_state(|s| s.list.render())
}

/// Handles a click inside the list markup. Returns `true` if a card was selected.
#[wasm_bindgen]
pub fn list_click(action: &str, waypoint_id: &str) -> bool {
    if action != list::ACTION_SELECT {
        return false;
    }
    let selected = with_state(|s| {
        if !s.list.select(&WaypointId::new(waypoint_id)) {
            return false;
        }
        s.list_detail = s.list.selected().cloned().map(DetailOverlay::new);
        true
    });
    if selected {
        dom::announce(EVENT_LIST_SELECTION, waypoint_id);
    }
    selected
}

#[wasm_bindgen]
pub fn list_detail_html() -> Option<String> {
    with_state(|s| s.list_detail.as_ref().map(DetailOverlay::render))
}

#[wasm_bindgen]
pub fn close_list_detail() {
    let closed = with_state(|s| {
        s.list.clear_selection();
        s.list_detail.take()
    });
    if let Some(overlay) = closed {
        overlay.close(|w| debug!(id = %w.id, "list detail closed"));
        dom::announce(EVENT_LIST_SELECTION, "");
    }
}

#[wasm_bindgen]
pub fn toggle_list_favorite() -> bool {
    with_state(|s| s.list_detail.as_mut().is_some_and(DetailOverlay::toggle_favorite))
}

/// Routes a detail-overlay action (`close` / `favorite`) for either screen.
#[wasm_bindgen]
pub fn detail_action(screen: &str, action: &str) -> Result<(), JsValue> {
    match (screen, action) {
        ("map", detail::ACTION_CLOSE) => close_map_detail(),
        ("map", detail::ACTION_FAVORITE) => {
            toggle_map_favorite();
        }
        ("list", detail::ACTION_CLOSE) => close_list_detail(),
        ("list", detail::ACTION_FAVORITE) => {
            toggle_list_favorite();
        }
        _ => return Err(JsValue::from_str(&format!("unknown detail action {screen}/{action}"))),
    }
    Ok(())
}

// ---- add form ----

/// Returns `false` if the picker could not be shown; the form still accepts
/// coordinates through `set_form_location`.
#[wasm_bindgen]
pub fn mount_form_map(container_id: &str) -> bool {
    unmount_form_map();
    let picker = LocationPicker::attach(container_id, |position| {
        with_state(|s| s.form.pick_location(position));
        dom::announce(
            EVENT_LOCATION_PICKED,
            &format!("{},{}", position.lng, position.lat),
        );
    });
    let mounted = picker.is_some();
    with_state(|s| s.picker = picker);
    mounted
}

#[wasm_bindgen]
pub fn unmount_form_map() {
    let picker = with_state(|s| s.picker.take());
    drop(picker);
}

#[wasm_bindgen]
pub fn load_parameters() -> Result<(), JsValue> {
    let gateway = gateway()?;
    spawn_local(async move {
        let result = AddWaypointForm::fetch_parameters(&*gateway).await;
        if with_state(|s| s.form.apply_parameters(result)) {
            dom::announce(EVENT_PARAMETERS_LOADED, "");
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn set_form_field(field: &str, value: &str) -> Result<(), JsValue> {
    with_state(|s| {
        let form = &mut s.form;
        let slot = match field {
            "name" => &mut form.name,
            "description" => &mut form.description,
            "address" => &mut form.address,
            "contact_info" => &mut form.contact_info,
            other => return Err(JsValue::from_str(&format!("unknown form field {other}"))),
        };
        *slot = value.to_string();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn set_form_rating(stars: u8) -> Result<(), JsValue> {
    with_state(|s| s.form.set_rating(stars)).map_err(js_err)
}

#[wasm_bindgen]
pub fn set_form_location(lng: f64, lat: f64) {
    with_state(|s| s.form.pick_location(LngLat::new(lng, lat)));
}

#[wasm_bindgen]
pub fn toggle_form_parameter(name: &str) -> bool {
    with_state(|s| s.form.toggle_parameter(name))
}

#[wasm_bindgen]
pub fn form_parameters_html() -> String {
    with_state(|s| s.form.render_parameters())
}

#[wasm_bindgen]
pub fn add_form_image(file_name: &str, bytes: Vec<u8>) -> usize {
    with_state(|s| {
        s.form.add_image(ImageUpload::new(file_name, bytes));
        s.form.images().len()
    })
}

#[wasm_bindgen]
pub fn remove_form_image(index: usize) -> bool {
    with_state(|s| s.form.remove_image(index).is_some())
}

/// Validates and saves the form. The outcome arrives as a `waypoints:notice`
/// event whose detail is `{"kind": "success"|"error", "text": ...}`.
///
/// The form stays in place and editable while the save runs; a second submit
/// before it finishes is answered with an error notice.
#[wasm_bindgen]
pub fn submit_form() -> Result<(), JsValue> {
    let gateway = gateway()?;
    let pending = match with_state(|s| s.form.begin_submit()) {
        Ok(pending) => pending,
        Err(err) => {
            announce_notice(&Notice::from_submit(&Err(err)));
            return Ok(());
        }
    };
    spawn_local(async move {
        let result = pending.send(&*gateway).await;
        with_state(|s| s.form.finish_submit(&result));
        announce_notice(&Notice::from_submit(&result));
    });
    Ok(())
}

fn announce_notice(notice: &Notice) {
    let kind = if notice.is_error() { "error" } else { "success" };
    let detail = serde_json::json!({ "kind": kind, "text": notice.text() });
    dom::announce(EVENT_NOTICE, &detail.to_string());
}

// ---- chrome ----

#[wasm_bindgen]
pub fn nav_html(path: &str) -> String {
    screens::nav::render(Route::from_path(path))
}

#[wasm_bindgen]
pub fn advisory_html() -> Option<String> {
    with_state(|s| s.advisory.as_ref().and_then(MobileAdvisory::render))
}

#[wasm_bindgen]
pub fn dismiss_advisory() {
    with_state(|s| {
        if let Some(advisory) = s.advisory.as_mut() {
            advisory.dismiss();
        }
    });
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    // The test page does not load mapbox-gl, so every widget constructor throws.
    fn add_container(id: &str) {
        let body = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .unwrap();
        body.insert_adjacent_html("beforeend", &format!("<div id=\"{id}\"></div>"))
            .unwrap();
    }

    #[wasm_bindgen_test]
    fn attach_without_container_renders_nothing() {
        let renderer =
            MapboxRenderer::attach("nowhere", ViewToken::new(1), CameraTarget::initial(), Default::default());
        assert!(renderer.is_none());
    }

    #[wasm_bindgen_test]
    fn widget_that_throws_on_start_renders_nothing() {
        add_container("map-throws");
        let renderer =
            MapboxRenderer::attach("map-throws", ViewToken::new(2), CameraTarget::initial(), Default::default());
        assert!(renderer.is_none());
        assert!(LocationPicker::attach("map-throws", |_| {}).is_none());
    }

    #[wasm_bindgen_test]
    fn mount_map_survives_widget_failure() {
        add_container("map-mount");
        mount_map("map-mount");
        let mounted = with_state(|s| s.map.as_ref().map(|m| (m.view.is_mounted(), m.view.renderer().is_none())));
        assert_eq!(mounted, Some((true, true)));
        assert_eq!(toggle_map_style().as_deref(), Some(map_view::BasemapStyle::SatelliteStreets.toggle_glyph()));

        unmount_map();
        assert!(with_state(|s| s.map.is_none()));
        assert!(!mount_form_map("map-mount"));
    }
}

