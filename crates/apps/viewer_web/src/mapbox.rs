//! mapbox-gl bindings and the [`MapRenderer`] built on them.
//!
//! The library is expected as the `mapboxgl` global, loaded by the host page.

use std::collections::BTreeMap;

use foundation::geo::LngLat;
use foundation::ids::ViewToken;
use map_view::camera::CameraTarget;
use map_view::event::MapEvent;
use map_view::renderer::{MapRenderer, MarkerHandle, MarkerSpec};
use map_view::style::BasemapStyle;
use serde_json::json;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom;

pub const POPUP_OFFSET: u32 = 25;

#[wasm_bindgen(js_namespace = mapboxgl)]
extern "C" {
    #[wasm_bindgen(js_name = Map)]
    #[derive(Clone)]
    pub type MapboxMap;

    #[wasm_bindgen(catch, constructor, js_class = "Map")]
    fn new(options: &JsValue) -> Result<MapboxMap, JsValue>;

    #[wasm_bindgen(method, js_class = "Map", js_name = flyTo)]
    fn fly_to(this: &MapboxMap, options: &JsValue);

    #[wasm_bindgen(method, js_class = "Map", js_name = setStyle)]
    fn set_style(this: &MapboxMap, style: &str);

    #[wasm_bindgen(method, js_class = "Map")]
    fn once(this: &MapboxMap, event: &str, listener: &JsValue);

    #[wasm_bindgen(method, js_class = "Map")]
    fn on(this: &MapboxMap, event: &str, listener: &JsValue);

    #[wasm_bindgen(method, js_class = "Map")]
    fn off(this: &MapboxMap, event: &str, listener: &JsValue);

    #[wasm_bindgen(method, js_class = "Map")]
    fn remove(this: &MapboxMap);

    #[wasm_bindgen(js_name = Marker)]
    #[derive(Clone)]
    pub type MapboxMarker;

    #[wasm_bindgen(catch, constructor, js_class = "Marker")]
    fn new(options: &JsValue) -> Result<MapboxMarker, JsValue>;

    #[wasm_bindgen(method, js_class = "Marker", js_name = setLngLat)]
    fn set_lng_lat(this: &MapboxMarker, lng_lat: &JsValue) -> MapboxMarker;

    #[wasm_bindgen(method, js_class = "Marker", js_name = setPopup)]
    fn set_popup(this: &MapboxMarker, popup: &MapboxPopup) -> MapboxMarker;

    #[wasm_bindgen(method, js_class = "Marker", js_name = addTo)]
    fn add_to(this: &MapboxMarker, map: &MapboxMap) -> MapboxMarker;

    #[wasm_bindgen(method, js_class = "Marker")]
    fn remove(this: &MapboxMarker);

    #[wasm_bindgen(js_name = Popup)]
    pub type MapboxPopup;

    #[wasm_bindgen(catch, constructor, js_class = "Popup")]
    fn new(options: &JsValue) -> Result<MapboxPopup, JsValue>;

    #[wasm_bindgen(method, js_class = "Popup", js_name = setHTML)]
    fn set_html(this: &MapboxPopup, html: &str) -> MapboxPopup;
}

fn js_options(value: serde_json::Value) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(&value.to_string())
}

fn lng_lat(position: LngLat) -> JsValue {
    let arr = js_sys::Array::new();
    arr.push(&JsValue::from_f64(position.lng));
    arr.push(&JsValue::from_f64(position.lat));
    arr.into()
}

pub fn set_access_token(token: &str) -> Result<(), JsValue> {
    let global = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("mapboxgl"))?;
    if global.is_undefined() {
        return Err(JsValue::from_str("mapboxgl is not loaded"));
    }
    js_sys::Reflect::set(&global, &JsValue::from_str("accessToken"), &JsValue::from_str(token))?;
    Ok(())
}

fn new_map(container: &HtmlElement, camera: CameraTarget, style: BasemapStyle) -> Result<MapboxMap, JsValue> {
    let options = js_options(json!({
        "style": style.style_url(),
        "center": camera.center.to_array(),
        "zoom": camera.zoom,
    }))?;
    js_sys::Reflect::set(&options, &JsValue::from_str("container"), container)?;
    MapboxMap::new(&options)
}

/// The waypoint map widget.
pub struct MapboxRenderer {
    map: MapboxMap,
    token: ViewToken,
    markers: BTreeMap<MarkerHandle, MapboxMarker>,
    next_handle: u64,
}

impl MapboxRenderer {
    /// Creates the widget inside `container_id`. `None` if there is no such
    /// element or the widget throws while starting up.
    pub fn attach(
        container_id: &str,
        token: ViewToken,
        camera: CameraTarget,
        style: BasemapStyle,
    ) -> Option<Self> {
        let container = dom::element_by_id(container_id)?;
        let map = match new_map(&container, camera, style) {
            Ok(map) => map,
            Err(err) => {
                warn!(container = container_id, ?err, "map widget failed to initialize");
                return None;
            }
        };
        Some(Self {
            map,
            token,
            markers: BTreeMap::new(),
            next_handle: 0,
        })
    }

    fn build_marker(&self, spec: &MarkerSpec) -> Result<MapboxMarker, JsValue> {
        let wrapper = dom::create_element("div")?;
        wrapper.set_inner_html(&spec.marker_html);
        let element = wrapper.first_element_child().unwrap_or(wrapper);

        let options = js_options(json!({}))?;
        js_sys::Reflect::set(&options, &JsValue::from_str("element"), &element)?;
        let popup = MapboxPopup::new(&js_options(json!({ "offset": POPUP_OFFSET }))?)?;
        popup.set_html(&spec.popup_html);

        let marker = MapboxMarker::new(&options)?;
        marker.set_lng_lat(&lng_lat(spec.position));
        marker.set_popup(&popup);
        marker.add_to(&self.map);
        Ok(marker)
    }
}

impl MapRenderer for MapboxRenderer {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        match self.build_marker(&spec) {
            Ok(marker) => {
                self.markers.insert(handle, marker);
            }
            Err(err) => warn!(id = %spec.waypoint, ?err, "failed to create marker"),
        }
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if let Some(marker) = self.markers.remove(&handle) {
            marker.remove();
        }
    }

    fn fly_to(&mut self, camera: CameraTarget) {
        match js_options(json!({ "center": camera.center.to_array(), "zoom": camera.zoom })) {
            Ok(options) => self.map.fly_to(&options),
            Err(err) => warn!(?err, "failed to build camera options"),
        }
    }

    fn set_style(&mut self, style: BasemapStyle) {
        let token = self.token;
        let on_load = Closure::once_into_js(move || {
            crate::dispatch_map_event(token, MapEvent::StyleLoaded);
        });
        self.map.set_style(style.style_url());
        self.map.once("style.load", &on_load);
        debug!(view = %token, %style, "style reload requested");
    }

    fn destroy(&mut self) {
        for (_, marker) in std::mem::take(&mut self.markers) {
            marker.remove();
        }
        self.map.remove();
    }
}

/// Map on the add form where a click picks the waypoint location.
pub struct LocationPicker {
    map: MapboxMap,
    marker: MapboxMarker,
    on_click: Closure<dyn FnMut(JsValue)>,
}

impl LocationPicker {
    /// `None` if there is no such element or the widget fails to start.
    pub fn attach(container_id: &str, on_pick: impl Fn(LngLat) + 'static) -> Option<Self> {
        let container = dom::element_by_id(container_id)?;
        let map = match new_map(&container, CameraTarget::initial(), BasemapStyle::default()) {
            Ok(map) => map,
            Err(err) => {
                warn!(container = container_id, ?err, "location picker failed to initialize");
                return None;
            }
        };
        let marker = match js_options(json!({ "draggable": true })).and_then(|o| MapboxMarker::new(&o)) {
            Ok(marker) => marker,
            Err(err) => {
                warn!(container = container_id, ?err, "location picker pin failed to initialize");
                map.remove();
                return None;
            }
        };

        let pin = marker.clone();
        let map_ref = map.clone();
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let Some(position) = read_lng_lat(&event) else {
                debug!("map click without coordinates");
                return;
            };
            pin.set_lng_lat(&lng_lat(position));
            pin.add_to(&map_ref);
            on_pick(position);
        });
        map.on("click", on_click.as_ref());

        Some(Self {
            map,
            marker,
            on_click,
        })
    }
}

impl Drop for LocationPicker {
    fn drop(&mut self) {
        self.map.off("click", self.on_click.as_ref());
        self.marker.remove();
        self.map.remove();
    }
}

fn read_lng_lat(event: &JsValue) -> Option<LngLat> {
    let raw = js_sys::Reflect::get(event, &JsValue::from_str("lngLat")).ok()?;
    let lng = js_sys::Reflect::get(&raw, &JsValue::from_str("lng")).ok()?.as_f64()?;
    let lat = js_sys::Reflect::get(&raw, &JsValue::from_str("lat")).ok()?.as_f64()?;
    Some(LngLat::new(lng, lat))
}
