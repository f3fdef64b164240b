use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use gateway::record::WaypointId;

use crate::camera::CameraTarget;
use crate::renderer::{MapRenderer, MarkerHandle, MarkerSpec};
use crate::style::BasemapStyle;

#[derive(Debug)]
struct Recording {
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    next_handle: u64,
    camera: CameraTarget,
    flights: Vec<CameraTarget>,
    style: BasemapStyle,
    pending_styles: VecDeque<BasemapStyle>,
    destroyed: bool,
}

/// Renderer that only records what it was asked to do.
///
/// Used by tests and by the CLI preview. Clones share one recording, so a
/// handle kept outside a view still sees what the view did after it has
/// taken (or dropped) its own copy. Style reloads stay pending until
/// [`HeadlessRenderer::finish_style_load`] is called, and drop every marker
/// like a real widget may.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    rec: Rc<RefCell<Recording>>,
}

impl HeadlessRenderer {
    pub fn new(camera: CameraTarget, style: BasemapStyle) -> Self {
        Self {
            rec: Rc::new(RefCell::new(Recording {
                markers: BTreeMap::new(),
                next_handle: 0,
                camera,
                flights: Vec::new(),
                style,
                pending_styles: VecDeque::new(),
                destroyed: false,
            })),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.rec.borrow().markers.len()
    }

    /// Waypoint ids of the live markers, sorted.
    pub fn marker_ids(&self) -> Vec<WaypointId> {
        let mut ids: Vec<WaypointId> = self
            .rec
            .borrow()
            .markers
            .values()
            .map(|m| m.waypoint.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Live markers in handle order.
    pub fn markers(&self) -> Vec<MarkerSpec> {
        self.rec.borrow().markers.values().cloned().collect()
    }

    pub fn camera(&self) -> CameraTarget {
        self.rec.borrow().camera
    }

    /// Every camera move, oldest first.
    pub fn flights(&self) -> Vec<CameraTarget> {
        self.rec.borrow().flights.clone()
    }

    pub fn style(&self) -> BasemapStyle {
        self.rec.borrow().style
    }

    pub fn pending_style_loads(&self) -> usize {
        self.rec.borrow().pending_styles.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.rec.borrow().destroyed
    }

    /// Completes the oldest pending style reload.
    ///
    /// Returns `false` if nothing was pending.
    pub fn finish_style_load(&self) -> bool {
        let mut rec = self.rec.borrow_mut();
        let Some(style) = rec.pending_styles.pop_front() else {
            return false;
        };
        rec.style = style;
        rec.markers.clear();
        true
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(CameraTarget::initial(), BasemapStyle::default())
    }
}

impl MapRenderer for HeadlessRenderer {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        let mut rec = self.rec.borrow_mut();
        rec.next_handle += 1;
        let handle = MarkerHandle(rec.next_handle);
        rec.markers.insert(handle, spec);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.rec.borrow_mut().markers.remove(&handle);
    }

    fn fly_to(&mut self, camera: CameraTarget) {
        let mut rec = self.rec.borrow_mut();
        rec.camera = camera;
        rec.flights.push(camera);
    }

    fn set_style(&mut self, style: BasemapStyle) {
        self.rec.borrow_mut().pending_styles.push_back(style);
    }

    fn destroy(&mut self) {
        let mut rec = self.rec.borrow_mut();
        rec.markers.clear();
        rec.pending_styles.clear();
        rec.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::geo::LngLat;

    fn spec(id: &str) -> MarkerSpec {
        MarkerSpec {
            waypoint: WaypointId::new(id),
            position: LngLat::new(1.0, 2.0),
            marker_html: String::new(),
            popup_html: String::new(),
        }
    }

    #[test]
    fn removing_unknown_handle_is_noop() {
        let mut r = HeadlessRenderer::default();
        let h = r.add_marker(spec("a"));
        r.remove_marker(MarkerHandle(99));
        r.remove_marker(h);
        r.remove_marker(h);
        assert_eq!(r.marker_count(), 0);
    }

    #[test]
    fn style_load_applies_in_order_and_drops_markers() {
        let mut r = HeadlessRenderer::default();
        r.add_marker(spec("a"));
        r.set_style(BasemapStyle::SatelliteStreets);
        r.set_style(BasemapStyle::Outdoors);
        assert_eq!(r.pending_style_loads(), 2);
        assert_eq!(r.style(), BasemapStyle::Outdoors);
        assert_eq!(r.marker_count(), 1);

        assert!(r.finish_style_load());
        assert_eq!(r.style(), BasemapStyle::SatelliteStreets);
        assert_eq!(r.marker_count(), 0);
        assert!(r.finish_style_load());
        assert_eq!(r.style(), BasemapStyle::Outdoors);
        assert!(!r.finish_style_load());
        assert_eq!(r.pending_style_loads(), 0);
    }

    #[test]
    fn clones_share_the_recording() {
        let observer = HeadlessRenderer::default();
        let mut r = observer.clone();
        r.add_marker(spec("a"));
        r.fly_to(CameraTarget::focus(LngLat::new(3.0, 4.0)));
        assert_eq!(observer.marker_ids(), vec![WaypointId::new("a")]);
        assert_eq!(observer.flights().len(), 1);

        r.destroy();
        drop(r);
        assert!(observer.is_destroyed());
        assert_eq!(observer.marker_count(), 0);
    }
}
