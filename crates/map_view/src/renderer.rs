use foundation::geo::LngLat;
use gateway::record::WaypointId;

use crate::camera::CameraTarget;
use crate::style::BasemapStyle;

/// Opaque handle to a marker owned by a renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// Everything a renderer needs to place one marker and its popup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub waypoint: WaypointId,
    pub position: LngLat,
    pub marker_html: String,
    pub popup_html: String,
}

/// The imperative map widget, as seen by the view.
///
/// Implementations wrap a third-party map library. Clicks inside marker and
/// popup markup are not reported through this trait; the markup carries
/// `data-*` attributes and the host routes those clicks onto the event bus.
pub trait MapRenderer {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;

    /// Removing an unknown or already removed handle is a no-op.
    fn remove_marker(&mut self, handle: MarkerHandle);

    fn fly_to(&mut self, camera: CameraTarget);

    /// Starts an asynchronous style reload. The host reports completion with
    /// [`crate::MapEvent::StyleLoaded`]. Markers are not guaranteed to
    /// survive the reload.
    fn set_style(&mut self, style: BasemapStyle);

    /// Releases the widget. No other call follows.
    fn destroy(&mut self);
}
