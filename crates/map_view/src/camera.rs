use foundation::geo::LngLat;

/// Center of the initial view (Rome).
pub const INITIAL_CENTER: LngLat = LngLat::new(12.4964, 41.9028);
pub const INITIAL_ZOOM: f64 = 6.0;
/// Zoom used when a marker is clicked.
pub const FOCUS_ZOOM: f64 = 14.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTarget {
    pub center: LngLat,
    pub zoom: f64,
}

impl CameraTarget {
    pub fn initial() -> Self {
        Self {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
        }
    }

    pub fn focus(center: LngLat) -> Self {
        Self {
            center,
            zoom: FOCUS_ZOOM,
        }
    }
}

impl Default for CameraTarget {
    fn default() -> Self {
        Self::initial()
    }
}
