use foundation::ids::ViewToken;
use gateway::record::{Waypoint, WaypointId};
use tracing::{debug, warn};

use crate::popup::{marker_html, popup_html};
use crate::renderer::{MapRenderer, MarkerHandle, MarkerSpec};

/// Result of one render pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub skipped: usize,
}

/// Markers the view currently has attached to its renderer.
///
/// Entries keep render order. Duplicate ids are kept as separate markers.
#[derive(Debug, Default)]
pub struct MarkerSet {
    attached: Vec<(WaypointId, MarkerHandle)>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn contains(&self, id: &WaypointId) -> bool {
        self.attached.iter().any(|(w, _)| w == id)
    }

    /// Removes every attached marker from `renderer`.
    pub fn clear<R: MapRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for (_, handle) in self.attached.drain(..) {
            renderer.remove_marker(handle);
        }
    }

    /// Forgets the handles without touching a renderer (the widget is gone).
    pub fn forget(&mut self) {
        self.attached.clear();
    }

    /// Disposes the previous pass, then attaches one marker per waypoint with
    /// valid coordinates.
    pub fn replace_all<R: MapRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        token: ViewToken,
        waypoints: &[Waypoint],
    ) -> RenderSummary {
        self.clear(renderer);
        let mut summary = RenderSummary::default();
        for waypoint in waypoints {
            let position = waypoint.position();
            if !position.is_valid() {
                warn!(
                    id = %waypoint.id,
                    lng = waypoint.longitude,
                    lat = waypoint.latitude,
                    "skipping waypoint with invalid coordinates"
                );
                summary.skipped += 1;
                continue;
            }
            let handle = renderer.add_marker(MarkerSpec {
                waypoint: waypoint.id.clone(),
                position,
                marker_html: marker_html(token, &waypoint.id),
                popup_html: popup_html(waypoint, token),
            });
            self.attached.push((waypoint.id.clone(), handle));
            summary.rendered += 1;
        }
        debug!(rendered = summary.rendered, skipped = summary.skipped, "markers rendered");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessRenderer;
    use foundation::geo::LngLat;

    #[test]
    fn invalid_coordinates_are_skipped() {
        let mut r = HeadlessRenderer::default();
        let mut set = MarkerSet::new();
        let records = vec![
            Waypoint::new("a", "A", LngLat::new(10.0, 45.0)),
            Waypoint::new("b", "B", LngLat::new(200.0, 45.0)),
            Waypoint::new("c", "C", LngLat::new(f64::NAN, 0.0)),
        ];
        let summary = set.replace_all(&mut r, ViewToken::new(1), &records);
        assert_eq!(summary, RenderSummary { rendered: 1, skipped: 2 });
        assert_eq!(set.len(), 1);
        assert_eq!(r.marker_count(), 1);
    }

    #[test]
    fn replace_disposes_previous_pass() {
        let mut r = HeadlessRenderer::default();
        let mut set = MarkerSet::new();
        let token = ViewToken::new(1);
        set.replace_all(&mut r, token, &[Waypoint::new("a", "A", LngLat::new(1.0, 1.0))]);
        set.replace_all(&mut r, token, &[Waypoint::new("b", "B", LngLat::new(2.0, 2.0))]);
        assert_eq!(r.marker_ids(), vec![WaypointId::new("b")]);
        assert!(set.contains(&WaypointId::new("b")));
        assert!(!set.contains(&WaypointId::new("a")));
    }
}
