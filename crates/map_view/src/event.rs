use gateway::record::WaypointId;

/// Attribute carrying the owning view's token in widget markup.
pub const ATTR_VIEW: &str = "data-view";
/// Attribute carrying the waypoint id in widget markup.
pub const ATTR_WAYPOINT: &str = "data-waypoint";
/// Attribute naming what a click on the element means.
pub const ATTR_ACTION: &str = "data-action";

pub const ACTION_FOCUS: &str = "focus";
pub const ACTION_DETAILS: &str = "details";

/// Something the map widget reported back to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// The marker element itself was clicked.
    MarkerClicked(WaypointId),
    /// The popup's "view details" affordance was clicked.
    DetailsRequested(WaypointId),
    /// A style reload started by the view has finished.
    StyleLoaded,
}

impl MapEvent {
    /// Decodes the `data-action` / `data-waypoint` pair found on clicked markup.
    pub fn from_action(action: &str, waypoint: &str) -> Option<Self> {
        if waypoint.is_empty() {
            return None;
        }
        let id = WaypointId::new(waypoint);
        match action {
            ACTION_FOCUS => Some(MapEvent::MarkerClicked(id)),
            ACTION_DETAILS => Some(MapEvent::DetailsRequested(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_actions() {
        assert_eq!(
            MapEvent::from_action("details", "a"),
            Some(MapEvent::DetailsRequested(WaypointId::new("a")))
        );
        assert_eq!(
            MapEvent::from_action("focus", "a"),
            Some(MapEvent::MarkerClicked(WaypointId::new("a")))
        );
        assert_eq!(MapEvent::from_action("share", "a"), None);
        assert_eq!(MapEvent::from_action("details", ""), None);
    }
}
