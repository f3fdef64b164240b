//! Markup handed to the map widget for markers and popups.
//!
//! The markup never embeds callbacks. Interactive elements carry
//! `data-view`, `data-waypoint` and `data-action` attributes; the host turns a
//! click on them into a [`crate::MapEvent`] on the bus.

use std::fmt::Write;

use foundation::ids::ViewToken;
use foundation::markup::escape_html;
use gateway::record::{Waypoint, WaypointId};

use crate::event::{ACTION_DETAILS, ACTION_FOCUS, ATTR_ACTION, ATTR_VIEW, ATTR_WAYPOINT};

pub const NO_DESCRIPTION: &str = "No description.";
pub const DETAILS_LABEL: &str = "View details →";

fn data_attrs(token: ViewToken, id: &WaypointId, action: &str) -> String {
    format!(
        "{ATTR_VIEW}=\"{token}\" {ATTR_WAYPOINT}=\"{}\" {ATTR_ACTION}=\"{action}\"",
        escape_html(id.as_str())
    )
}

/// Marker element. Clicking it focuses the camera on the waypoint.
pub fn marker_html(token: ViewToken, id: &WaypointId) -> String {
    format!(
        "<div class=\"waypoint-marker\" {}></div>",
        data_attrs(token, id, ACTION_FOCUS)
    )
}

/// Popup body for one waypoint.
pub fn popup_html(waypoint: &Waypoint, token: ViewToken) -> String {
    let mut out = String::from("<div class=\"waypoint-popup\">");
    if let Some(src) = waypoint.thumbnail() {
        let _ = write!(
            out,
            "<img class=\"waypoint-popup__thumb\" src=\"{}\" alt=\"{}\">",
            escape_html(src),
            escape_html(&waypoint.name)
        );
    }
    let _ = write!(out, "<h3>{}</h3>", escape_html(&waypoint.name));
    let description = waypoint.description_text().unwrap_or(NO_DESCRIPTION);
    let _ = write!(out, "<p>{}</p>", escape_html(description));
    if waypoint.rating != 0.0 {
        let _ = write!(
            out,
            "<div class=\"waypoint-popup__rating\">★ {}</div>",
            waypoint.rating_label()
        );
    }
    if !waypoint.parameters.is_empty() {
        out.push_str("<div class=\"waypoint-popup__tags\">");
        for tag in &waypoint.parameters {
            let _ = write!(out, "<span class=\"tag\">{}</span>", escape_html(tag));
        }
        out.push_str("</div>");
    }
    let _ = write!(
        out,
        "<button type=\"button\" {}>{DETAILS_LABEL}</button>",
        data_attrs(token, &waypoint.id, ACTION_DETAILS)
    );
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::geo::LngLat;

    fn waypoint() -> Waypoint {
        Waypoint::new("w1", "Fontana <Trevi>", LngLat::new(12.48, 41.9))
    }

    #[test]
    fn bare_record_uses_placeholders() {
        let html = popup_html(&waypoint(), ViewToken::new(3));
        assert!(html.contains("<h3>Fontana &lt;Trevi&gt;</h3>"));
        assert!(html.contains(NO_DESCRIPTION));
        assert!(!html.contains("<img"));
        assert!(!html.contains("waypoint-popup__rating"));
        assert!(!html.contains("waypoint-popup__tags"));
        assert!(html.contains("data-view=\"3\" data-waypoint=\"w1\" data-action=\"details\""));
    }

    #[test]
    fn full_record_renders_every_part() {
        let mut w = waypoint();
        w.description = Some("Baroque".into());
        w.rating = 4.0;
        w.parameters = vec!["wifi".into(), "wifi".into()];
        w.images = vec!["https://img/1.jpg".into(), "https://img/2.jpg".into()];
        let html = popup_html(&w, ViewToken::new(1));
        assert_eq!(html.matches("<img").count(), 1);
        assert!(html.contains("src=\"https://img/1.jpg\""));
        assert!(html.contains("★ 4.0"));
        assert_eq!(html.matches("<span class=\"tag\">wifi</span>").count(), 2);
        assert!(html.contains("<p>Baroque</p>"));
    }

    #[test]
    fn marker_carries_focus_action() {
        let html = marker_html(ViewToken::new(7), &WaypointId::new("a\"b"));
        assert!(html.contains("data-waypoint=\"a&quot;b\""));
        assert!(html.contains("data-action=\"focus\""));
    }
}
