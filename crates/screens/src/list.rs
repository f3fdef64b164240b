use std::fmt::Write;

use foundation::markup::escape_html;
use gateway::{GatewayError, ListOrder, Waypoint, WaypointGateway, WaypointId};
use map_view::selection::Selection;
use runtime::sequence::{RequestSequencer, RequestToken};
use tracing::{debug, error};

use crate::detail::PLACEHOLDER_GLYPH;

pub const ACTION_SELECT: &str = "select";

/// Searchable list of every waypoint, newest first.
#[derive(Debug, Default)]
pub struct WaypointList {
    waypoints: Vec<Waypoint>,
    search: String,
    selection: Selection,
    loads: RequestSequencer,
}

impl WaypointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.loads.issue()
    }

    /// Returns `true` if the result replaced the list.
    pub fn complete_load(
        &mut self,
        request: RequestToken,
        result: Result<Vec<Waypoint>, GatewayError>,
    ) -> bool {
        if !self.loads.complete(request) {
            debug!(request = request.0, "discarding stale list load");
            return false;
        }
        match result {
            Ok(waypoints) => {
                self.waypoints = waypoints;
                true
            }
            Err(err) => {
                error!(%err, "failed to load waypoint list");
                false
            }
        }
    }

    pub async fn refresh<G: WaypointGateway + ?Sized>(&mut self, gateway: &G) -> bool {
        let request = self.begin_load();
        let result = gateway.list_waypoints(ListOrder::NewestFirst).await;
        self.complete_load(request, result)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Waypoints matching the current search, in list order.
    pub fn visible(&self) -> Vec<&Waypoint> {
        let needle = self.search.to_lowercase();
        self.waypoints
            .iter()
            .filter(|w| matches(w, &needle))
            .collect()
    }

    pub fn select(&mut self, id: &WaypointId) -> bool {
        self.selection.select_from(id, &self.waypoints)
    }

    pub fn selected(&self) -> Option<&Waypoint> {
        self.selection.current()
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<div class=\"waypoint-list\">");
        for w in self.visible() {
            let _ = write!(
                out,
                "<article class=\"card\" data-action=\"{ACTION_SELECT}\" data-waypoint=\"{}\">",
                escape_html(w.id.as_str())
            );
            match w.thumbnail() {
                Some(src) => {
                    let _ = write!(
                        out,
                        "<img src=\"{}\" alt=\"{}\">",
                        escape_html(src),
                        escape_html(&w.name)
                    );
                }
                None => {
                    let _ = write!(
                        out,
                        "<div class=\"placeholder\"><span class=\"glyph\" data-glyph=\"{PLACEHOLDER_GLYPH}\"></span></div>"
                    );
                }
            }
            let _ = write!(out, "<h2>{}</h2>", escape_html(&w.name));
            let _ = write!(out, "<div class=\"rating\">★ {}</div>", w.rating_label());
            if let Some(description) = w.description_text() {
                let _ = write!(out, "<p>{}</p>", escape_html(description));
            }
            if !w.parameters.is_empty() {
                out.push_str("<div class=\"tags\">");
                for tag in &w.parameters {
                    let _ = write!(out, "<span class=\"tag\">{}</span>", escape_html(tag));
                }
                out.push_str("</div>");
            }
            if let Some(address) = w.address_text() {
                let _ = write!(out, "<div class=\"address\">{}</div>", escape_html(address));
            }
            out.push_str("</article>");
        }
        out.push_str("</div>");
        out
    }
}

/// Case-insensitive match over name, description and tags.
///
/// `needle` must already be lowercase. An empty needle matches everything.
pub fn matches(waypoint: &Waypoint, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    waypoint.name.to_lowercase().contains(needle)
        || waypoint
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || waypoint
            .parameters
            .iter()
            .any(|p| p.to_lowercase().contains(needle))
}
