use std::fmt::Write;

use foundation::markup::escape_html;
use gateway::record::Waypoint;

pub const ACTION_CLOSE: &str = "close";
pub const ACTION_FAVORITE: &str = "favorite";

/// Glyph shown instead of the image strip when a waypoint has no images.
pub const PLACEHOLDER_GLYPH: &str = "map-pin";

/// Modal with the full details of one waypoint.
///
/// The favorite flag is local to this overlay and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailOverlay {
    waypoint: Waypoint,
    favorite: bool,
}

impl DetailOverlay {
    pub fn new(waypoint: Waypoint) -> Self {
        Self {
            waypoint,
            favorite: false,
        }
    }

    pub fn waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    pub fn toggle_favorite(&mut self) -> bool {
        self.favorite = !self.favorite;
        self.favorite
    }

    /// Consumes the overlay and hands the waypoint to the caller's close action.
    pub fn close(self, on_close: impl FnOnce(&Waypoint)) {
        on_close(&self.waypoint);
    }

    pub fn render(&self) -> String {
        let w = &self.waypoint;
        let mut out = String::from("<div class=\"waypoint-detail\" role=\"dialog\">");

        out.push_str("<div class=\"waypoint-detail__images\">");
        if w.images.is_empty() {
            let _ = write!(
                out,
                "<div class=\"placeholder\"><span class=\"glyph\" data-glyph=\"{PLACEHOLDER_GLYPH}\"></span></div>"
            );
        } else {
            let name = escape_html(&w.name);
            for (i, url) in w.images.iter().enumerate() {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{name} {}\">",
                    escape_html(url),
                    i + 1
                );
            }
        }
        out.push_str("</div>");

        let _ = write!(
            out,
            "<div class=\"waypoint-detail__actions\">\
             <button type=\"button\" data-action=\"{ACTION_CLOSE}\">×</button>\
             <button type=\"button\" data-action=\"{ACTION_FAVORITE}\" aria-pressed=\"{}\">♥</button>\
             </div>",
            self.favorite
        );

        let _ = write!(out, "<h1>{}</h1>", escape_html(&w.name));
        let _ = write!(out, "<div class=\"waypoint-detail__meta\">★ {}", w.rating_label());
        if let Some(address) = w.address_text() {
            let _ = write!(out, " • <span class=\"address\">{}</span>", escape_html(address));
        }
        out.push_str("</div>");

        if let Some(description) = w.description_text() {
            let _ = write!(out, "<p class=\"description\">{}</p>", escape_html(description));
        }
        if let Some(contact) = w.contact_text() {
            let _ = write!(out, "<p class=\"contact\">{}</p>", escape_html(contact));
        }
        if !w.parameters.is_empty() {
            out.push_str("<div class=\"tags\">");
            for tag in &w.parameters {
                let _ = write!(out, "<span class=\"tag\">{}</span>", escape_html(tag));
            }
            out.push_str("</div>");
        }

        out.push_str("</div>");
        out
    }
}
