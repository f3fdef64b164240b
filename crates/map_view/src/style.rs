use std::fmt;
use std::str::FromStr;

/// Basemap theme offered by the style toggle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum BasemapStyle {
    #[default]
    Outdoors,
    SatelliteStreets,
}

impl BasemapStyle {
    pub fn id(self) -> &'static str {
        match self {
            BasemapStyle::Outdoors => "outdoors",
            BasemapStyle::SatelliteStreets => "satellite-streets",
        }
    }

    /// Style URL understood by the map widget.
    pub fn style_url(self) -> &'static str {
        match self {
            BasemapStyle::Outdoors => "mapbox://styles/mapbox/outdoors-v12",
            BasemapStyle::SatelliteStreets => "mapbox://styles/mapbox/satellite-streets-v12",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            BasemapStyle::Outdoors => BasemapStyle::SatelliteStreets,
            BasemapStyle::SatelliteStreets => BasemapStyle::Outdoors,
        }
    }

    /// Glyph shown on the toggle control while this style is active.
    pub fn toggle_glyph(self) -> &'static str {
        match self {
            BasemapStyle::Outdoors => "globe",
            BasemapStyle::SatelliteStreets => "map",
        }
    }
}

impl fmt::Display for BasemapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStyle(pub String);

impl fmt::Display for UnknownStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown basemap style {:?} (expected outdoors or satellite-streets)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStyle {}

impl FromStr for BasemapStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "outdoors" => Ok(BasemapStyle::Outdoors),
            "satellite-streets" => Ok(BasemapStyle::SatelliteStreets),
            other => Err(UnknownStyle(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BasemapStyle;

    #[test]
    fn toggle_alternates() {
        let s = BasemapStyle::default();
        assert_eq!(s, BasemapStyle::Outdoors);
        assert_eq!(s.toggled(), BasemapStyle::SatelliteStreets);
        assert_eq!(s.toggled().toggled(), s);
    }

    #[test]
    fn parses_ids() {
        assert_eq!(
            "satellite-streets".parse::<BasemapStyle>().unwrap(),
            BasemapStyle::SatelliteStreets
        );
        assert!("streets".parse::<BasemapStyle>().is_err());
        assert_eq!(BasemapStyle::Outdoors.to_string(), "outdoors");
    }

    #[test]
    fn urls_and_glyphs() {
        assert!(BasemapStyle::Outdoors.style_url().ends_with("outdoors-v12"));
        assert_eq!(BasemapStyle::SatelliteStreets.toggle_glyph(), "map");
    }
}
