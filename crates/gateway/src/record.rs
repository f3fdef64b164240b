use std::fmt;

use foundation::geo::LngLat;
use serde::{Deserialize, Deserializer, Serialize};

/// Gateway-assigned waypoint identifier.
///
/// The hosted table may hand out either text (uuid) or integer keys; both
/// decode to the same opaque string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WaypointId(String);

impl WaypointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WaypointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(WaypointId)
    }
}

/// A geotagged point of interest as stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "nan_if_null")]
    pub latitude: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub rating: f64,
    #[serde(default, deserialize_with = "default_if_null")]
    pub parameters: Vec<String>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Waypoint {
    /// Minimal record, mostly useful for fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: LngLat) -> Self {
        Self {
            id: WaypointId::new(id),
            name: name.into(),
            description: None,
            latitude: position.lat,
            longitude: position.lng,
            address: None,
            contact_info: None,
            rating: 0.0,
            parameters: Vec::new(),
            images: Vec::new(),
            created_at: None,
        }
    }

    pub fn position(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn description_text(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn address_text(&self) -> Option<&str> {
        non_blank(self.address.as_deref())
    }

    pub fn contact_text(&self) -> Option<&str> {
        non_blank(self.contact_info.as_deref())
    }

    /// Rating rounded to one decimal, e.g. `4.0`.
    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.rating)
    }
}

/// Insert payload for a new waypoint. The gateway assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWaypoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    pub rating: f64,
    pub parameters: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<String>,
}

impl NewWaypoint {
    pub fn into_waypoint(self, id: WaypointId, created_at: Option<String>) -> Waypoint {
        Waypoint {
            id,
            name: self.name,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
            contact_info: self.contact_info,
            rating: self.rating,
            parameters: self.parameters,
            images: self.images,
            created_at,
        }
    }
}

/// Tag definition offered by the add form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "default_if_null")]
    pub icon: String,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// A null coordinate decodes to NaN so the record survives decoding and is
// skipped at render time like any other invalid position.
fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_full_row() {
        let json = r#"{
            "id": "5f0c",
            "name": "Cascata delle Marmore",
            "description": "Waterfall",
            "latitude": 42.55,
            "longitude": 12.71,
            "address": "Terni",
            "contact_info": "+39 0744 62982",
            "rating": 4.5,
            "parameters": ["water", "parking", "water"],
            "images": ["https://cdn/a.jpg", "https://cdn/b.jpg"],
            "created_at": "2025-05-01T10:00:00+00:00"
        }"#;
        let wp: Waypoint = serde_json::from_str(json).unwrap();
        assert_eq!(wp.id.as_str(), "5f0c");
        assert_eq!(wp.parameters, vec!["water", "parking", "water"]);
        assert_eq!(wp.thumbnail(), Some("https://cdn/a.jpg"));
        assert_eq!(wp.rating_label(), "4.5");
        assert_eq!(wp.position(), LngLat::new(12.71, 42.55));
    }

    #[test]
    fn missing_and_null_optionals_default_to_empty() {
        let json = r#"{
            "id": 17,
            "name": "Rifugio",
            "description": null,
            "latitude": 46.0,
            "longitude": 11.0,
            "rating": null,
            "parameters": null,
            "images": null
        }"#;
        let wp: Waypoint = serde_json::from_str(json).unwrap();
        assert_eq!(wp.id.as_str(), "17");
        assert_eq!(wp.description_text(), None);
        assert_eq!(wp.address_text(), None);
        assert!(wp.parameters.is_empty());
        assert!(wp.images.is_empty());
        assert_eq!(wp.thumbnail(), None);
        assert_eq!(wp.rating_label(), "0.0");
    }

    #[test]
    fn null_coordinates_become_invalid_positions() {
        let json = r#"{"id": "x", "name": "n", "latitude": null, "longitude": 3.0}"#;
        let wp: Waypoint = serde_json::from_str(json).unwrap();
        assert!(!wp.position().is_valid());
    }

    #[test]
    fn blank_strings_count_as_absent() {
        let mut wp = Waypoint::new("a", "A", LngLat::new(0.0, 0.0));
        wp.description = Some("   ".to_string());
        wp.contact_info = Some(String::new());
        assert_eq!(wp.description_text(), None);
        assert_eq!(wp.contact_text(), None);
    }

    #[test]
    fn insert_payload_skips_absent_optionals() {
        let new = NewWaypoint {
            name: "Spiaggia".to_string(),
            description: None,
            address: None,
            contact_info: None,
            rating: 4.0,
            parameters: vec!["beach".to_string()],
            latitude: 40.0,
            longitude: 9.0,
            images: Vec::new(),
        };
        let v = serde_json::to_value(&new).unwrap();
        assert!(v.get("description").is_none());
        assert_eq!(v["parameters"][0], "beach");
    }

    #[test]
    fn parameter_icon_may_be_missing() {
        let p: Parameter = serde_json::from_str(r#"{"id": 3, "name": "wifi"}"#).unwrap();
        assert_eq!(p.id, "3");
        assert_eq!(p.icon, "");
    }
}
