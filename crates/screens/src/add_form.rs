use std::fmt;
use std::fmt::Write;

use foundation::geo::LngLat;
use foundation::markup::escape_html;
use futures::future::try_join_all;
use gateway::{GatewayError, ImageUpload, NewWaypoint, Parameter, Waypoint, WaypointGateway};
use tracing::{error, info, warn};

pub const ACTION_TOGGLE_PARAMETER: &str = "toggle-parameter";
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    MissingLocation,
    MissingName,
    RatingOutOfRange(u8),
    SubmitInProgress,
    Upload(GatewayError),
    Insert(GatewayError),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingLocation => write!(f, "select a point on the map"),
            FormError::MissingName => write!(f, "name is required"),
            FormError::RatingOutOfRange(n) => write!(f, "rating must be between 1 and {MAX_RATING}, got {n}"),
            FormError::SubmitInProgress => write!(f, "a submit is already in progress"),
            FormError::Upload(e) => write!(f, "image upload failed: {e}"),
            FormError::Insert(e) => write!(f, "saving the waypoint failed: {e}"),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Upload(e) | FormError::Insert(e) => Some(e),
            _ => None,
        }
    }
}

/// User-facing outcome of a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn from_submit(result: &Result<Waypoint, FormError>) -> Self {
        match result {
            Ok(_) => Notice::Success("Waypoint added".to_string()),
            Err(e @ (FormError::MissingLocation | FormError::MissingName)) => {
                Notice::Error(capitalize(&e.to_string()))
            }
            Err(FormError::RatingOutOfRange(_)) => Notice::Error("Invalid rating".to_string()),
            Err(FormError::SubmitInProgress) => Notice::Error("Already saving".to_string()),
            Err(_) => Notice::Error("Error while saving".to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(s) | Notice::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Glyph name for a parameter icon: first character upper-cased.
pub fn glyph_name(icon: &str) -> String {
    capitalize(icon)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// State of the add-waypoint screen.
#[derive(Debug, Default)]
pub struct AddWaypointForm {
    pub name: String,
    pub description: String,
    pub address: String,
    pub contact_info: String,
    rating: u8,
    selected: Vec<String>,
    location: Option<LngLat>,
    images: Vec<ImageUpload>,
    parameters: Vec<Parameter>,
    submitting: bool,
}

/// A validated submit detached from the form, so the form stays editable
/// while the uploads and the insert run.
#[derive(Debug)]
pub struct PendingSubmit {
    payload: NewWaypoint,
    images: Vec<ImageUpload>,
}

impl PendingSubmit {
    /// Uploads every image in parallel, then inserts the record.
    pub async fn send<G: WaypointGateway + ?Sized>(self, gateway: &G) -> Result<Waypoint, FormError> {
        let mut payload = self.payload;
        let uploads = self.images.into_iter().map(|image| gateway.upload_image(image));
        payload.images = try_join_all(uploads).await.map_err(|e| {
            error!(err = %e, "image upload failed");
            FormError::Upload(e)
        })?;

        let stored = gateway.insert_waypoint(payload).await.map_err(|e| {
            error!(err = %e, "waypoint insert failed");
            FormError::Insert(e)
        })?;
        info!(id = %stored.id, images = stored.images.len(), "waypoint saved");
        Ok(stored)
    }
}

impl AddWaypointForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn set_rating(&mut self, stars: u8) -> Result<(), FormError> {
        if !(1..=MAX_RATING).contains(&stars) {
            return Err(FormError::RatingOutOfRange(stars));
        }
        self.rating = stars;
        Ok(())
    }

    /// Adds `name` to the selection, or removes it if already selected.
    /// Returns whether it is selected afterwards.
    pub fn toggle_parameter(&mut self, name: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|p| p == name) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(name.to_string());
            true
        }
    }

    pub fn pick_location(&mut self, location: LngLat) {
        self.location = Some(location);
    }

    pub fn location(&self) -> Option<LngLat> {
        self.location
    }

    pub fn add_image(&mut self, image: ImageUpload) {
        self.images.push(image);
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageUpload> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn images(&self) -> &[ImageUpload] {
        &self.images
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub async fn fetch_parameters<G: WaypointGateway + ?Sized>(
        gateway: &G,
    ) -> Result<Vec<Parameter>, GatewayError> {
        gateway.list_parameters().await
    }

    /// Applies a parameter fetch. A failure is logged and leaves the chips as
    /// they were. Returns `true` if the chips were replaced.
    pub fn apply_parameters(&mut self, result: Result<Vec<Parameter>, GatewayError>) -> bool {
        match result {
            Ok(parameters) => {
                self.parameters = parameters;
                true
            }
            Err(err) => {
                error!(%err, "failed to load parameters");
                false
            }
        }
    }

    pub async fn load_parameters<G: WaypointGateway + ?Sized>(&mut self, gateway: &G) -> bool {
        let result = Self::fetch_parameters(gateway).await;
        self.apply_parameters(result)
    }

    /// Checks the form and builds the insert payload without images.
    pub fn validate(&self) -> Result<NewWaypoint, FormError> {
        let location = self.location.ok_or(FormError::MissingLocation)?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        Ok(NewWaypoint {
            name: name.to_string(),
            description: optional(&self.description),
            address: optional(&self.address),
            contact_info: optional(&self.contact_info),
            rating: f64::from(self.rating),
            parameters: self.selected.clone(),
            latitude: location.lat,
            longitude: location.lng,
            images: Vec::new(),
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates the form and marks it in flight. Fields stay editable until
    /// [`finish_submit`](Self::finish_submit); a second call before then is
    /// rejected.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, FormError> {
        if self.submitting {
            return Err(FormError::SubmitInProgress);
        }
        let payload = self.validate()?;
        if !self.location.is_some_and(|l| l.is_valid()) {
            warn!(location = ?self.location, "saving waypoint outside the geographic range");
        }
        self.submitting = true;
        Ok(PendingSubmit {
            payload,
            images: self.images.clone(),
        })
    }

    /// Clears the in-flight mark. On success the form is reset (loaded
    /// parameters are kept); on failure every field is left as it is.
    pub fn finish_submit(&mut self, result: &Result<Waypoint, FormError>) {
        self.submitting = false;
        if result.is_ok() {
            self.reset();
        }
    }

    /// Uploads every pending image, then inserts the record.
    pub async fn submit<G: WaypointGateway + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<Waypoint, FormError> {
        let pending = self.begin_submit()?;
        let result = pending.send(gateway).await;
        self.finish_submit(&result);
        result
    }

    fn reset(&mut self) {
        let parameters = std::mem::take(&mut self.parameters);
        *self = Self {
            parameters,
            ..Self::default()
        };
    }

    /// Parameter chips with their selection state.
    pub fn render_parameters(&self) -> String {
        let mut out = String::from("<div class=\"parameter-chips\">");
        for p in &self.parameters {
            let selected = self.selected.iter().any(|s| s == &p.name);
            let _ = write!(
                out,
                "<button type=\"button\" class=\"chip{}\" data-action=\"{ACTION_TOGGLE_PARAMETER}\" data-parameter=\"{}\" aria-pressed=\"{selected}\">\
                 <span class=\"glyph\" data-glyph=\"{}\"></span>{}</button>",
                if selected { " selected" } else { "" },
                escape_html(&p.name),
                escape_html(&glyph_name(&p.icon)),
                escape_html(&p.name)
            );
        }
        out.push_str("</div>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::InMemoryGateway;
    use pollster::block_on;
    use pretty_assertions::assert_eq;

    fn filled() -> AddWaypointForm {
        let mut form = AddWaypointForm::new();
        form.name = "  Sorgente  ".into();
        form.description = "   ".into();
        form.address = "Via Roma 1".into();
        form.pick_location(LngLat::new(12.5, 41.9));
        form
    }

    #[test]
    fn glyph_names_capitalize_first_char() {
        assert_eq!(glyph_name("wifi"), "Wifi");
        assert_eq!(glyph_name("parkingMeter"), "ParkingMeter");
        assert_eq!(glyph_name(""), "");
    }

    #[test]
    fn validation_order_and_messages() {
        let mut form = AddWaypointForm::new();
        assert_eq!(form.validate(), Err(FormError::MissingLocation));
        form.pick_location(LngLat::new(0.0, 0.0));
        assert_eq!(form.validate(), Err(FormError::MissingName));
        assert_eq!(FormError::MissingLocation.to_string(), "select a point on the map");
        assert_eq!(FormError::MissingName.to_string(), "name is required");
    }

    #[test]
    fn payload_trims_and_drops_blank_fields() {
        let mut form = filled();
        form.set_rating(4).unwrap();
        form.toggle_parameter("wifi");
        form.toggle_parameter("water");
        form.toggle_parameter("wifi");
        form.toggle_parameter("wifi");
        let payload = form.validate().unwrap();
        assert_eq!(payload.name, "Sorgente");
        assert_eq!(payload.description, None);
        assert_eq!(payload.address.as_deref(), Some("Via Roma 1"));
        assert_eq!(payload.rating, 4.0);
        assert_eq!(payload.parameters, vec!["water".to_string(), "wifi".to_string()]);
        assert_eq!((payload.longitude, payload.latitude), (12.5, 41.9));
    }

    #[test]
    fn rating_must_be_one_to_five() {
        let mut form = AddWaypointForm::new();
        assert_eq!(form.rating(), 0);
        assert_eq!(form.set_rating(0), Err(FormError::RatingOutOfRange(0)));
        assert_eq!(form.set_rating(6), Err(FormError::RatingOutOfRange(6)));
        assert!(form.set_rating(5).is_ok());
    }

    #[test]
    fn submit_uploads_then_inserts() {
        let gw = InMemoryGateway::new();
        let mut form = filled();
        form.add_image(ImageUpload::new("a.JPG", vec![1, 2, 3]));
        form.add_image(ImageUpload::new("b.png", vec![4]));
        form.add_image(ImageUpload::new("c.gif", vec![5]));
        assert_eq!(form.remove_image(2).map(|i| i.file_name), Some("c.gif".to_string()));
        assert!(form.remove_image(7).is_none());

        let result = block_on(form.submit(&gw));
        let stored = result.as_ref().unwrap();
        assert_eq!(stored.images.len(), 2);
        assert!(stored.images[0].ends_with(".jpg"));
        assert!(stored.images[1].ends_with(".png"));
        assert_eq!(gw.blob_names().len(), 2);
        assert_eq!(gw.waypoint_count(), 1);
        assert_eq!(Notice::from_submit(&result), Notice::Success("Waypoint added".into()));

        assert!(form.name.is_empty());
        assert!(form.location().is_none());
        assert!(form.images().is_empty());
    }

    #[test]
    fn upload_failure_aborts_before_insert() {
        let gw = InMemoryGateway::new();
        gw.fail_next(GatewayError::Transport("offline".into()));
        let mut form = filled();
        form.add_image(ImageUpload::new("a.jpg", vec![1]));
        let result = block_on(form.submit(&gw));
        assert!(matches!(result, Err(FormError::Upload(_))));
        assert_eq!(gw.waypoint_count(), 0);
        assert_eq!(form.name, "  Sorgente  ");
        let notice = Notice::from_submit(&result);
        assert!(notice.is_error());
        assert_eq!(notice.text(), "Error while saving");
    }

    #[test]
    fn missing_location_notice() {
        let mut form = AddWaypointForm::new();
        form.name = "x".into();
        let result = block_on(form.submit(&InMemoryGateway::new()));
        assert_eq!(
            Notice::from_submit(&result),
            Notice::Error("Select a point on the map".into())
        );
    }

    #[test]
    fn parameter_load_failure_keeps_chips_empty() {
        let gw = InMemoryGateway::new();
        gw.set_parameters(vec![Parameter {
            id: "1".into(),
            name: "wifi".into(),
            icon: "wifi".into(),
        }]);
        gw.fail_next(GatewayError::Transport("offline".into()));
        let mut form = AddWaypointForm::new();
        assert!(!block_on(form.load_parameters(&gw)));
        assert!(form.parameters().is_empty());

        assert!(block_on(form.load_parameters(&gw)));
        assert_eq!(form.parameters().len(), 1);
        form.toggle_parameter("wifi");
        let html = form.render_parameters();
        assert!(html.contains("data-glyph=\"Wifi\""));
        assert!(html.contains("aria-pressed=\"true\""));
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let gw = InMemoryGateway::new();
        let mut form = filled();
        let pending = form.begin_submit().unwrap();
        assert!(form.is_submitting());

        let again = form.begin_submit();
        assert!(matches!(again, Err(FormError::SubmitInProgress)));
        assert_eq!(
            Notice::from_submit(&Err(FormError::SubmitInProgress)),
            Notice::Error("Already saving".into())
        );

        let result = block_on(pending.send(&gw));
        form.finish_submit(&result);
        assert!(!form.is_submitting());
        assert_eq!(gw.waypoint_count(), 1);
        assert_eq!(result.unwrap().name, "Sorgente");
    }

    #[test]
    fn edits_during_a_failed_submit_are_kept() {
        let gw = InMemoryGateway::new();
        gw.fail_next(GatewayError::Transport("offline".into()));
        let mut form = filled();
        let pending = form.begin_submit().unwrap();

        form.name = "Sorgente Nuova".into();
        form.toggle_parameter("water");
        let result = block_on(pending.send(&gw));
        assert!(matches!(result, Err(FormError::Insert(_))));
        form.finish_submit(&result);

        assert!(!form.is_submitting());
        assert_eq!(form.name, "Sorgente Nuova");
        assert_eq!(form.validate().unwrap().parameters, vec!["water".to_string()]);

        let retried = block_on(form.submit(&gw)).unwrap();
        assert_eq!(retried.name, "Sorgente Nuova");
        assert!(form.name.is_empty());
    }
}
