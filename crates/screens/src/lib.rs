//! The screens around the map: detail overlay, list, add form, navigation
//! and the mobile advisory. Each renders to markup and keeps its own state;
//! the host wires clicks back through `data-action` attributes.

pub mod add_form;
pub mod detail;
pub mod list;
pub mod mobile;
pub mod nav;

pub use add_form::{AddWaypointForm, FormError, Notice, PendingSubmit, glyph_name};
pub use detail::DetailOverlay;
pub use list::WaypointList;
pub use mobile::{MobileAdvisory, is_mobile_user_agent};
pub use nav::Route;
