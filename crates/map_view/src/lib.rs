//! The waypoint map screen, independent of any concrete map library.
//!
//! [`WaypointMapView`] owns the widget (behind [`MapRenderer`]), the waypoint
//! cache, the attached markers and the current selection. Widget-side clicks
//! come back as [`MapEvent`]s on a `runtime::EventBus` keyed by the view's
//! token.

pub mod camera;
pub mod event;
pub mod headless;
pub mod markers;
pub mod popup;
pub mod renderer;
pub mod selection;
pub mod style;
pub mod view;

pub use camera::*;
pub use event::*;
pub use headless::HeadlessRenderer;
pub use markers::*;
pub use renderer::*;
pub use selection::*;
pub use style::*;
pub use view::*;
