pub mod geo;
pub mod ids;
pub mod markup;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use ids::*;
pub use markup::*;
