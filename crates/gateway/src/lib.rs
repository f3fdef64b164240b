//! Access to the hosted waypoint backend.
//!
//! The backend exposes two table collections (`waypoints`, `parameters`) and
//! a public blob bucket for images. [`WaypointGateway`] is the seam every
//! screen talks to; [`RestGateway`] speaks the hosted REST dialect and
//! [`InMemoryGateway`] backs tests and offline demos.

use std::future::Future;
use std::pin::Pin;

pub mod blob;
pub mod config;
pub mod error;
pub mod memory;
pub mod record;
pub mod rest;

pub use blob::*;
pub use config::*;
pub use error::*;
pub use memory::*;
pub use record::*;
pub use rest::*;

/// Boxed future without a `Send` bound; the browser build is single-threaded.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Ordering requested for a waypoint listing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Whatever order the backend returns.
    #[default]
    Unspecified,
    /// Most recently created first.
    NewestFirst,
}

pub trait WaypointGateway {
    /// All waypoint records, no filter and no pagination.
    fn list_waypoints(&self, order: ListOrder)
        -> LocalBoxFuture<'_, Result<Vec<Waypoint>, GatewayError>>;

    fn list_parameters(&self) -> LocalBoxFuture<'_, Result<Vec<Parameter>, GatewayError>>;

    /// Inserts one record and returns it as stored.
    fn insert_waypoint(
        &self,
        waypoint: NewWaypoint,
    ) -> LocalBoxFuture<'_, Result<Waypoint, GatewayError>>;

    /// Stores the image under a fresh random name and returns its public URL.
    fn upload_image(&self, image: ImageUpload) -> LocalBoxFuture<'_, Result<String, GatewayError>>;
}
