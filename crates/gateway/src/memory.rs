use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

use crate::blob::{ImageUpload, object_name_for};
use crate::error::GatewayError;
use crate::record::{NewWaypoint, Parameter, Waypoint, WaypointId};
use crate::{ListOrder, LocalBoxFuture, WaypointGateway};

/// Gateway kept entirely in memory.
///
/// Records are kept in insertion order, so `ListOrder::NewestFirst` is the
/// reverse of that. Failures can be queued with [`InMemoryGateway::fail_next`];
/// each queued error is returned by the next call of any kind.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    waypoints: RefCell<Vec<Waypoint>>,
    parameters: RefCell<Vec<Parameter>>,
    blobs: RefCell<BTreeMap<String, ImageUpload>>,
    failures: RefCell<VecDeque<GatewayError>>,
    next_id: Cell<u64>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_waypoints(waypoints: Vec<Waypoint>) -> Self {
        let gw = Self::new();
        gw.set_waypoints(waypoints);
        gw
    }

    /// Replaces every stored record, as if another client had rewritten the table.
    pub fn set_waypoints(&self, waypoints: Vec<Waypoint>) {
        *self.waypoints.borrow_mut() = waypoints;
    }

    pub fn set_parameters(&self, parameters: Vec<Parameter>) {
        *self.parameters.borrow_mut() = parameters;
    }

    pub fn fail_next(&self, err: GatewayError) {
        self.failures.borrow_mut().push_back(err);
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.borrow().len()
    }

    pub fn blob_names(&self) -> Vec<String> {
        self.blobs.borrow().keys().cloned().collect()
    }

    pub fn public_url(name: &str) -> String {
        format!("memory://waypoint-images/{name}")
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        match self.failures.borrow_mut().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn list_now(&self, order: ListOrder) -> Result<Vec<Waypoint>, GatewayError> {
        self.take_failure()?;
        let mut out = self.waypoints.borrow().clone();
        if order == ListOrder::NewestFirst {
            out.reverse();
        }
        Ok(out)
    }

    fn insert_now(&self, new: NewWaypoint) -> Result<Waypoint, GatewayError> {
        self.take_failure()?;
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let stored = new.into_waypoint(WaypointId::new(format!("wp-{n}")), None);
        self.waypoints.borrow_mut().push(stored.clone());
        Ok(stored)
    }

    fn upload_now(&self, image: ImageUpload) -> Result<String, GatewayError> {
        self.take_failure()?;
        let name = object_name_for(&image.file_name);
        let url = Self::public_url(&name);
        self.blobs.borrow_mut().insert(name, image);
        Ok(url)
    }
}

impl WaypointGateway for InMemoryGateway {
    fn list_waypoints(
        &self,
        order: ListOrder,
    ) -> LocalBoxFuture<'_, Result<Vec<Waypoint>, GatewayError>> {
        Box::pin(async move { self.list_now(order) })
    }

    fn list_parameters(&self) -> LocalBoxFuture<'_, Result<Vec<Parameter>, GatewayError>> {
        Box::pin(async move {
            self.take_failure()?;
            Ok(self.parameters.borrow().clone())
        })
    }

    fn insert_waypoint(
        &self,
        waypoint: NewWaypoint,
    ) -> LocalBoxFuture<'_, Result<Waypoint, GatewayError>> {
        Box::pin(async move { self.insert_now(waypoint) })
    }

    fn upload_image(&self, image: ImageUpload) -> LocalBoxFuture<'_, Result<String, GatewayError>> {
        Box::pin(async move { self.upload_now(image) })
    }
}
