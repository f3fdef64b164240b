use foundation::ids::ViewToken;
use gateway::{GatewayError, ListOrder, Waypoint, WaypointGateway, WaypointId};
use runtime::event_bus::EventBus;
use runtime::sequence::{RequestSequencer, RequestToken};
use tracing::{debug, error, info};

use crate::camera::CameraTarget;
use crate::event::MapEvent;
use crate::markers::{MarkerSet, RenderSummary};
use crate::renderer::MapRenderer;
use crate::selection::Selection;
use crate::style::BasemapStyle;

/// What became of a fetch completion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Cache replaced and markers rebuilt.
    Rendered(RenderSummary),
    /// A newer fetch was issued after this one; ignored.
    Stale,
    /// The gateway failed; cache and markers untouched.
    Failed,
}

/// Follow-up work the host has to do after handling an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// Run the gateway fetch for this token and feed it to
    /// [`WaypointMapView::complete_fetch`].
    Fetch(RequestToken),
    SelectionChanged,
}

/// Map screen state: widget, waypoint cache, markers and selection.
///
/// The view never talks to the gateway on its own schedule. Fetches are
/// split into [`begin_fetch`](Self::begin_fetch) and
/// [`complete_fetch`](Self::complete_fetch) so the host can await the gateway
/// without holding the view borrowed; [`refresh`](Self::refresh) does both.
pub struct WaypointMapView<R: MapRenderer> {
    token: ViewToken,
    renderer: Option<R>,
    style: BasemapStyle,
    style_reloads_pending: u32,
    waypoints: Vec<Waypoint>,
    markers: MarkerSet,
    selection: Selection,
    fetches: RequestSequencer,
    subscribed: bool,
}

impl<R: MapRenderer> WaypointMapView<R> {
    /// Binds the view to `renderer` and subscribes it on `bus`.
    ///
    /// `None` stands for a missing container: the view keeps working but
    /// renders nothing.
    pub fn initialize(token: ViewToken, renderer: Option<R>, bus: &mut EventBus<MapEvent>) -> Self {
        if renderer.is_none() {
            debug!(view = %token, "no map container; view will not render");
        }
        let subscribed = bus.subscribe(token);
        info!(view = %token, "map view mounted");
        Self {
            token,
            renderer,
            style: BasemapStyle::default(),
            style_reloads_pending: 0,
            waypoints: Vec::new(),
            markers: MarkerSet::new(),
            selection: Selection::new(),
            fetches: RequestSequencer::new(),
            subscribed,
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn style(&self) -> BasemapStyle {
        self.style
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn selected(&self) -> Option<&Waypoint> {
        self.selection.current()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscribed
    }

    pub fn begin_fetch(&mut self) -> RequestToken {
        self.fetches.issue()
    }

    /// Applies a fetch result if `request` is still the latest fetch.
    pub fn complete_fetch(
        &mut self,
        request: RequestToken,
        result: Result<Vec<Waypoint>, GatewayError>,
    ) -> FetchOutcome {
        if !self.fetches.complete(request) {
            debug!(view = %self.token, request = request.0, "discarding stale fetch");
            return FetchOutcome::Stale;
        }
        match result {
            Ok(waypoints) => {
                self.waypoints = waypoints;
                FetchOutcome::Rendered(self.render())
            }
            Err(err) => {
                error!(view = %self.token, %err, "failed to fetch waypoints");
                FetchOutcome::Failed
            }
        }
    }

    pub async fn run_fetch<G: WaypointGateway + ?Sized>(
        &mut self,
        gateway: &G,
        request: RequestToken,
    ) -> FetchOutcome {
        let result = gateway.list_waypoints(ListOrder::Unspecified).await;
        self.complete_fetch(request, result)
    }

    pub async fn refresh<G: WaypointGateway + ?Sized>(&mut self, gateway: &G) -> FetchOutcome {
        let request = self.begin_fetch();
        self.run_fetch(gateway, request).await
    }

    fn render(&mut self) -> RenderSummary {
        match self.renderer.as_mut() {
            Some(renderer) => self.markers.replace_all(renderer, self.token, &self.waypoints),
            None => RenderSummary::default(),
        }
    }

    /// Switches to the other basemap. Markers are rebuilt once the widget
    /// reports [`MapEvent::StyleLoaded`].
    pub fn toggle_style(&mut self) -> BasemapStyle {
        self.style = self.style.toggled();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_style(self.style);
            self.style_reloads_pending += 1;
        }
        info!(view = %self.token, style = %self.style, "basemap style changed");
        self.style
    }

    pub fn select(&mut self, id: &WaypointId) -> bool {
        let found = self.selection.select_from(id, &self.waypoints);
        if !found {
            debug!(view = %self.token, %id, "selected waypoint is not cached");
        }
        found
    }

    /// Closes the detail overlay. Returns `false` if nothing was open.
    pub fn close_detail(&mut self) -> bool {
        self.selection.clear()
    }

    pub fn handle_event(&mut self, event: MapEvent) -> Option<ViewEffect> {
        match event {
            MapEvent::MarkerClicked(id) => {
                let target = self
                    .waypoints
                    .iter()
                    .find(|w| w.id == id)
                    .map(|w| CameraTarget::focus(w.position()));
                match (target, self.renderer.as_mut()) {
                    (Some(target), Some(renderer)) => renderer.fly_to(target),
                    (None, _) => debug!(view = %self.token, %id, "clicked marker is not cached"),
                    _ => {}
                }
                None
            }
            MapEvent::DetailsRequested(id) => {
                self.select(&id).then_some(ViewEffect::SelectionChanged)
            }
            MapEvent::StyleLoaded => {
                if self.style_reloads_pending == 0 {
                    debug!(view = %self.token, "ignoring unrequested style load");
                    return None;
                }
                self.style_reloads_pending -= 1;
                // The widget may have dropped every marker with the old style.
                self.render();
                Some(ViewEffect::Fetch(self.begin_fetch()))
            }
        }
    }

    /// Drains and handles every event queued for this view.
    pub fn pump(&mut self, bus: &mut EventBus<MapEvent>) -> Vec<ViewEffect> {
        bus.drain(self.token)
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    /// Destroys the widget and unregisters from `bus`. Safe to call twice.
    pub fn teardown(&mut self, bus: &mut EventBus<MapEvent>) {
        if self.subscribed {
            bus.unsubscribe(self.token);
            self.subscribed = false;
        }
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            self.markers.clear(&mut renderer);
            renderer.destroy();
            info!(view = %self.token, "map view torn down");
        }
        self.markers.forget();
        self.selection.clear();
        self.style_reloads_pending = 0;
    }
}

impl<R: MapRenderer> Drop for WaypointMapView<R> {
    fn drop(&mut self) {
        self.release();
    }
}
