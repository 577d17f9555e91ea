//! Map location field
//!
//! The map field edits one location value: an address string, coordinates,
//! a zoom level, and a derived `"lat,lng"` submission string. User input
//! reaches the value through two paths:
//!
//! - **address search**: typed input is debounced, fired on the instance's
//!   event bus, classified into a geocode effect, executed against the
//!   provider, and the result committed through `OnChange`;
//! - **direct map interaction**: drags and zooms call
//!   [`MapField::handle_map_change`], which merges the partial location
//!   patch into the current value and commits synchronously.
//!
//! The component never blocks: the only suspension point is the provider
//! call, which runs on a keyed task. Firing a new search while one is in
//! flight aborts the superseded request, so only the latest request's
//! completion can commit.
//!
//! ```text
//! search input -> Debouncer -> bus.fire(GeocodeAddress)
//!              -> aperture -> Emission::Effect(GeocodeAddress)
//!              -> driver -> provider.geocode(address)
//!              -> DidGeocode -> OnChange(id, merged value)
//! ```

mod geocode;

pub use geocode::{Coordinates, GeocodeError, Geocoder, HttpGeocoder};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use serde::{Deserialize, Serialize};

use fieldwork_core::component::OnChange;
use fieldwork_core::markup::Node;
use fieldwork_core::tasks::{Debouncer, TaskManager};
use fieldwork_core::{Action, Component, Emission, EmissionStream, Emitter, EventBus};

/// Quiet period for address-search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

const GEOCODE_TASK: &str = "geocode";

/// The map field's value: an immutable snapshot per render, replaced as a
/// whole on every commit so untouched keys always carry forward.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    /// Human-readable address.
    pub address: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Map zoom level.
    pub zoom: u32,
    /// Formatted `"lat,lng"` submission string.
    pub value: String,
}

/// Partial location change from direct map interaction (drag, zoom).
///
/// Only the fields a gesture actually touched are set; `apply` merges the
/// patch into an existing value without disturbing siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocationPatch {
    /// New latitude, if the gesture moved the pin.
    pub lat: Option<f64>,
    /// New longitude, if the gesture moved the pin.
    pub lng: Option<f64>,
    /// New zoom level, if the gesture zoomed.
    pub zoom: Option<u32>,
}

impl LocationPatch {
    /// Patch that moves the pin.
    pub fn coords(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            zoom: None,
        }
    }

    /// Patch that changes the zoom level.
    pub fn zoom(zoom: u32) -> Self {
        Self {
            lat: None,
            lng: None,
            zoom: Some(zoom),
        }
    }

    /// Merge this patch into `value`, carrying forward untouched keys.
    pub fn apply(&self, value: &MapValue) -> MapValue {
        MapValue {
            lat: self.lat.unwrap_or(value.lat),
            lng: self.lng.unwrap_or(value.lng),
            zoom: self.zoom.unwrap_or(value.zoom),
            ..value.clone()
        }
    }
}

/// Events the UI layer can fire on a map field instance's bus.
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    /// A (debounced, non-empty) address search was submitted.
    GeocodeAddress {
        /// The searched address.
        address: String,
    },
}

/// Effect descriptors the aperture derives from bus events.
#[derive(Clone, Debug, PartialEq)]
pub enum MapEffect {
    /// Resolve the address through the geocoding provider and commit the
    /// resulting coordinates.
    GeocodeAddress {
        /// The searched address.
        address: String,
    },
}

/// Stable dispatch handle derived by the aperture and merged into render
/// props: calling it fires `MapEvent::GeocodeAddress` on the owning bus.
#[derive(Clone, Debug)]
pub struct GeocodeDispatch {
    emitter: Emitter<MapEvent>,
}

impl GeocodeDispatch {
    fn new(emitter: Emitter<MapEvent>) -> Self {
        Self { emitter }
    }

    /// Fire a geocode request for `address`.
    pub fn dispatch(&self, address: String) {
        self.emitter.fire(MapEvent::GeocodeAddress { address });
    }
}

/// Prop patch emitted once by the aperture.
#[derive(Clone, Debug)]
pub struct MapPatch {
    /// Dispatch handle for address searches.
    pub on_geocode_address: GeocodeDispatch,
}

/// Render props for the map field.
#[derive(Clone)]
pub struct MapProps {
    /// Field id within the form record.
    pub id: String,
    /// Submission name prefix; sub-values submit as `{name}[lat]` etc.
    pub name: String,
    /// Current value snapshot.
    pub value: MapValue,
    /// Commit handle owned by the parent form.
    pub on_change: OnChange<MapValue>,
    /// Search dispatch, seeded at mount and re-derived by the effect layer.
    pub on_geocode_address: Option<GeocodeDispatch>,
}

impl std::fmt::Debug for MapProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapProps")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("on_geocode_address", &self.on_geocode_address.is_some())
            .finish_non_exhaustive()
    }
}

impl MapProps {
    /// Props for a freshly mounted field.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        value: MapValue,
        on_change: OnChange<MapValue>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            on_change,
            on_geocode_address: None,
        }
    }
}

/// Whether a geocode request is in flight for this instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeocodePhase {
    /// No request in flight.
    #[default]
    Idle,
    /// One request in flight; completion (either outcome) returns to idle.
    AwaitingGeocode,
}

/// Derive the map field's emission stream from its bus.
///
/// Pure transformation, no I/O: emits the [`MapPatch`] carrying the
/// dispatch handle once, unioned with the mapping of every bus event into
/// its effect descriptor. Ordering holds within each sub-stream only.
pub fn aperture(bus: &EventBus<MapEvent>) -> EmissionStream<MapPatch, MapEffect> {
    let props = tokio_stream::once(Emission::Props(MapPatch {
        on_geocode_address: GeocodeDispatch::new(bus.emitter()),
    }));
    let effects = bus.subscribe().map(|event| match event {
        MapEvent::GeocodeAddress { address } => {
            Emission::Effect(MapEffect::GeocodeAddress { address })
        }
    });
    Box::pin(props.merge(effects))
}

/// Completion actions delivered back to the driver by geocode tasks.
#[derive(Clone, Debug)]
enum MapTaskAction {
    DidGeocode {
        address: String,
        result: Result<Coordinates, GeocodeError>,
    },
}

impl Action for MapTaskAction {
    fn name(&self) -> &'static str {
        match self {
            MapTaskAction::DidGeocode { .. } => "DidGeocode",
        }
    }
}

/// A mounted map field instance.
///
/// Owns the instance's bus, debouncer, and effect driver; dropping the
/// field tears all of them down. The parent form re-renders the field by
/// calling [`sync_props`](MapField::sync_props) with a fresh snapshot after
/// every committed change.
pub struct MapField {
    bus: EventBus<MapEvent>,
    debouncer: Debouncer,
    props_tx: watch::Sender<MapProps>,
    props_rx: watch::Receiver<MapProps>,
    phase_rx: watch::Receiver<GeocodePhase>,
    shutdown: CancellationToken,
    driver: JoinHandle<()>,
}

impl MapField {
    /// Mount a field instance with the standard search debounce.
    pub fn mount<G: Geocoder>(props: MapProps, geocoder: G) -> Self {
        Self::mount_with_debounce(props, geocoder, SEARCH_DEBOUNCE)
    }

    /// Mount with a custom search debounce (tests use short windows).
    pub fn mount_with_debounce<G: Geocoder>(
        mut props: MapProps,
        geocoder: G,
        debounce: Duration,
    ) -> Self {
        let bus = EventBus::new();
        // The dispatch handle must be usable before the driver task gets a
        // turn, so seed it here; the aperture re-derives the same patch for
        // the effect layer.
        props.on_geocode_address = Some(GeocodeDispatch::new(bus.emitter()));
        let emissions = aperture(&bus);

        let (props_tx, props_rx) = watch::channel(props);
        let (phase_tx, phase_rx) = watch::channel(GeocodePhase::Idle);
        let shutdown = CancellationToken::new();

        let driver = tokio::spawn(drive(
            emissions,
            props_tx.clone(),
            phase_tx,
            Arc::new(geocoder),
            shutdown.clone(),
        ));

        Self {
            bus,
            debouncer: Debouncer::new(debounce),
            props_tx,
            props_rx,
            phase_rx,
            shutdown,
            driver,
        }
    }

    /// Handle a keystroke in the address search control.
    ///
    /// Empty and whitespace-only input short-circuits here, before any
    /// dispatch is armed - it never reaches the bus or the provider. For
    /// non-empty input, the debounced dispatch fires the derived
    /// `on_geocode_address` handle with the last value typed.
    pub fn handle_search_change(&mut self, address: &str) {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return;
        }
        let Some(dispatch) = self.props_rx.borrow().on_geocode_address.clone() else {
            // Mount always seeds the dispatch; only a stripped props
            // snapshot can land here.
            return;
        };
        let address = trimmed.to_string();
        self.debouncer
            .schedule(async move { dispatch.dispatch(address) });
    }

    /// Handle direct map interaction (drag, zoom).
    ///
    /// Merges the partial patch into the current value and commits the
    /// replacement immediately - no effect pipeline involved.
    pub fn handle_map_change(&self, patch: LocationPatch) {
        let props = self.props_rx.borrow().clone();
        (props.on_change)(&props.id, patch.apply(&props.value));
    }

    /// Replace render props with a fresh snapshot from the parent form.
    ///
    /// The effect-derived dispatch handle is preserved across re-renders
    /// unless the new snapshot carries its own.
    pub fn sync_props(&self, next: MapProps) {
        self.props_tx.send_modify(|props| {
            let dispatch = props.on_geocode_address.clone();
            *props = next;
            if props.on_geocode_address.is_none() {
                props.on_geocode_address = dispatch;
            }
        });
    }

    /// Current render props snapshot.
    pub fn props(&self) -> MapProps {
        self.props_rx.borrow().clone()
    }

    /// Whether a geocode request is currently in flight.
    pub fn phase(&self) -> GeocodePhase {
        *self.phase_rx.borrow()
    }

    /// The instance's bus (primarily for wiring additional listeners).
    pub fn bus(&self) -> &EventBus<MapEvent> {
        &self.bus
    }

    /// Render the field with its current props.
    pub fn render(&self) -> Node {
        render_map_field(&self.props_rx.borrow())
    }

    /// Tear down the instance: cancel any armed dispatch and stop the
    /// driver. Also performed on drop.
    pub fn unmount(mut self) {
        self.debouncer.cancel();
        self.shutdown.cancel();
    }
}

impl Drop for MapField {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.driver.abort();
    }
}

/// Effect driver: consumes the emission stream, executes geocode effects on
/// keyed tasks, and folds completions back into the shared record through
/// `OnChange`.
async fn drive<G: Geocoder>(
    mut emissions: EmissionStream<MapPatch, MapEffect>,
    props: watch::Sender<MapProps>,
    phase: watch::Sender<GeocodePhase>,
    geocoder: Arc<G>,
    shutdown: CancellationToken,
) {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let mut tasks = TaskManager::new(action_tx);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            emission = emissions.next() => match emission {
                None => break,
                Some(Emission::Props(patch)) => {
                    props.send_modify(|p| {
                        p.on_geocode_address = Some(patch.on_geocode_address.clone());
                    });
                }
                Some(Emission::Effect(effect)) => {
                    handle_effect(effect, &mut tasks, &geocoder, &phase);
                }
            },
            Some(action) = action_rx.recv() => {
                complete(action, &props, &phase);
            }
        }
    }
}

/// Execute one effect descriptor.
///
/// The geocode task is keyed, so a newer request aborts a superseded one
/// that has not completed - only the latest request may commit.
fn handle_effect<G: Geocoder>(
    effect: MapEffect,
    tasks: &mut TaskManager<MapTaskAction>,
    geocoder: &Arc<G>,
    phase: &watch::Sender<GeocodePhase>,
) {
    match effect {
        MapEffect::GeocodeAddress { address } => {
            debug!(%address, "dispatching geocode request");
            phase.send_replace(GeocodePhase::AwaitingGeocode);

            let geocoder = Arc::clone(geocoder);
            tasks.spawn(GEOCODE_TASK, async move {
                let result = geocoder.geocode(&address).await;
                MapTaskAction::DidGeocode { address, result }
            });
        }
    }
}

/// Fold a completion back into the record.
///
/// Success commits address, coordinates, and the formatted submission
/// string as one merged replacement; failure commits nothing and is only
/// visible on the diagnostic channel.
fn complete(
    action: MapTaskAction,
    props: &watch::Sender<MapProps>,
    phase: &watch::Sender<GeocodePhase>,
) {
    match action {
        MapTaskAction::DidGeocode {
            address,
            result: Ok(coords),
        } => {
            phase.send_replace(GeocodePhase::Idle);
            let snapshot = props.borrow().clone();
            let next = MapValue {
                address,
                value: format!("{},{}", coords.lat, coords.lng),
                lat: coords.lat,
                lng: coords.lng,
                ..snapshot.value
            };
            (snapshot.on_change)(&snapshot.id, next);
        }
        MapTaskAction::DidGeocode {
            address,
            result: Err(error),
        } => {
            phase.send_replace(GeocodePhase::Idle);
            warn!(%address, %error, "geocode failed");
        }
    }
}

/// Render the map field markup: the visible search control, the map
/// canvas, and the hidden inputs mirroring lat/lng/zoom for native form
/// submission.
pub fn render_map_field(props: &MapProps) -> Node {
    let value = &props.value;

    Node::element("div")
        .class("cf-map")
        .child(
            Node::element("input")
                .attr("type", "search")
                .attr("id", &props.id)
                .class("cf-map__search")
                .attr("name", format!("{}[address]", props.name))
                .attr("value", &value.address),
        )
        .child(
            Node::element("div")
                .class("cf-map__canvas")
                .attr("data-lat", value.lat.to_string())
                .attr("data-lng", value.lng.to_string())
                .attr("data-zoom", value.zoom.to_string()),
        )
        .child(hidden_input(&props.name, "lat", value.lat.to_string()))
        .child(hidden_input(&props.name, "lng", value.lng.to_string()))
        .child(hidden_input(&props.name, "zoom", value.zoom.to_string()))
}

fn hidden_input(name: &str, key: &str, value: String) -> Node {
    Node::element("input")
        .attr("type", "hidden")
        .attr("name", format!("{}[{}]", name, key))
        .attr("value", value)
}

/// Pure renderer for use behind the [`Component`] contract (decorators,
/// host render trees).
#[derive(Default)]
pub struct MapFieldView;

impl Component for MapFieldView {
    type Props<'a> = &'a MapProps;

    fn render(&mut self, props: Self::Props<'_>) -> Node {
        render_map_field(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwork_core::testing::ChangeRecorder;

    fn sample_value() -> MapValue {
        MapValue {
            address: "Berlin".into(),
            lat: 52.5,
            lng: 13.4,
            zoom: 10,
            value: "52.5,13.4".into(),
        }
    }

    #[test]
    fn test_location_patch_merges_into_value() {
        let value = MapValue {
            address: "A".into(),
            lat: 0.0,
            lng: 0.0,
            zoom: 3,
            value: String::new(),
        };

        let patched = LocationPatch::coords(5.0, 6.0).apply(&value);
        assert_eq!(patched.address, "A");
        assert_eq!(patched.lat, 5.0);
        assert_eq!(patched.lng, 6.0);
        assert_eq!(patched.zoom, 3);

        let zoomed = LocationPatch::zoom(8).apply(&value);
        assert_eq!(zoomed.zoom, 8);
        assert_eq!(zoomed.lat, 0.0);
    }

    #[test]
    fn test_render_submission_wire_format() {
        let recorder = ChangeRecorder::<MapValue>::new();
        let props = MapProps::new("loc", "fields[loc]", sample_value(), recorder.handler());

        let markup = render_map_field(&props);
        let inputs = markup.find_all("input");
        assert_eq!(inputs.len(), 4);

        assert_eq!(inputs[0].attr_value("type"), Some("search"));
        assert_eq!(inputs[0].attr_value("name"), Some("fields[loc][address]"));
        assert_eq!(inputs[0].attr_value("value"), Some("Berlin"));

        let hidden: Vec<_> = inputs[1..]
            .iter()
            .map(|input| {
                (
                    input.attr_value("name").unwrap(),
                    input.attr_value("value").unwrap(),
                )
            })
            .collect();
        assert_eq!(
            hidden,
            vec![
                ("fields[loc][lat]", "52.5"),
                ("fields[loc][lng]", "13.4"),
                ("fields[loc][zoom]", "10"),
            ]
        );
        for input in &inputs[1..] {
            assert_eq!(input.attr_value("type"), Some("hidden"));
        }

        let canvas = markup.find_all("div");
        assert!(canvas
            .iter()
            .any(|el| el.attr_value("class") == Some("cf-map__canvas")
                && el.attr_value("data-zoom") == Some("10")));
    }

    #[tokio::test]
    async fn test_aperture_emits_dispatch_patch_and_maps_events() {
        let bus: EventBus<MapEvent> = EventBus::new();
        let mut emissions = aperture(&bus);

        // First emission is the derived prop patch.
        let patch = match emissions.next().await.expect("props emission") {
            Emission::Props(patch) => patch,
            Emission::Effect(effect) => panic!("expected props patch first, got {:?}", effect),
        };

        // Firing through the derived dispatch round-trips into an effect.
        patch.on_geocode_address.dispatch("Berlin".into());
        drop(bus);

        match emissions.next().await.expect("effect emission") {
            Emission::Effect(MapEffect::GeocodeAddress { address }) => {
                assert_eq!(address, "Berlin");
            }
            Emission::Props(_) => panic!("unexpected second props patch"),
        }
    }

    #[test]
    fn test_map_view_renders_through_component_contract() {
        use fieldwork_core::FieldSpec;
        use fieldwork_core::FieldType;

        let recorder = ChangeRecorder::<MapValue>::new();
        let props = MapProps::new("loc", "fields[loc]", sample_value(), recorder.handler());

        let mut decorated = crate::with_field::with_field(
            MapFieldView,
            FieldSpec::required(FieldType::Map, "Location"),
        );
        let html = decorated.render(&props).to_string();

        assert!(html.contains("cf-field--map"));
        assert!(html.contains("cf-map__search"));
    }

    #[test]
    fn test_map_value_serializes_with_submission_keys() {
        let json = serde_json::to_value(sample_value()).unwrap();
        assert_eq!(json["address"], "Berlin");
        assert_eq!(json["value"], "52.5,13.4");
        assert_eq!(json["zoom"], 10);
    }
}
