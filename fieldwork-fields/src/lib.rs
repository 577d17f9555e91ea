//! Pre-built form field widgets for fieldwork
//!
//! Each field follows the same contract: props in (including the value
//! snapshot and the parent form's `OnChange` handle), a markup tree out,
//! and all value mutations flowing back through `OnChange`. The map field
//! additionally coordinates its asynchronous geocode lookups through a
//! per-instance event bus and effect driver from `fieldwork-core`.

pub mod map;
pub mod radio;
pub mod with_field;

pub use map::{
    aperture, render_map_field, Coordinates, GeocodeDispatch, GeocodeError, GeocodePhase,
    Geocoder, HttpGeocoder, LocationPatch, MapEffect, MapEvent, MapField, MapFieldView, MapPatch,
    MapProps, MapValue, SEARCH_DEBOUNCE,
};
pub use radio::{RadioField, RadioOption, RadioProps};
pub use with_field::{with_field, WithField};
