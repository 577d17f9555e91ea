//! fieldwork: form-field widgets with explicit async effect coordination
//!
//! Fields render from immutable props and commit every change through a
//! single `OnChange` entry point. Fields with asynchronous concerns (like
//! the map field's address geocoding) coordinate them through a
//! per-instance event bus, a typed effect stream, and a driving task -
//! the render path never blocks and never sees an effect failure.
//!
//! # Example
//! ```ignore
//! use fieldwork::prelude::*;
//!
//! let registry = FieldRegistry::with_defaults();
//! let geocoder = HttpGeocoder::new(endpoint).with_api_key(key);
//!
//! let field = MapField::mount(
//!     MapProps::new("location", "fields[location]", MapValue::default(), on_change),
//!     geocoder,
//! );
//! let markup = field.render();
//! ```

// Re-export everything from core
pub use fieldwork_core::*;

// Re-export the field widgets
pub use fieldwork_fields::{
    aperture, render_map_field, with_field, Coordinates, GeocodeDispatch, GeocodeError,
    GeocodePhase, Geocoder, HttpGeocoder, LocationPatch, MapEffect, MapEvent, MapField,
    MapFieldView, MapPatch, MapProps, MapValue, RadioField, RadioOption, RadioProps, WithField,
    SEARCH_DEBOUNCE,
};

/// Prelude for convenient imports
pub mod prelude {
    // Core traits and types
    pub use fieldwork_core::{
        form_reducer, required, Action, Component, Debouncer, Emission, EmissionStream, Emitter,
        EventBus, EventStream, FieldRegistry, FieldSpec, FieldType, FormAction, FormState,
        LoggingMiddleware, Middleware, Node, NoopMiddleware, OnChange, Reducer, Store,
        StoreWithMiddleware, TaskKey, TaskManager, Validator,
    };

    // Field widgets
    pub use fieldwork_fields::{
        with_field, Coordinates, GeocodeError, GeocodePhase, Geocoder, HttpGeocoder,
        LocationPatch, MapField, MapProps, MapValue, RadioField, RadioOption, RadioProps,
        WithField,
    };
}
