//! Emission stream types for effect coordination
//!
//! A field's effect layer is described by an *aperture*: a pure function
//! from the instance's event bus to a single combined stream of
//! [`Emission`]s. The stream is the union of two push-driven sub-streams:
//!
//! - **prop patches**: derived callbacks merged into the props the UI layer
//!   renders with (e.g. a dispatch handle bound to firing an event on this
//!   instance's bus);
//! - **effect descriptors**: typed requests for externally-visible async
//!   work, produced by mapping raw bus events.
//!
//! Ordering is guaranteed within each sub-stream but not across them. The
//! aperture performs no I/O; executing effects is the driver's job.
//!
//! # Example
//!
//! ```ignore
//! fn aperture(bus: &EventBus<MapEvent>) -> EmissionStream<MapPatch, MapEffect> {
//!     let dispatch = GeocodeDispatch::new(bus.emitter());
//!     let props = tokio_stream::once(Emission::Props(MapPatch {
//!         on_geocode_address: dispatch,
//!     }));
//!     let effects = bus.subscribe().map(|event| match event {
//!         MapEvent::GeocodeAddress { address } => {
//!             Emission::Effect(MapEffect::GeocodeAddress { address })
//!         }
//!     });
//!     Box::pin(props.merge(effects))
//! }
//! ```

use std::pin::Pin;

use tokio_stream::Stream;

/// One item of an aperture's combined output: either a patch to merge into
/// the component's render props, or a typed effect descriptor for the
/// driver to execute.
///
/// An effect descriptor is created by the aperture, consumed exactly once
/// by the driver, then discarded.
#[derive(Clone, Debug, PartialEq)]
pub enum Emission<P, F> {
    /// Merge this patch into the component's render props.
    Props(P),
    /// Execute this effect.
    Effect(F),
}

impl<P, F> Emission<P, F> {
    /// Whether this emission is a prop patch.
    pub fn is_props(&self) -> bool {
        matches!(self, Emission::Props(_))
    }

    /// Whether this emission is an effect descriptor.
    pub fn is_effect(&self) -> bool {
        matches!(self, Emission::Effect(_))
    }
}

/// Boxed combined stream produced by an aperture.
pub type EmissionStream<P, F> = Pin<Box<dyn Stream<Item = Emission<P, F>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[derive(Clone, Debug, PartialEq)]
    struct Patch(&'static str);

    #[derive(Clone, Debug, PartialEq)]
    struct Fx(u32);

    #[tokio::test]
    async fn test_merged_stream_preserves_order_within_each_sub_stream() {
        let props = tokio_stream::iter(vec![Emission::Props(Patch("a"))]);
        let effects =
            tokio_stream::iter((0..3).map(|i| Emission::<Patch, Fx>::Effect(Fx(i))));

        let stream: EmissionStream<Patch, Fx> = Box::pin(props.merge(effects));
        let items: Vec<_> = stream.collect().await;

        let effect_order: Vec<_> = items
            .iter()
            .filter_map(|e| match e {
                Emission::Effect(Fx(i)) => Some(*i),
                Emission::Props(_) => None,
            })
            .collect();
        assert_eq!(effect_order, vec![0, 1, 2]);
        assert_eq!(items.iter().filter(|e| e.is_props()).count(), 1);
    }

    #[test]
    fn test_emission_predicates() {
        let p: Emission<Patch, Fx> = Emission::Props(Patch("x"));
        let f: Emission<Patch, Fx> = Emission::Effect(Fx(1));

        assert!(p.is_props() && !p.is_effect());
        assert!(f.is_effect() && !f.is_props());
    }
}
