//! Per-instance event bus for field components
//!
//! Every mounted field instance owns exactly one bus. The UI layer fires
//! typed events on it; the effect layer subscribes and observes them as a
//! push-driven stream. The bus lives exactly as long as the component
//! instance that owns it.
//!
//! Events are a closed enum per field, so subscribers match variants
//! exhaustively instead of dispatching on string names.
//!
//! # Delivery guarantees
//!
//! - `fire` is synchronous: it publishes to every subscriber registered at
//!   the time of the call and does nothing else.
//! - Events are delivered to each subscriber in fire order.
//! - There is no replay: a subscriber never observes events fired before it
//!   subscribed.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Clone, Debug)]
//! enum MapEvent {
//!     GeocodeAddress { address: String },
//! }
//!
//! let bus: EventBus<MapEvent> = EventBus::new();
//! let mut events = bus.subscribe();
//!
//! bus.fire(MapEvent::GeocodeAddress { address: "Berlin".into() });
//!
//! // `events` yields the fired payload exactly once.
//! ```

use std::fmt::Debug;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::trace;

type Subscribers<E> = Arc<Mutex<Vec<mpsc::UnboundedSender<E>>>>;

/// Multicast event channel scoped to one component instance.
///
/// Generic over `E`, the field's closed event enum.
pub struct EventBus<E> {
    subscribers: Subscribers<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    /// Create a new bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to all events fired after this call.
    ///
    /// Each subscriber receives its own copy of every subsequent event,
    /// in fire order. Dropping the stream unsubscribes.
    pub fn subscribe(&self) -> EventStream<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(tx);
        EventStream {
            inner: UnboundedReceiverStream::new(rx),
        }
    }

    /// Get a cloneable fire handle.
    ///
    /// This is the capability handed to the UI layer: it can publish events
    /// but cannot subscribe or inspect the bus.
    pub fn emitter(&self) -> Emitter<E> {
        Emitter {
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<E>>> {
        // The lock is only held for push/retain; none of the holders can panic.
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<E: Clone + Debug> EventBus<E> {
    /// Fire an event, publishing it to every live subscriber.
    ///
    /// Subscribers whose streams have been dropped are pruned here.
    pub fn fire(&self, event: E) {
        fire_on(&self.subscribers, event);
    }
}

/// Cloneable publish-only handle to an [`EventBus`].
pub struct Emitter<E> {
    subscribers: Subscribers<E>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<E> Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter").finish_non_exhaustive()
    }
}

impl<E: Clone + Debug> Emitter<E> {
    /// Fire an event on the owning bus.
    pub fn fire(&self, event: E) {
        fire_on(&self.subscribers, event);
    }
}

fn fire_on<E: Clone + Debug>(subscribers: &Subscribers<E>, event: E) {
    let mut subs = match subscribers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    trace!(?event, subscribers = subs.len(), "firing event");
    subs.retain(|tx| tx.send(event.clone()).is_ok());
}

/// Push-driven sequence of events from an [`EventBus`].
///
/// Yields `None` once every fire handle for the bus has been dropped.
pub struct EventStream<E> {
    inner: UnboundedReceiverStream<E>,
}

impl<E> Stream for EventStream<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
