//! Centralized form store with reducer pattern
//!
//! The parent form owns the shared record of field values. Fields never
//! mutate it directly: every change arrives as a dispatched action, and the
//! reducer is the only code that touches the record. From a field's point
//! of view a commit is atomic - there is no partial visibility of an
//! in-progress patch.

use crate::Action;
use std::collections::HashMap;
use std::marker::PhantomData;

use serde_json::Value;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed and a re-render is needed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Centralized state store with Redux-like reducer pattern
///
/// The store holds the form state and provides a single point for state
/// mutations through the `dispatch` method.
///
/// # Type Parameters
/// * `S` - The state type
/// * `A` - The action type (must implement `Action`)
///
/// # Example
/// ```ignore
/// let mut store = Store::new(FormState::default(), form_reducer);
/// store.dispatch(FormAction::FieldChanged {
///     id: "location".into(),
///     value: json!({"value": "10,20"}),
/// });
/// ```
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Dispatch an action to the store
    ///
    /// The reducer will be called with the current state and action.
    /// Returns `true` if the state changed and a re-render is needed.
    pub fn dispatch(&mut self, action: A) -> bool {
        (self.reducer)(&mut self.state, action)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state
    ///
    /// Use this sparingly - prefer dispatching actions for state changes.
    /// This is useful for seeding initial field values.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and allows middleware to intercept actions
/// before and after they are processed by the reducer.
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Action, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    /// Create a new store with middleware
    pub fn new(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action through middleware and store
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = self.store.dispatch(action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Get a mutable reference to the state
    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }
}

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, dirty-tracking, or other
/// cross-cutting concerns to the form store.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Middleware that logs actions (for debugging)
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %action.name(),
                state_changed = state_changed,
                "Action processed"
            );
        }
    }
}

/// The shared record edited by the fields of one form: value snapshots
/// keyed by field id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    /// Current value per field id.
    pub values: HashMap<String, Value>,
}

impl FormState {
    /// Look up the current value for a field.
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }
}

/// Actions a form store accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum FormAction {
    /// A field committed a replacement value through its `OnChange` handle.
    FieldChanged {
        /// Field id.
        id: String,
        /// The full replacement value (already merged by the field).
        value: Value,
    },
}

impl Action for FormAction {
    fn name(&self) -> &'static str {
        match self {
            FormAction::FieldChanged { .. } => "FieldChanged",
        }
    }
}

/// Reducer for [`FormState`]: replaces the value under the given id.
pub fn form_reducer(state: &mut FormState, action: FormAction) -> bool {
    match action {
        FormAction::FieldChanged { id, value } => {
            if state.values.get(&id) == Some(&value) {
                return false;
            }
            state.values.insert(id, value);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_store_dispatch() {
        let mut store = Store::new(FormState::default(), form_reducer);

        assert!(store.dispatch(FormAction::FieldChanged {
            id: "location".into(),
            value: json!("10,20"),
        }));
        assert_eq!(store.state().value("location"), Some(&json!("10,20")));
    }

    #[test]
    fn test_form_store_unchanged_value_is_noop() {
        let mut store = Store::new(FormState::default(), form_reducer);

        let action = FormAction::FieldChanged {
            id: "color".into(),
            value: json!("red"),
        };
        assert!(store.dispatch(action.clone()));
        assert!(!store.dispatch(action));
    }

    #[test]
    fn test_commit_replaces_whole_value() {
        let mut store = Store::new(FormState::default(), form_reducer);

        store.dispatch(FormAction::FieldChanged {
            id: "location".into(),
            value: json!({"address": "", "zoom": 5}),
        });
        store.dispatch(FormAction::FieldChanged {
            id: "location".into(),
            value: json!({"address": "Berlin", "zoom": 5}),
        });

        assert_eq!(
            store.state().value("location"),
            Some(&json!({"address": "Berlin", "zoom": 5}))
        );
    }

    #[derive(Default)]
    struct CountingMiddleware {
        before_count: usize,
        after_count: usize,
    }

    impl<A: Action> Middleware<A> for CountingMiddleware {
        fn before(&mut self, _action: &A) {
            self.before_count += 1;
        }

        fn after(&mut self, _action: &A, _state_changed: bool) {
            self.after_count += 1;
        }
    }

    #[test]
    fn test_seeding_initial_values_through_state_mut() {
        let mut store =
            StoreWithMiddleware::new(FormState::default(), form_reducer, NoopMiddleware);

        store
            .state_mut()
            .values
            .insert("color".into(), json!("red"));
        assert_eq!(store.state().value("color"), Some(&json!("red")));

        // Re-dispatching the seeded value changes nothing.
        assert!(!store.dispatch(FormAction::FieldChanged {
            id: "color".into(),
            value: json!("red"),
        }));
    }

    #[test]
    fn test_store_with_middleware() {
        let mut store = StoreWithMiddleware::new(
            FormState::default(),
            form_reducer,
            CountingMiddleware::default(),
        );

        store.dispatch(FormAction::FieldChanged {
            id: "a".into(),
            value: json!(1),
        });
        store.dispatch(FormAction::FieldChanged {
            id: "b".into(),
            value: json!(2),
        });

        assert_eq!(store.middleware().before_count, 2);
        assert_eq!(store.middleware().after_count, 2);
        assert_eq!(store.state().values.len(), 2);
    }
}
