//! Core traits and types for fieldwork
//!
//! This crate provides the foundational abstractions for building form-field
//! widgets whose asynchronous side effects are coordinated explicitly,
//! following a Redux/Elm-inspired architecture.
//!
//! # Core Concepts
//!
//! - **EventBus**: per-component-instance pub/sub channel with typed events
//! - **Emission**: the union stream an aperture derives from the bus - prop
//!   patches for the render layer plus effect descriptors for the driver
//! - **TaskManager / Debouncer**: async task lifecycle with keyed
//!   cancellation and last-call-wins input collapsing
//! - **Store**: centralized form record with reducer pattern
//! - **Component**: pure renderers producing a markup tree
//! - **FieldRegistry**: host-injected validator table
//!
//! # Effect flow
//!
//! ```text
//! UI input -> Debouncer -> EventBus.fire -> aperture -> Emission stream
//!          -> driver executes effect -> async provider call
//!          -> OnChange(id, merged value) -> re-render with new props
//! ```
//!
//! The async boundary sits entirely at the provider call: everything before
//! and after runs as reactions on the runtime, and the component itself
//! never blocks. A provider failure terminates in the driver - it is logged
//! and never propagates into the render path.
//!
//! # Basic Example
//!
//! ```ignore
//! use fieldwork_core::prelude::*;
//!
//! let mut store = Store::new(FormState::default(), form_reducer);
//! store.dispatch(FormAction::FieldChanged {
//!     id: "location".into(),
//!     value: serde_json::json!("10,20"),
//! });
//! ```

pub mod action;
pub mod bus;
pub mod component;
pub mod effect;
pub mod markup;
pub mod registry;
pub mod store;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::Action;
pub use component::{Component, OnChange};

// Event system exports
pub use bus::{Emitter, EventBus, EventStream};
pub use effect::{Emission, EmissionStream};

// Markup exports
pub use markup::{Element, Node};

// Registry exports
pub use registry::{required, FieldRegistry, FieldSpec, FieldType, Validator};

// Store exports
pub use store::{
    form_reducer, FormAction, FormState, LoggingMiddleware, Middleware, NoopMiddleware, Reducer,
    Store, StoreWithMiddleware,
};

// Task exports
pub use tasks::{Debouncer, TaskKey, TaskManager};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::bus::{Emitter, EventBus, EventStream};
    pub use crate::component::{Component, OnChange};
    pub use crate::effect::{Emission, EmissionStream};
    pub use crate::markup::{Element, Node};
    pub use crate::registry::{required, FieldRegistry, FieldSpec, FieldType, Validator};
    pub use crate::store::{
        form_reducer, FormAction, FormState, LoggingMiddleware, Middleware, NoopMiddleware,
        Reducer, Store, StoreWithMiddleware,
    };
    pub use crate::tasks::{Debouncer, TaskKey, TaskManager};
}
