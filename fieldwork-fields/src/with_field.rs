//! Generic field decorator
//!
//! `with_field` wraps any [`Component`] in the standard field chrome: a
//! wrapper element carrying the field-type class, the label, and a required
//! marker. Hosts apply it at construction time to whichever widgets need
//! the chrome (the media gallery ships only as a decorated component).

use fieldwork_core::markup::Node;
use fieldwork_core::{Component, FieldSpec};

/// A component wrapped in field chrome.
pub struct WithField<C> {
    inner: C,
    spec: FieldSpec,
}

impl<C> WithField<C> {
    /// The wrapped component.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The field description driving the chrome.
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Unwrap the decorated component.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

/// Decorate `component` with field chrome described by `spec`.
pub fn with_field<C: Component>(component: C, spec: FieldSpec) -> WithField<C> {
    WithField {
        inner: component,
        spec,
    }
}

impl<C: Component> Component for WithField<C> {
    type Props<'a> = C::Props<'a>;

    fn render(&mut self, props: Self::Props<'_>) -> Node {
        let body = self.inner.render(props);

        let mut label = Node::element("label")
            .class("cf-field__label")
            .child(Node::text(&self.spec.label));
        if self.spec.required {
            label = label.child(
                Node::element("span")
                    .class("cf-field__required")
                    .child(Node::text("*")),
            );
        }

        Node::element("div")
            .class(format!("cf-field cf-field--{}", self.spec.field_type.as_str()))
            .child(label)
            .child(Node::element("div").class("cf-field__body").child(body))
    }
}
