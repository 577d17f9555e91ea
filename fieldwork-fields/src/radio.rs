//! Radio option field
//!
//! Entirely synchronous: picking an option commits the picked value through
//! `OnChange` immediately, no bus or effect pipeline involved.

use serde::{Deserialize, Serialize};

use fieldwork_core::component::OnChange;
use fieldwork_core::markup::Node;
use fieldwork_core::Component;

/// One selectable option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadioOption {
    /// Label shown next to the control.
    pub label: String,
    /// Value submitted when picked.
    pub value: String,
}

impl RadioOption {
    /// Convenience constructor.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Render props for the radio field.
#[derive(Clone)]
pub struct RadioProps {
    /// Field id within the form record.
    pub id: String,
    /// Submission name shared by every option input.
    pub name: String,
    /// Currently picked value.
    pub value: String,
    /// Options to render.
    pub options: Vec<RadioOption>,
    /// Commit handle owned by the parent form.
    pub on_change: OnChange<String>,
}

impl std::fmt::Debug for RadioProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioProps")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Radio option list.
#[derive(Default)]
pub struct RadioField;

impl RadioField {
    /// Create the field.
    pub fn new() -> Self {
        Self
    }

    /// Handle the user picking an option: commit the picked value.
    pub fn handle_change(&self, props: &RadioProps, picked: &str) {
        (props.on_change)(&props.id, picked.to_string());
    }

    fn render_option(props: &RadioProps, option: &RadioOption) -> Node {
        let option_id = format!("{}-{}", props.id, option.value);
        let checked = props.value == option.value;

        Node::element("li")
            .class("cf-radio__list-item")
            .child(
                Node::element("input")
                    .attr("type", "radio")
                    .attr("id", &option_id)
                    .attr("name", &props.name)
                    .attr("value", &option.value)
                    .class("cf-radio__input")
                    .attr_if("checked", checked.then_some("checked")),
            )
            .child(
                Node::element("label")
                    .class("cf-radio__label")
                    .attr("for", option_id)
                    .child(Node::text(&option.label)),
            )
    }
}

impl Component for RadioField {
    type Props<'a> = &'a RadioProps;

    fn render(&mut self, props: Self::Props<'_>) -> Node {
        if props.options.is_empty() {
            return Node::element("p")
                .class("cf-radio__no-options")
                .child(Node::text("No options."));
        }

        Node::element("ul").class("cf-radio__list").children(
            props
                .options
                .iter()
                .map(|option| Self::render_option(props, option)),
        )
    }
}
