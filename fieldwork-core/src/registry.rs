//! Validator registry for field submission gating
//!
//! Hosts construct a [`FieldRegistry`] and pass it into field construction;
//! there is no ambient global registration. Validators are looked up by the
//! closed [`FieldType`] enum, and each is a plain `fn` so registration
//! stays data, not behavior.
//!
//! Validation is a boolean gate on submission, not an exception path: a
//! failing value is reported to the host form, never raised.

use std::collections::HashMap;

use serde_json::Value;

/// The closed set of field kinds known to the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Map location picker with address search.
    Map,
    /// Radio option list.
    Radio,
    /// Media gallery (decorated externally via `with_field`).
    MediaGallery,
}

impl FieldType {
    /// Kebab-case name used in markup class names.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Map => "map",
            FieldType::Radio => "radio",
            FieldType::MediaGallery => "media-gallery",
        }
    }
}

/// Host-facing description of a field, passed to validators alongside the
/// current value.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// Which widget renders this field.
    pub field_type: FieldType,
    /// Human-readable label.
    pub label: String,
    /// Whether an empty value should block submission.
    pub required: bool,
}

impl FieldSpec {
    /// Create a spec for a required field.
    pub fn required(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            required: true,
        }
    }

    /// Create a spec for an optional field.
    pub fn optional(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            required: false,
        }
    }
}

/// Submission gate: `true` means the value may be submitted.
pub type Validator = fn(&FieldSpec, &Value) -> bool;

/// Lookup table of validators, injected by the host.
#[derive(Default)]
pub struct FieldRegistry {
    validators: HashMap<FieldType, Validator>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the stock `required` validator wired for
    /// every field type that stores a submittable value.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_validator(FieldType::Map, required);
        registry.register_validator(FieldType::Radio, required);
        registry
    }

    /// Register (or replace) the validator for a field type.
    pub fn register_validator(&mut self, field_type: FieldType, validator: Validator) {
        self.validators.insert(field_type, validator);
    }

    /// Look up the validator for a field type.
    pub fn validator_for(&self, field_type: FieldType) -> Option<Validator> {
        self.validators.get(&field_type).copied()
    }

    /// Validate a value against the registered validator.
    ///
    /// Optional fields and field types without a registered validator
    /// always pass.
    pub fn validate(&self, spec: &FieldSpec, value: &Value) -> bool {
        if !spec.required {
            return true;
        }
        match self.validator_for(spec.field_type) {
            Some(validator) => validator(spec, value),
            None => true,
        }
    }
}

/// The stock required-value rule.
///
/// A value passes when it carries submittable content: a non-whitespace
/// string, a non-empty array, `true`, any number, or an object whose
/// `"value"` member is itself a non-whitespace string (the shape map
/// values serialize to).
pub fn required(_spec: &FieldSpec, value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => map
            .get("value")
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false),
    }
}
