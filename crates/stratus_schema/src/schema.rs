//! Schema definitions for attribute sets.
//!
//! Schemas define the structure and constraints of the attributes accepted by
//! a resource kind, component, or architecture.

use std::fmt;
use std::sync::Arc;

use stratus_foundation::{Type, Value};

use crate::constraint::Constraint;
use crate::validator::Validator;

/// What instantiation does with keys the schema does not declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum UnknownFields {
    /// Fail with a validation error at the unknown key.
    #[default]
    Reject,
    /// Keep the key and value verbatim in the validated attributes.
    Passthrough,
}

/// Schema definition for an attribute set.
#[derive(Clone, Debug)]
pub struct AttributeSchema {
    /// Schema name, usually the kind or capability it describes.
    pub name: Arc<str>,
    /// Field definitions, in declaration order.
    pub fields: Vec<FieldSchema>,
    /// Cross-field rules, run after every field has passed.
    pub validators: Vec<Validator>,
    /// Handling of undeclared keys.
    pub unknown: UnknownFields,
}

impl AttributeSchema {
    /// Creates an empty schema that rejects unknown keys.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            validators: Vec::new(),
            unknown: UnknownFields::Reject,
        }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a cross-field validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Keeps undeclared keys instead of rejecting them.
    #[must_use]
    pub fn passthrough(mut self) -> Self {
        self.unknown = UnknownFields::Passthrough;
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Declared type of a field.
#[derive(Clone, Debug)]
pub enum FieldType {
    /// A value checked against a [`Type`].
    Scalar(Type),
    /// A nested record instantiated against its own schema.
    Record(Arc<AttributeSchema>),
    /// A list whose items all have the given field type.
    List(Box<FieldType>),
    /// A string-keyed map whose values all have the given field type.
    Map(Box<FieldType>),
}

impl FieldType {
    /// A nested record field.
    #[must_use]
    pub fn record(schema: AttributeSchema) -> Self {
        Self::Record(Arc::new(schema))
    }

    /// A list of items of the given field type.
    #[must_use]
    pub fn list_of(item: impl Into<FieldType>) -> Self {
        Self::List(Box::new(item.into()))
    }

    /// A map of values of the given field type.
    #[must_use]
    pub fn map_of(value: impl Into<FieldType>) -> Self {
        Self::Map(Box::new(value.into()))
    }
}

impl From<Type> for FieldType {
    fn from(ty: Type) -> Self {
        Self::Scalar(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "{ty}"),
            Self::Record(schema) => write!(f, "record<{}>", schema.name),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Map(value) => write!(f, "map<{value}>"),
        }
    }
}

/// Schema definition for a single field.
#[derive(Clone, Debug)]
pub struct FieldSchema {
    /// Field name.
    pub name: Arc<str>,
    /// Field type.
    pub ty: FieldType,
    /// Default value applied when the field is absent.
    pub default: Option<Value>,
    /// Whether the field must be supplied.
    pub required: bool,
    /// Constraints checked after the type.
    pub constraints: Vec<Constraint>,
    /// One-line description for listings.
    pub description: Option<&'static str>,
}

impl FieldSchema {
    /// Creates a required field with no default.
    #[must_use]
    pub fn required(name: impl Into<Arc<str>>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
            required: true,
            constraints: Vec::new(),
            description: None,
        }
    }

    /// Creates an optional field with a default value.
    #[must_use]
    pub fn optional(
        name: impl Into<Arc<str>>,
        ty: impl Into<FieldType>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            default: Some(default.into()),
            required: false,
            ..Self::required(name, ty)
        }
    }

    /// Creates an optional field with no default; omitted when unset.
    #[must_use]
    pub fn optional_unset(name: impl Into<Arc<str>>, ty: impl Into<FieldType>) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    /// Adds a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Attaches a description.
    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}
