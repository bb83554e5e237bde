//! Immutable, schema-checked attribute sets.

use std::sync::Arc;

use stratus_foundation::{AttrMap, Error, LtVec, Reference, Result, Type, Value};

/// Attributes that passed every phase of schema instantiation.
///
/// Defaults are applied and unset optional fields are absent. There is no
/// way to mutate a `ValidatedAttributes`; derived values are computed by the
/// accessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedAttributes {
    schema: Arc<str>,
    values: AttrMap,
}

impl ValidatedAttributes {
    /// Only constructed by [`crate::AttributeSchema::instantiate`].
    pub(crate) fn new(schema: Arc<str>, values: AttrMap) -> Self {
        Self { schema, values }
    }

    fn typed<'a, T>(
        &'a self,
        field: &str,
        expected: Type,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T> {
        match self.get(field) {
            Some(value) => {
                extract(value).ok_or_else(|| Error::type_mismatch(expected, value.value_type()))
            }
            None => Err(Error::type_mismatch(expected, Type::Nil)),
        }
    }

    /// Name of the schema these attributes were checked against.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Returns a string field.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the field is absent or not a string.
    pub fn str(&self, field: &str) -> Result<&str> {
        self.typed(field, Type::String, Value::as_str)
    }

    /// Returns an integer field.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the field is absent or not an integer.
    pub fn int(&self, field: &str) -> Result<i64> {
        self.typed(field, Type::Int, Value::as_int)
    }

    /// Returns a numeric field as `f64`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the field is absent or not a number.
    pub fn number(&self, field: &str) -> Result<f64> {
        self.typed(field, Type::Float, Value::as_number)
    }

    /// Returns a boolean field, treating an absent field as `false`.
    #[must_use]
    pub fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns a nested record or map field.
    #[must_use]
    pub fn record(&self, field: &str) -> Option<&AttrMap> {
        self.get(field).and_then(Value::as_map)
    }

    /// Returns a list field.
    #[must_use]
    pub fn list(&self, field: &str) -> Option<&LtVec<Value>> {
        self.get(field).and_then(Value::as_list)
    }

    /// Looks up a dotted path such as `auto_scaling.min`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_map()?.get(part)?;
        }
        Some(current)
    }

    /// Every reference embedded in the attributes, in field order.
    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        for value in self.values.values() {
            value.for_each_reference(&mut |r| refs.push(r.clone()));
        }
        refs
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.values.iter()
    }

    /// The underlying map.
    #[must_use]
    pub fn values(&self) -> &AttrMap {
        &self.values
    }

    /// Consumes the attributes, returning the underlying map.
    #[must_use]
    pub fn into_values(self) -> AttrMap {
        self.values
    }

    /// Number of present fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
