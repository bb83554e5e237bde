//! Schema instantiation: raw attributes in, validated attributes out.

use std::sync::Arc;

use stratus_foundation::{AttrMap, Error, FieldPath, LtVec, Result, Type, Value};

use crate::attributes::ValidatedAttributes;
use crate::schema::{AttributeSchema, FieldType, UnknownFields};

impl AttributeSchema {
    /// Checks `raw` against this schema.
    ///
    /// Phases run in order and the first failure aborts:
    /// 1. shape: unknown keys, missing required fields, defaults
    /// 2. types: each present field in declaration order; records recurse
    /// 3. field constraints
    /// 4. cross-field validators
    ///
    /// An explicit nil counts as absent. Unset optional fields without a
    /// default are omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the failing field path and reason.
    pub fn instantiate(&self, raw: &AttrMap) -> Result<ValidatedAttributes> {
        let values = self.check(&self.name, raw, &FieldPath::root())?;
        Ok(ValidatedAttributes::new(Arc::clone(&self.name), values))
    }

    fn check(&self, root: &str, raw: &AttrMap, prefix: &FieldPath) -> Result<AttrMap> {
        let shaped = self.shape(root, raw, prefix)?;
        let typed = self.type_check(root, shaped, prefix)?;
        self.check_constraints(root, &typed, prefix)?;
        self.run_validators(root, &typed, prefix)?;
        Ok(typed)
    }

    fn shape(&self, root: &str, raw: &AttrMap, prefix: &FieldPath) -> Result<AttrMap> {
        let mut shaped = AttrMap::new();

        for (key, value) in raw.iter() {
            if self.field(key).is_some() {
                continue;
            }
            match self.unknown {
                UnknownFields::Reject => {
                    return Err(Error::validation(
                        root,
                        prefix.join_field(Arc::clone(key)),
                        format!("unknown field for {}", self.name),
                    ));
                }
                UnknownFields::Passthrough if !value.is_nil() => {
                    shaped = shaped.insert(Arc::clone(key), value.clone());
                }
                UnknownFields::Passthrough => {}
            }
        }

        for field in &self.fields {
            let supplied = raw.get(&*field.name).filter(|v| !v.is_nil());
            let value = match (supplied, &field.default) {
                (Some(value), _) | (None, Some(value)) => value.clone(),
                (None, None) if field.required => {
                    return Err(Error::validation(
                        root,
                        prefix.join_field(Arc::clone(&field.name)),
                        "required field is missing",
                    ));
                }
                (None, None) => continue,
            };
            shaped = shaped.insert(Arc::clone(&field.name), value);
        }

        Ok(shaped)
    }

    fn type_check(&self, root: &str, mut values: AttrMap, prefix: &FieldPath) -> Result<AttrMap> {
        for field in &self.fields {
            let Some(value) = values.get(&*field.name) else {
                continue;
            };
            let path = prefix.join_field(Arc::clone(&field.name));
            let checked = check_field_type(root, &field.ty, value, &path)?;
            values = values.insert(Arc::clone(&field.name), checked);
        }
        Ok(values)
    }

    fn check_constraints(&self, root: &str, values: &AttrMap, prefix: &FieldPath) -> Result<()> {
        for field in &self.fields {
            let Some(value) = values.get(&*field.name) else {
                continue;
            };
            for constraint in &field.constraints {
                constraint.check(value).map_err(|reason| {
                    Error::validation(root, prefix.join_field(Arc::clone(&field.name)), reason)
                })?;
            }
        }
        Ok(())
    }

    fn run_validators(&self, root: &str, values: &AttrMap, prefix: &FieldPath) -> Result<()> {
        for validator in &self.validators {
            if let Some(violation) = validator.check(values) {
                return Err(Error::validation(
                    root,
                    prefix.join_path(&violation.path),
                    violation.reason,
                ));
            }
        }
        Ok(())
    }
}

fn check_field_type(root: &str, ty: &FieldType, value: &Value, path: &FieldPath) -> Result<Value> {
    match ty {
        FieldType::Scalar(ty) => check_scalar(root, ty, value, path),
        FieldType::Record(schema) => match value {
            Value::Map(map) => schema.check(root, map, path).map(Value::Map),
            other => Err(mismatch(root, ty, other, path)),
        },
        FieldType::List(item) => match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| check_field_type(root, item, v, &path.join_index(i)))
                .collect::<Result<LtVec<Value>>>()
                .map(Value::List),
            other => Err(mismatch(root, ty, other, path)),
        },
        FieldType::Map(inner) => match value {
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| {
                    check_field_type(root, inner, v, &path.join_key(Arc::clone(k)))
                        .map(|v| (Arc::clone(k), v))
                })
                .collect::<Result<AttrMap>>()
                .map(Value::Map),
            other => Err(mismatch(root, ty, other, path)),
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_scalar(root: &str, ty: &Type, value: &Value, path: &FieldPath) -> Result<Value> {
    if !ty.accepts(&value.value_type()) {
        return Err(mismatch(root, ty, value, path));
    }

    match (ty, value) {
        (Type::Float, Value::Int(n)) => Ok(Value::Float(*n as f64)),
        (Type::Option(inner), v) if !v.is_nil() => check_scalar(root, inner, v, path),
        (Type::List(element), Value::List(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| check_scalar(root, element, v, &path.join_index(i)))
            .collect::<Result<LtVec<Value>>>()
            .map(Value::List),
        (Type::Map(element), Value::Map(map)) => map
            .iter()
            .map(|(k, v)| {
                check_scalar(root, element, v, &path.join_key(Arc::clone(k)))
                    .map(|v| (Arc::clone(k), v))
            })
            .collect::<Result<AttrMap>>()
            .map(Value::Map),
        _ => Ok(value.clone()),
    }
}

fn mismatch(root: &str, expected: &impl std::fmt::Display, value: &Value, path: &FieldPath) -> Error {
    Error::validation(
        root,
        path.clone(),
        format!("expected {expected}, got {}", value.value_type()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Constraint, Format};
    use crate::schema::FieldSchema;
    use crate::validator::Validator;
    use stratus_foundation::{ContextId, ErrorKind, Reference, attrs};

    fn listener() -> AttributeSchema {
        AttributeSchema::new("listener")
            .with_field(
                FieldSchema::required("port", Type::Int)
                    .with_constraint(Constraint::range(1.0, 65535.0)),
            )
            .with_field(
                FieldSchema::optional("protocol", Type::String, "HTTP")
                    .with_constraint(Constraint::one_of(["HTTP", "HTTPS"])),
            )
    }

    fn load_balancer() -> AttributeSchema {
        AttributeSchema::new("aws_lb")
            .with_field(
                FieldSchema::required("name", Type::String)
                    .with_constraint(Constraint::Format(Format::Identifier)),
            )
            .with_field(FieldSchema::optional("internal", Type::Bool, false))
            .with_field(FieldSchema::optional("idle_timeout", Type::Float, 60))
            .with_field(FieldSchema::required(
                "subnets",
                Type::list(Type::String),
            ))
            .with_field(FieldSchema::optional_unset(
                "listeners",
                FieldType::list_of(FieldType::record(listener())),
            ))
            .with_field(FieldSchema::optional_unset("tags", Type::map(Type::String)))
    }

    fn validation_path(err: &Error) -> String {
        match &err.kind {
            ErrorKind::Validation { path, .. } => path.to_string(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_applied_and_unset_omitted() {
        let attrs = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec!["a", "b"] })
            .unwrap();

        assert_eq!(attrs.get("internal"), Some(&Value::Bool(false)));
        assert!(!attrs.contains("listeners"));
        assert!(!attrs.contains("tags"));
        assert_eq!(attrs.schema_name(), "aws_lb");
    }

    #[test]
    fn int_promoted_for_float_fields() {
        let attrs = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec!["a"], "idle_timeout" => 30 })
            .unwrap();
        assert_eq!(attrs.get("idle_timeout"), Some(&Value::Float(30.0)));
    }

    #[test]
    fn explicit_nil_counts_as_absent() {
        let attrs = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec!["a"], "internal" => Value::Nil })
            .unwrap();
        assert_eq!(attrs.get("internal"), Some(&Value::Bool(false)));

        let err = load_balancer()
            .instantiate(&attrs! { "name" => Value::Nil, "subnets" => vec!["a"] })
            .unwrap_err();
        assert_eq!(validation_path(&err), "name");
    }

    #[test]
    fn missing_required_field() {
        let err = load_balancer().instantiate(&attrs! { "name" => "web" }).unwrap_err();
        assert_eq!(validation_path(&err), "subnets");
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec!["a"], "colour" => "red" })
            .unwrap_err();
        assert_eq!(validation_path(&err), "colour");
    }

    #[test]
    fn unknown_field_passthrough() {
        let schema = AttributeSchema::new("web_application")
            .with_field(FieldSchema::required("domain_name", Type::String))
            .passthrough();
        let attrs = schema
            .instantiate(&attrs! { "domain_name" => "example.com", "team" => "payments" })
            .unwrap();
        assert_eq!(attrs.get("team"), Some(&Value::from("payments")));
    }

    #[test]
    fn nested_record_failure_reports_full_path() {
        let raw = attrs! {
            "name" => "web",
            "subnets" => vec!["a"],
            "listeners" => vec![
                Value::Map(attrs! { "port" => 80 }),
                Value::Map(attrs! { "port" => 443, "protocol" => "TLS" }),
            ],
        };
        let err = load_balancer().instantiate(&raw).unwrap_err();
        assert_eq!(validation_path(&err), "listeners[1].protocol");
        match &err.kind {
            ErrorKind::Validation { schema, .. } => assert_eq!(schema, "aws_lb"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nested_defaults_applied() {
        let raw = attrs! {
            "name" => "web",
            "subnets" => vec!["a"],
            "listeners" => vec![Value::Map(attrs! { "port" => 80 })],
        };
        let attrs = load_balancer().instantiate(&raw).unwrap();
        let first = attrs.list("listeners").unwrap().first().unwrap().clone();
        assert_eq!(
            first.as_map().unwrap().get("protocol"),
            Some(&Value::from("HTTP"))
        );
    }

    #[test]
    fn list_element_type_checked() {
        let err = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec![Value::from("a"), Value::Int(2)] })
            .unwrap_err();
        assert_eq!(validation_path(&err), "subnets[1]");
    }

    #[test]
    fn map_value_type_checked() {
        let err = load_balancer()
            .instantiate(&attrs! {
                "name" => "web",
                "subnets" => vec!["a"],
                "tags" => attrs! { "Name" => "web", "Cost" => 5 },
            })
            .unwrap_err();
        assert_eq!(validation_path(&err), "tags[\"Cost\"]");
    }

    #[test]
    fn references_accepted_for_strings() {
        let subnet = Reference::mint(ContextId::next(), "aws_subnet", "public", "id");
        let attrs = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec![subnet.clone()] })
            .unwrap();
        assert_eq!(attrs.references(), vec![subnet]);
    }

    #[test]
    fn type_phase_runs_before_constraints() {
        // `name` violates its format, but `internal` has the wrong type; the
        // type phase covers every field before any constraint runs.
        let err = load_balancer()
            .instantiate(&attrs! { "name" => "Web", "subnets" => vec!["a"], "internal" => "yes" })
            .unwrap_err();
        assert_eq!(validation_path(&err), "internal");
    }

    #[test]
    fn validators_run_last() {
        let schema = AttributeSchema::new("aws_db_instance")
            .with_field(FieldSchema::optional_unset("engine", Type::String))
            .with_field(FieldSchema::optional_unset("snapshot_identifier", Type::String))
            .with_field(
                FieldSchema::optional("allocated_storage", Type::Int, 20)
                    .with_constraint(Constraint::at_least(20.0)),
            )
            .with_validator(Validator::exactly_one_of(["engine", "snapshot_identifier"]));

        assert!(schema.instantiate(&attrs! { "engine" => "postgres" }).is_ok());

        // Constraint failure wins over the validator failure.
        let err = schema
            .instantiate(&attrs! { "allocated_storage" => 5 })
            .unwrap_err();
        assert_eq!(validation_path(&err), "allocated_storage");

        let err = schema.instantiate(&attrs! {}).unwrap_err();
        assert_eq!(validation_path(&err), "<root>");
    }

    #[test]
    fn nested_validator_path_is_prefixed() {
        let scaling = AttributeSchema::new("auto_scaling")
            .with_field(FieldSchema::optional("min", Type::Int, 1))
            .with_field(FieldSchema::optional("max", Type::Int, 1))
            .with_validator(Validator::custom("min_le_max", |attrs| {
                let min = attrs.get("min").and_then(Value::as_int)?;
                let max = attrs.get("max").and_then(Value::as_int)?;
                (min > max).then(|| crate::Violation::field("min", "must not exceed max"))
            }));
        let schema = AttributeSchema::new("compute").with_field(FieldSchema::optional(
            "auto_scaling",
            FieldType::record(scaling),
            AttrMap::new(),
        ));

        let attrs = schema.instantiate(&attrs! {}).unwrap();
        assert_eq!(attrs.get_path("auto_scaling.max"), Some(&Value::Int(1)));

        let err = schema
            .instantiate(&attrs! { "auto_scaling" => attrs! { "min" => 4, "max" => 2 } })
            .unwrap_err();
        assert_eq!(validation_path(&err), "auto_scaling.min");
    }

    #[test]
    fn record_requires_map() {
        let err = load_balancer()
            .instantiate(&attrs! { "name" => "web", "subnets" => vec!["a"], "listeners" => vec![80] })
            .unwrap_err();
        assert_eq!(validation_path(&err), "listeners[0]");
        assert!(err.to_string().contains("record<listener>"));
    }

    #[test]
    fn instantiation_is_pure() {
        let raw = attrs! { "name" => "web", "subnets" => vec!["a"] };
        let first = load_balancer().instantiate(&raw).unwrap();
        let second = load_balancer().instantiate(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(raw.len(), 2);
    }
}
