//! Integration tests for schema instantiation

use stratus_foundation::{ContextId, ErrorKind, Reference, Type, Value, attrs};
use stratus_schema::{
    AttributeSchema, Constraint, FieldSchema, FieldType, Format, Validator, Violation,
};

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
        .with_field(FieldSchema::optional_unset("certificate_arn", Type::String))
        .with_validator(Validator::custom("https needs a certificate", |attrs| {
            let https = attrs.get("protocol").and_then(Value::as_str) == Some("HTTPS");
            let cert = attrs.get("certificate_arn").is_some_and(|v| !v.is_nil());
            (https && !cert).then(|| Violation::field("certificate_arn", "required for HTTPS"))
        }))
}

fn balancer() -> AttributeSchema {
    AttributeSchema::new("balancer")
        .with_field(
            FieldSchema::required("name", Type::String)
                .with_constraint(Constraint::Format(Format::Identifier)),
        )
        .with_field(
            FieldSchema::required("subnets", Type::list(Type::String))
                .with_constraint(Constraint::length(2, 16)),
        )
        .with_field(FieldSchema::optional(
            "listeners",
            FieldType::list_of(FieldType::record(listener())),
            Vec::<Value>::new(),
        ))
        .with_field(FieldSchema::optional("internal", Type::Bool, false))
        .with_field(FieldSchema::optional_unset("public_zone", Type::String))
        .with_validator(Validator::mutually_exclusive(["internal", "public_zone"]))
}

fn path_of(raw: &stratus_foundation::AttrMap) -> String {
    let err = balancer().instantiate(raw).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation { .. }));
    err.path().map(ToString::to_string).unwrap_or_default()
}

// =============================================================================
// Success
// =============================================================================

#[test]
fn defaults_fill_and_unset_fields_are_omitted() {
    let validated = balancer()
        .instantiate(&attrs! { "name" => "web", "subnets" => vec!["a", "b"] })
        .unwrap();
    assert_eq!(validated.get("internal"), Some(&Value::Bool(false)));
    assert!(validated.get("public_zone").is_none());
    assert_eq!(validated.list("listeners").map(|l| l.len()), Some(0));
    assert_eq!(validated.schema_name(), "balancer");
}

#[test]
fn nested_records_get_their_defaults() {
    let validated = balancer()
        .instantiate(&attrs! {
            "name" => "web",
            "subnets" => vec!["a", "b"],
            "listeners" => vec![Value::from(attrs! { "port" => 80 })],
        })
        .unwrap();
    let listener = validated.list("listeners").and_then(|l| l.first()).and_then(Value::as_map);
    assert_eq!(listener.and_then(|l| l.get("protocol")), Some(&Value::from("HTTP")));
}

#[test]
fn references_satisfy_typed_fields() {
    let subnet = Reference::mint(ContextId::next(), "aws_subnet", "a", "id");
    let validated = balancer()
        .instantiate(&attrs! {
            "name" => "web",
            "subnets" => vec![Value::from(&subnet), Value::from(subnet.sibling("arn"))],
        })
        .unwrap();
    assert_eq!(validated.references().len(), 2);
}

#[test]
fn explicit_nil_counts_as_absent() {
    let validated = balancer()
        .instantiate(&attrs! {
            "name" => "web",
            "subnets" => vec!["a", "b"],
            "internal" => Value::Nil,
        })
        .unwrap();
    assert_eq!(validated.get("internal"), Some(&Value::Bool(false)));
}

// =============================================================================
// Failure paths
// =============================================================================

#[test]
fn unknown_field_is_reported_at_its_path() {
    assert_eq!(
        path_of(&attrs! { "name" => "web", "subnets" => vec!["a", "b"], "colour" => "red" }),
        "colour"
    );
}

#[test]
fn missing_required_field() {
    assert_eq!(path_of(&attrs! { "name" => "web" }), "subnets");
}

#[test]
fn type_errors_carry_list_indices() {
    assert_eq!(
        path_of(&attrs! { "name" => "web", "subnets" => vec![Value::from("a"), Value::Int(2)] }),
        "subnets[1]"
    );
}

#[test]
fn nested_constraint_failure() {
    assert_eq!(
        path_of(&attrs! {
            "name" => "web",
            "subnets" => vec!["a", "b"],
            "listeners" => vec![
                Value::from(attrs! { "port" => 443, "protocol" => "HTTPS", "certificate_arn" => "arn" }),
                Value::from(attrs! { "port" => 70000 }),
            ],
        }),
        "listeners[1].port"
    );
}

#[test]
fn nested_validator_failure() {
    assert_eq!(
        path_of(&attrs! {
            "name" => "web",
            "subnets" => vec!["a", "b"],
            "listeners" => vec![Value::from(attrs! { "port" => 443, "protocol" => "HTTPS" })],
        }),
        "listeners[0].certificate_arn"
    );
}

#[test]
fn cross_field_validator_runs_last() {
    assert_eq!(
        path_of(&attrs! {
            "name" => "web",
            "subnets" => vec!["a", "b"],
            "internal" => true,
            "public_zone" => "Z1",
        }),
        "public_zone"
    );
}

#[test]
fn first_failure_wins() {
    // Type errors are found before constraint errors, whatever the field
    // order: `subnets` is too short but `name` has the wrong type.
    let err = balancer()
        .instantiate(&attrs! { "name" => 5, "subnets" => vec!["a"] })
        .unwrap_err();
    assert_eq!(err.path().map(ToString::to_string), Some("name".to_string()));

    // Shape errors are found before type errors.
    let err = balancer()
        .instantiate(&attrs! { "name" => 5, "zones" => 1, "subnets" => vec!["a", "b"] })
        .unwrap_err();
    assert_eq!(err.path().map(ToString::to_string), Some("zones".to_string()));
}

#[test]
fn format_failure_names_the_format() {
    let err = balancer()
        .instantiate(&attrs! { "name" => "Web", "subnets" => vec!["a", "b"] })
        .unwrap_err();
    assert!(err.to_string().contains("identifier"));
}
