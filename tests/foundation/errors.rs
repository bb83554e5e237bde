//! Integration tests for Error types
//!
//! Tests error construction, display, context frames, and error kinds.

use stratus_foundation::{Error, ErrorContext, ErrorKind, FieldPath, Type};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_validation() {
    let err = Error::validation("aws_vpc", FieldPath::field("cidr_block"), "not a CIDR block");
    assert!(matches!(err.kind, ErrorKind::Validation { .. }));
    assert_eq!(err.path().map(ToString::to_string), Some("cidr_block".to_string()));
    let msg = format!("{err}");
    assert!(msg.contains("aws_vpc"));
    assert!(msg.contains("not a CIDR block"));
}

#[test]
fn error_unknown_kind() {
    let err = Error::unknown_kind("aws_nat_gateway");
    assert!(matches!(err.kind, ErrorKind::UnknownKind(_)));
    assert!(err.path().is_none());
    assert!(format!("{err}").contains("aws_nat_gateway"));
}

#[test]
fn error_duplicate_declaration() {
    let err = Error::duplicate_declaration("aws_sqs_queue", "orders");
    assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
    assert!(format!("{err}").contains("aws_sqs_queue.orders"));
}

#[test]
fn error_ambiguous_registration() {
    let err = Error::ambiguous_registration("resource kind aws_vpc", "catalog", "plugin");
    let msg = format!("{err}");
    assert!(msg.contains("catalog"));
    assert!(msg.contains("plugin"));
}

#[test]
fn error_ordering_and_missing_output() {
    let err = Error::ordering_violation("cdn", "compute");
    assert!(matches!(err.kind, ErrorKind::OrderingViolation { .. }));
    let err = Error::missing_output("network", "vpc_id");
    assert!(matches!(err.kind, ErrorKind::MissingOutput { .. }));
    assert!(format!("{err}").contains("vpc_id"));
}

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(Type::Int, Type::String);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn frames_stack_innermost_first() {
    let err = Error::missing_output("network", "vpc_id")
        .with_frame("member network")
        .with_frame("composition web_application shop");
    let context = err.context.unwrap();
    assert_eq!(
        context.stack,
        vec!["member network", "composition web_application shop"]
    );
}

#[test]
fn context_display() {
    let context = ErrorContext::new()
        .with_source("stack.toml")
        .with_frame("resource aws_vpc.main");
    let text = context.to_string();
    assert!(text.starts_with("at stack.toml"));
    assert!(text.contains("  in resource aws_vpc.main"));
}
