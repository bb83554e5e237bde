//! Integration tests for the synthesis context

use stratus_catalog::kinds::{data, network};
use stratus_foundation::{ErrorKind, Value, attrs};

use crate::context;

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn declare_returns_one_reference_per_output() {
    let mut ctx = context();
    let vpc = network::vpc(&mut ctx, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    assert_eq!(vpc.id().unwrap().render(), "${aws_vpc.main.id}");
    assert!(vpc.output("arn").is_some());
    assert!(vpc.output("endpoint").is_none());
    assert!(matches!(
        vpc.require("endpoint").unwrap_err().kind,
        ErrorKind::DanglingReference(_)
    ));
}

#[test]
fn duplicate_declaration_is_rejected_and_the_first_survives() {
    let mut ctx = context();
    data::sqs_queue(&mut ctx, "orders", &attrs! { "fifo" => true }).unwrap();
    let err = data::sqs_queue(&mut ctx, "orders", &attrs! {}).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));

    assert_eq!(ctx.declarations().len(), 1);
    let doc = ctx.emit();
    let queue = doc.resource("aws_sqs_queue", "orders").unwrap();
    assert_eq!(queue.get("fifo"), Some(&Value::Bool(true)));
}

#[test]
fn same_name_under_another_kind_is_fine() {
    let mut ctx = context();
    data::sqs_queue(&mut ctx, "orders", &attrs! {}).unwrap();
    network::vpc(&mut ctx, "orders", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    assert_eq!(ctx.declarations().len(), 2);
}

#[test]
fn unknown_kind_declares_nothing() {
    let mut ctx = context();
    let err = ctx.declare("aws_nat_gateway", "nat", &attrs! {}).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownKind(_)));
    assert!(ctx.declarations().is_empty());
}

#[test]
fn validation_failure_declares_nothing() {
    let mut ctx = context();
    let err = network::vpc(&mut ctx, "main", &attrs! { "cidr_block" => "10.0.0/16" }).unwrap_err();
    assert_eq!(err.path().map(ToString::to_string), Some("cidr_block".to_string()));
    assert!(ctx.emit().is_empty());
}

// =============================================================================
// References
// =============================================================================

#[test]
fn references_from_another_context_are_foreign() {
    let mut first = context();
    let mut second = context();
    let vpc = network::vpc(&mut first, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();

    // The same (kind, name) exists in the second context too; the
    // reference is still foreign there.
    network::vpc(&mut second, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    let err = network::subnet(
        &mut second,
        "a",
        &attrs! { "vpc_id" => vpc.id().unwrap(), "cidr_block" => "10.0.1.0/24" },
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ForeignReference(_)));
}

#[test]
fn references_to_undeclared_outputs_dangle() {
    let mut ctx = context();
    let vpc = network::vpc(&mut ctx, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    let bogus = vpc.id().unwrap().sibling("not_an_output");
    let err = network::subnet(
        &mut ctx,
        "a",
        &attrs! { "vpc_id" => bogus, "cidr_block" => "10.0.1.0/24" },
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DanglingReference(_)));
}

#[test]
fn reference_lookup_by_name() {
    let mut ctx = context();
    network::vpc(&mut ctx, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    assert!(ctx.reference("aws_vpc", "main", "arn").is_ok());
    assert!(ctx.reference("aws_vpc", "other", "arn").is_err());
}

// =============================================================================
// Computed properties
// =============================================================================

#[test]
fn computed_properties_are_pure() {
    let attrs = attrs! { "cidr_block" => "10.0.0.0/16" };
    let mut first = context();
    let mut second = context();
    let a = network::vpc(&mut first, "main", &attrs).unwrap();
    let b = network::vpc(&mut second, "other", &attrs).unwrap();
    assert_eq!(a.computed("address_count"), Some(&Value::Int(65_536)));
    assert_eq!(a.computed_values(), b.computed_values());
}

#[test]
fn computed_properties_do_not_reach_the_document() {
    let mut ctx = context();
    network::vpc(&mut ctx, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    let doc = ctx.emit();
    assert!(doc.resource("aws_vpc", "main").unwrap().get("address_count").is_none());
}
