//! Integration tests for document emission and serialization

use stratus_catalog::kinds::{compute, network};
use stratus_foundation::{ErrorKind, attrs};
use stratus_runtime::{to_json, to_msgpack};
use stratus_synth::{Document, SynthesisContext};

use crate::context;

fn declare_stack(ctx: &mut SynthesisContext) {
    let vpc = network::vpc(ctx, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    let a = network::subnet(
        ctx,
        "public-a",
        &attrs! { "vpc_id" => vpc.id().unwrap(), "cidr_block" => "10.0.1.0/24" },
    )
    .unwrap();
    let b = network::subnet(
        ctx,
        "public-b",
        &attrs! { "vpc_id" => vpc.id().unwrap(), "cidr_block" => "10.0.2.0/24" },
    )
    .unwrap();
    let lb = compute::load_balancer(
        ctx,
        "web",
        &attrs! { "subnets" => vec![a.id().unwrap(), b.id().unwrap()] },
    )
    .unwrap();
    ctx.export("dns", lb.require("dns_name").unwrap()).unwrap();
    ctx.export("owner", "platform").unwrap();
}

fn emit() -> Document {
    let mut ctx = context();
    declare_stack(&mut ctx);
    ctx.emit()
}

#[test]
fn emission_is_byte_identical_across_contexts() {
    assert_eq!(to_json(&emit()).unwrap(), to_json(&emit()).unwrap());
    assert_eq!(to_msgpack(&emit()).unwrap(), to_msgpack(&emit()).unwrap());
}

#[test]
fn emitting_twice_from_one_context_is_identical() {
    let mut ctx = context();
    declare_stack(&mut ctx);
    assert_eq!(ctx.emit(), ctx.emit());
}

#[test]
fn groups_follow_first_declaration_order() {
    let doc = emit();
    let kinds: Vec<&str> = doc.groups().iter().map(|g| g.kind()).collect();
    assert_eq!(kinds, vec!["aws_vpc", "aws_subnet", "aws_lb"]);
    let subnets: Vec<&str> = doc.group("aws_subnet").unwrap().names().collect();
    assert_eq!(subnets, vec!["public-a", "public-b"]);
    assert_eq!(doc.resource_count(), 4);
}

#[test]
fn json_shape() {
    let json: serde_json::Value = serde_json::from_str(&to_json(&emit()).unwrap()).unwrap();
    assert_eq!(
        json["resource"]["aws_lb"]["web"]["subnets"][1],
        "${aws_subnet.public-b.id}"
    );
    assert_eq!(json["output"]["dns"]["value"], "${aws_lb.web.dns_name}");
    assert_eq!(json["output"]["owner"]["value"], "platform");
}

#[test]
fn outputs_keep_export_order() {
    let doc = emit();
    let names: Vec<&str> = doc.outputs().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["dns", "owner"]);
}

#[test]
fn duplicate_output_is_rejected() {
    let mut ctx = context();
    ctx.export("region", "us-east-1").unwrap();
    let err = ctx.export("region", "eu-west-1").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateOutput(_)));
}

#[test]
fn foreign_output_is_rejected() {
    let mut first = context();
    let vpc = network::vpc(&mut first, "main", &attrs! { "cidr_block" => "10.0.0.0/16" }).unwrap();
    let mut second = context();
    let err = second.export("vpc_id", vpc.id().unwrap()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ForeignReference(_)));
}
