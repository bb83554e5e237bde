//! Integration tests for Reference and FieldPath

use std::collections::HashSet;

use stratus_foundation::{ContextId, FieldPath, Reference, Value};

// =============================================================================
// Reference identity
// =============================================================================

#[test]
fn identity_ignores_the_minting_context() {
    let a = Reference::mint(ContextId::next(), "aws_vpc", "main", "id");
    let b = Reference::mint(ContextId::next(), "aws_vpc", "main", "id");
    assert_ne!(a.origin(), b.origin());
    assert_eq!(a, b);

    let set: HashSet<Reference> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn every_part_of_the_triple_matters() {
    let ctx = ContextId::next();
    let base = Reference::mint(ctx, "aws_vpc", "main", "id");
    assert_ne!(base, Reference::mint(ctx, "aws_subnet", "main", "id"));
    assert_ne!(base, Reference::mint(ctx, "aws_vpc", "other", "id"));
    assert_ne!(base, Reference::mint(ctx, "aws_vpc", "main", "arn"));
}

#[test]
fn sibling_keeps_the_origin() {
    let id = Reference::mint(ContextId::next(), "aws_lb", "web", "id");
    let dns = id.sibling("dns_name");
    assert!(dns.is_from(id.origin()));
    assert_eq!(dns.render(), "${aws_lb.web.dns_name}");
}

#[test]
fn references_are_values() {
    let r = Reference::mint(ContextId::next(), "aws_vpc", "main", "id");
    let value = Value::from(&r);
    assert_eq!(value.as_reference(), Some(&r));
    assert_eq!(value.render(), "${aws_vpc.main.id}");
}

#[test]
fn context_ids_are_unique() {
    let ids: HashSet<ContextId> = (0..64).map(|_| ContextId::next()).collect();
    assert_eq!(ids.len(), 64);
}

// =============================================================================
// Field paths
// =============================================================================

#[test]
fn nested_path_display() {
    let path = FieldPath::field("ingress").join_index(0).join_field("to_port");
    assert_eq!(path.to_string(), "ingress[0].to_port");
    assert_eq!(FieldPath::root().to_string(), "<root>");
}
