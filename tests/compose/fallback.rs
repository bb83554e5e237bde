//! Integration tests for fallback members

use stratus_catalog::components::{compute, database, network};
use stratus_compose::{AggregateReference, Component};
use stratus_foundation::{ErrorKind, Value, attrs};
use stratus_synth::SynthesisContext;

use crate::{catalog_components, compose_in, kinds, only};

fn output_names(application: &AggregateReference, member: &str) -> Vec<String> {
    application
        .member(member)
        .and_then(|m| m.as_component())
        .map(|aggregate| aggregate.outputs().keys().map(ToString::to_string).collect())
        .unwrap_or_default()
}

// =============================================================================
// Output Parity
// =============================================================================

#[test]
fn fallbacks_publish_the_same_outputs_as_components() {
    let raw = attrs! { "domain_name" => "example.com" };

    let mut ctx = SynthesisContext::new(kinds());
    let regular = compose_in(&mut ctx, catalog_components(), &raw).unwrap();

    let mut ctx = SynthesisContext::new(kinds());
    let fallback = compose_in(&mut ctx, only(Vec::new()), &raw).unwrap();
    assert_eq!(fallback.fallback_members(), vec!["network", "compute", "database"]);

    for (member, outputs) in [
        ("network", network::OUTPUTS),
        ("compute", compute::OUTPUTS),
        ("database", database::OUTPUTS),
    ] {
        let mut expected: Vec<String> = outputs.iter().map(ToString::to_string).collect();
        expected.sort();
        assert_eq!(output_names(&regular, member), expected, "{member}");
        assert_eq!(output_names(&fallback, member), expected, "{member}");
    }

    let keys = |a: &AggregateReference| a.outputs().keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&regular), keys(&fallback));
}

#[test]
fn only_a_network_component_registered() {
    let components = only(vec![Component::new(
        network::CAPABILITY,
        "tests",
        network::minimal,
    )]);
    let mut ctx = SynthesisContext::new(kinds());
    let app = compose_in(
        &mut ctx,
        components,
        &attrs! { "domain_name" => "example.com", "environment" => "development" },
    )
    .unwrap();

    assert!(!app.member("network").unwrap().is_fallback());
    assert_eq!(app.fallback_members(), vec!["compute", "database"]);
    assert_eq!(app.output("application_url"), Some(&Value::from("https://example.com")));

    let capabilities = app.computed("capabilities").unwrap();
    let capabilities = capabilities.as_map().unwrap();
    assert_eq!(capabilities.get("caching"), Some(&Value::Bool(false)));
    assert_eq!(capabilities.get("high_availability"), Some(&Value::Bool(false)));
    assert_eq!(
        capabilities.get("fallback_members"),
        Some(&Value::from(vec!["compute", "database"]))
    );
}

#[test]
fn fallback_declarations_land_in_the_document() {
    let mut ctx = SynthesisContext::new(kinds());
    compose_in(&mut ctx, only(Vec::new()), &attrs! { "domain_name" => "example.com" }).unwrap();
    let doc = ctx.emit();

    assert!(doc.resource("aws_vpc", "shop").is_some());
    assert_eq!(doc.group("aws_security_group").map(|g| g.len()), Some(1));
    assert!(doc.resource("aws_db_instance", "shop").is_some());
    assert!(doc.group("aws_lb").is_none());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn enabled_member_without_a_component_is_fatal() {
    let mut ctx = SynthesisContext::new(kinds());
    let err = compose_in(
        &mut ctx,
        only(Vec::new()),
        &attrs! { "domain_name" => "example.com", "enable_caching" => true },
    )
    .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UnknownKind(ref name) if name.contains("cache")));
    let stack = err.context.unwrap().stack;
    assert_eq!(stack, vec!["member cache", "composition web_application shop"]);
}

#[test]
fn recomposing_a_name_in_one_context_collides() {
    let mut ctx = SynthesisContext::new(kinds());
    let components = catalog_components();
    compose_in(&mut ctx, components.clone(), &attrs! { "domain_name" => "example.com" }).unwrap();

    let err = compose_in(&mut ctx, components, &attrs! { "domain_name" => "example.org" })
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
}
