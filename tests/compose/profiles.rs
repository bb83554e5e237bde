//! Integration tests for profile defaults and attribute precedence

use stratus_compose::{Composer, CompositionState, Environment, Profile};
use stratus_foundation::{ErrorKind, Value, attrs};
use stratus_synth::SynthesisContext;

use crate::{catalog_components, compose_in, kinds};

#[test]
fn caller_beats_profile_beats_schema_default() {
    let mut ctx = SynthesisContext::new(kinds());
    let app = compose_in(
        &mut ctx,
        catalog_components(),
        &attrs! {
            "domain_name" => "example.com",
            "environment" => "production",
            "auto_scaling" => attrs! { "max" => 8 },
        },
    )
    .unwrap();
    let attributes = app.attributes();

    // Caller value, merged into the profile's record.
    assert_eq!(attributes.get_path("auto_scaling.max"), Some(&Value::Int(8)));
    assert_eq!(attributes.get_path("auto_scaling.min"), Some(&Value::Int(2)));
    // Profile value.
    assert_eq!(attributes.str("instance_type").unwrap(), "m5.large");
    // Schema default.
    assert_eq!(attributes.str("region").unwrap(), "us-east-1");
}

#[test]
fn composer_environment_applies_when_attributes_name_none() {
    let mut ctx = SynthesisContext::new(kinds());
    let mut composer = Composer::new(&mut ctx, catalog_components())
        .with_profile(Profile::standard())
        .with_environment(Environment::Staging);
    let app = stratus_catalog::web_application(
        &mut composer,
        "shop",
        &attrs! { "domain_name" => "example.com" },
    )
    .unwrap();

    assert_eq!(app.attributes().str("environment").unwrap(), "staging");
    assert_eq!(app.attributes().str("instance_type").unwrap(), "t3.small");
    // Staging enables monitoring through its profile.
    assert!(app.has_member("monitoring"));
}

#[test]
fn empty_profile_leaves_schema_defaults() {
    let mut ctx = SynthesisContext::new(kinds());
    let mut composer = Composer::new(&mut ctx, catalog_components());
    let app = stratus_catalog::web_application(
        &mut composer,
        "shop",
        &attrs! { "domain_name" => "example.com", "environment" => "production" },
    )
    .unwrap();

    assert_eq!(app.attributes().str("instance_type").unwrap(), "t3.micro");
    assert!(!app.has_member("monitoring"));
    assert_eq!(composer.last_state(), Some(CompositionState::Done));
}

#[test]
fn profile_override_reaches_the_document() {
    let profile = Profile::standard().with_defaults(
        Environment::Production,
        attrs! { "database" => attrs! { "backup_retention_days" => 35 } },
    );
    let mut ctx = SynthesisContext::new(kinds());
    {
        let mut composer = Composer::new(&mut ctx, catalog_components()).with_profile(profile);
        stratus_catalog::web_application(
            &mut composer,
            "shop",
            &attrs! { "domain_name" => "example.com", "environment" => "production" },
        )
        .unwrap();
    }

    let doc = ctx.emit();
    let database = doc.resource("aws_db_instance", "shop").unwrap();
    assert_eq!(database.get("backup_retention_period"), Some(&Value::Int(35)));
    assert_eq!(database.get("multi_az"), Some(&Value::Bool(true)));
}

#[test]
fn invalid_profile_value_fails_validation() {
    let profile = Profile::empty()
        .with_defaults(Environment::Development, attrs! { "instance_type" => "huge" });
    let mut ctx = SynthesisContext::new(kinds());
    let mut composer = Composer::new(&mut ctx, catalog_components()).with_profile(profile);
    let err = stratus_catalog::web_application(
        &mut composer,
        "shop",
        &attrs! { "domain_name" => "example.com" },
    )
    .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Validation { .. }));
    assert_eq!(err.path().map(ToString::to_string), Some("instance_type".to_string()));
    assert_eq!(composer.last_state(), Some(CompositionState::MergingAttrs));
}

#[test]
fn computed_properties_are_recomputable_from_the_aggregate() {
    let mut ctx = SynthesisContext::new(kinds());
    let app = compose_in(
        &mut ctx,
        catalog_components(),
        &attrs! { "domain_name" => "example.com", "environment" => "staging" },
    )
    .unwrap();

    let snapshot = app.clone();
    for name in ["capabilities", "estimated_monthly_cost", "security_score"] {
        let first = app.computed(name).unwrap();
        assert_eq!(app.computed(name), Some(first.clone()), "{name}");
        assert_eq!(snapshot.computed(name), Some(first), "{name}");
    }
    assert_eq!(app.computed_values(), snapshot.computed_values());
}
