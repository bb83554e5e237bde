//! Attribute files, assignments, and config files feeding a session

use std::path::PathBuf;

use proptest::prelude::*;
use stratus_foundation::{AttrMap, ErrorKind, Value};
use stratus_runtime::{Session, SynthConfig, apply_assignments, load_attributes};

use crate::{session, shop};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("stratus-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// Attribute Files
// =============================================================================

#[test]
fn toml_and_json_files_compose_alike() {
    let toml = temp_file(
        "attrs.toml",
        "domain_name = \"example.com\"\nenable_caching = true\n[auto_scaling]\nmax = 4\n",
    );
    let json = temp_file(
        "attrs.json",
        r#"{"domain_name": "example.com", "enable_caching": true, "auto_scaling": {"max": 4}}"#,
    );
    let from_toml = load_attributes(&toml).unwrap();
    let from_json = load_attributes(&json).unwrap();
    std::fs::remove_file(&toml).ok();
    std::fs::remove_file(&json).ok();

    assert_eq!(from_toml, from_json);
    let session = session();
    let a = session.synthesize("web_application", "shop", &from_toml).unwrap();
    let b = session.synthesize("web_application", "shop", &from_json).unwrap();
    assert_eq!(a.document(), b.document());
    assert!(a.document().output("cache_endpoint").is_some());
}

#[test]
fn unreadable_attribute_files() {
    let err = load_attributes("/nonexistent/stratus/attrs.json").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));

    let yaml = temp_file("attrs.yaml", "domain_name: example.com\n");
    let err = load_attributes(&yaml).unwrap_err();
    std::fs::remove_file(&yaml).ok();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
}

// =============================================================================
// Assignments
// =============================================================================

#[test]
fn assignments_layer_over_file_attributes() {
    let raw = apply_assignments(
        &shop(),
        &["enable_cdn=true", "auto_scaling.max=6", "auto_scaling.desired=2"],
    )
    .unwrap();
    let synthesis = session().synthesize("web_application", "shop", &raw).unwrap();
    let doc = synthesis.document();

    assert!(doc.resource("aws_cloudfront_distribution", "shop").is_some());
    let group = doc.resource("aws_autoscaling_group", "shop").unwrap();
    assert_eq!(group.get("max_size"), Some(&Value::Int(6)));
    assert_eq!(group.get("desired_capacity"), Some(&Value::Int(2)));
}

#[test]
fn invalid_assignment_surfaces_as_validation() {
    let raw = apply_assignments(&shop(), &["auto_scaling.min=5"]).unwrap();
    let err = session()
        .synthesize("web_application", "shop", &raw)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation { .. }));
    assert_eq!(
        err.context.map(|c| c.stack),
        Some(vec!["composition web_application shop".to_string()])
    );
}

proptest! {
    #[test]
    fn assigned_integers_round_trip(value in -1_000_000i64..1_000_000) {
        let raw = apply_assignments(&AttrMap::new(), &[format!("a.b={value}")]).unwrap();
        prop_assert_eq!(
            raw.get("a").and_then(Value::as_map).and_then(|m| m.get("b")),
            Some(&Value::Int(value))
        );
    }
}

// =============================================================================
// Config Files
// =============================================================================

#[test]
fn config_profile_overrides_reach_the_document() {
    let config = SynthConfig::from_toml_str(
        r#"
        environment = "production"

        [profile.production]
        instance_type = "m5.xlarge"
        "#,
    )
    .unwrap();
    let session = Session::new(config).unwrap();
    let synthesis = session.synthesize("web_application", "shop", &shop()).unwrap();

    let template = synthesis.document().resource("aws_launch_template", "shop").unwrap();
    assert_eq!(template.get("instance_type"), Some(&Value::from("m5.xlarge")));
    // The rest of the production profile still applies.
    let database = synthesis.document().resource("aws_db_instance", "shop").unwrap();
    assert_eq!(database.get("multi_az"), Some(&Value::Bool(true)));
}

#[test]
fn caller_attributes_beat_config_overrides() {
    let config = SynthConfig::new().with_profile_override(
        stratus_compose::Environment::Development,
        stratus_foundation::attrs! { "instance_type" => "t3.large" },
    );
    let raw = shop().insert("instance_type".into(), Value::from("t3.nano"));
    let synthesis = Session::new(config)
        .unwrap()
        .synthesize("web_application", "shop", &raw)
        .unwrap();
    assert_eq!(synthesis.aggregate().attributes().str("instance_type").unwrap(), "t3.nano");
}

#[test]
fn config_file_on_disk() {
    let path = temp_file("stratus.toml", "format = \"msgpack\"\npretty = true\n");
    let config = SynthConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.format, stratus_runtime::OutputFormat::Msgpack);
    assert!(config.pretty);
}
