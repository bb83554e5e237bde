//! Synthesized documents across environments and encodings

use stratus_compose::Environment;
use stratus_foundation::{Value, attrs};
use stratus_runtime::{OutputFormat, Session, SynthConfig, to_json, to_msgpack};

use crate::{session, shop};

// =============================================================================
// Environments
// =============================================================================

#[test]
fn every_environment_synthesizes() {
    let session = session();
    for environment in Environment::ALL {
        let raw = shop().insert("environment".into(), Value::from(environment.as_str()));
        let synthesis = session
            .synthesize("web_application", "shop", &raw)
            .unwrap_or_else(|e| panic!("{environment}: {e}"));
        let doc = synthesis.document();

        assert!(doc.resource("aws_vpc", "shop").is_some(), "{environment}");
        assert!(doc.resource("aws_lb", "shop").is_some(), "{environment}");
        assert_eq!(
            doc.output("application_url"),
            Some(&Value::from("https://example.com"))
        );
        assert_eq!(
            doc.output("dashboard_url").is_some(),
            environment != Environment::Development,
            "{environment}"
        );
    }
}

#[test]
fn production_database_is_hardened() {
    let raw = shop().insert("environment".into(), Value::from("production"));
    let synthesis = session().synthesize("web_application", "shop", &raw).unwrap();
    let database = synthesis.document().resource("aws_db_instance", "shop").unwrap();

    assert_eq!(database.get("multi_az"), Some(&Value::Bool(true)));
    assert_eq!(database.get("deletion_protection"), Some(&Value::Bool(true)));
    assert_eq!(database.get("storage_encrypted"), Some(&Value::Bool(true)));
}

#[test]
fn outputs_are_placeholders_into_the_document() {
    let synthesis = session().synthesize("web_application", "shop", &shop()).unwrap();
    let doc = synthesis.document();
    assert_eq!(
        doc.output("vpc_id").map(Value::render),
        Some("${aws_vpc.shop.id}".to_string())
    );
    assert_eq!(
        doc.output("load_balancer_dns").map(Value::render),
        Some("${aws_lb.shop.dns_name}".to_string())
    );
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn separate_sessions_emit_identical_bytes() {
    let raw = attrs! {
        "domain_name" => "example.com",
        "environment" => "production",
        "enable_caching" => true,
        "enable_cdn" => true,
    };
    let first = session().synthesize("web_application", "shop", &raw).unwrap();
    let second = session().synthesize("web_application", "shop", &raw).unwrap();

    assert_eq!(first.document(), second.document());
    assert_eq!(
        to_json(first.document()).unwrap(),
        to_json(second.document()).unwrap()
    );
    assert_eq!(
        to_msgpack(first.document()).unwrap(),
        to_msgpack(second.document()).unwrap()
    );
}

#[test]
fn msgpack_and_json_carry_the_same_tree() {
    let synthesis = session().synthesize("web_application", "shop", &shop()).unwrap();
    let from_json: serde_json::Value =
        serde_json::from_str(&to_json(synthesis.document()).unwrap()).unwrap();
    let from_msgpack: serde_json::Value =
        rmp_serde::from_slice(&to_msgpack(synthesis.document()).unwrap()).unwrap();
    assert_eq!(from_json, from_msgpack);
}

#[test]
fn render_honours_the_configured_format() {
    let session = Session::new(SynthConfig::new().with_format(OutputFormat::Msgpack)).unwrap();
    let bytes = session.render("web_application", "shop", &shop()).unwrap();
    let synthesis = session.synthesize("web_application", "shop", &shop()).unwrap();
    assert_eq!(bytes, to_msgpack(synthesis.document()).unwrap());
}
