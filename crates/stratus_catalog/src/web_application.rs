//! The `web_application` architecture.
//!
//! Members compose in a fixed order:
//!
//! ```text
//! network ─▶ compute ─▶ database ─▶ cache? ─▶ cdn? ─▶ monitoring?
//! ```
//!
//! Network, compute, and database fall back to minimal builders when no
//! component is registered for them. Cache, CDN, and monitoring are only
//! composed when enabled, and their outputs are omitted otherwise.

use std::sync::Arc;

use stratus_compose::{
    AggregateReference, Blueprint, ComponentRequest, Composer, OutputRule, submit_blueprint,
};
use stratus_foundation::{AttrMap, Error, LtVec, Result, Type, Value, attrs, merge_maps};
use stratus_schema::{
    AttributeSchema, Constraint, FieldSchema, FieldType, Format, ValidatedAttributes, Validator,
    Violation,
};

use crate::components::{cache, cdn, compute, database, monitoring, network};
use crate::estimate;
use crate::kinds::is_instance_class;

pub(crate) const PROVIDER: &str = module_path!();

/// Architecture name.
pub const KIND: &str = "web_application";

fn monitoring_schema() -> AttributeSchema {
    AttributeSchema::new("monitoring")
        .with_field(FieldSchema::optional("enabled", Type::Bool, false))
        .with_field(
            FieldSchema::optional("retention_days", Type::Int, 7)
                .with_constraint(Constraint::range(1.0, 3653.0)),
        )
}

fn security_schema() -> AttributeSchema {
    AttributeSchema::new("security")
        .with_field(FieldSchema::optional("encryption_at_rest", Type::Bool, true))
        .with_field(FieldSchema::optional("enforce_https", Type::Bool, true))
        .with_field(FieldSchema::optional("waf_enabled", Type::Bool, false))
        .with_field(
            FieldSchema::optional("allowed_cidrs", Type::list(Type::String), vec!["0.0.0.0/0"])
                .with_constraint(Constraint::non_empty()),
        )
}

/// Attribute schema of the architecture.
#[must_use]
pub fn schema() -> AttributeSchema {
    AttributeSchema::new(KIND)
        .with_field(
            FieldSchema::required("domain_name", Type::String)
                .with_constraint(Constraint::Format(Format::DomainName))
                .describe("Public domain the application is served from"),
        )
        .with_field(
            FieldSchema::optional("environment", Type::String, "development")
                .with_constraint(Constraint::one_of(["development", "staging", "production"])),
        )
        .with_field(
            FieldSchema::optional("instance_type", Type::String, "t3.micro").with_constraint(
                Constraint::predicate("an instance type such as t3.micro", is_instance_class),
            ),
        )
        .with_field(FieldSchema::optional(
            "auto_scaling",
            FieldType::record(compute::scaling_schema()),
            AttrMap::new(),
        ))
        .with_field(FieldSchema::optional(
            "database",
            FieldType::record(database::schema()),
            AttrMap::new(),
        ))
        .with_field(FieldSchema::optional(
            "monitoring",
            FieldType::record(monitoring_schema()),
            AttrMap::new(),
        ))
        .with_field(FieldSchema::optional(
            "security",
            FieldType::record(security_schema()),
            AttrMap::new(),
        ))
        .with_field(FieldSchema::optional("enable_caching", Type::Bool, false))
        .with_field(FieldSchema::optional("enable_cdn", Type::Bool, false))
        .with_field(
            FieldSchema::optional("cidr_block", Type::String, "10.0.0.0/16")
                .with_constraint(Constraint::Format(Format::Cidr)),
        )
        .with_field(FieldSchema::optional(
            "availability_zones",
            Type::list(Type::String),
            vec!["us-east-1a", "us-east-1b"],
        ))
        .with_field(FieldSchema::optional("region", Type::String, "us-east-1"))
        .with_field(FieldSchema::optional("cache_node_type", Type::String, "cache.t3.micro"))
        .with_field(FieldSchema::optional_unset("hosted_zone_id", Type::String))
        .with_validator(Validator::custom("dns alias needs cdn", |attrs| {
            let zone = attrs.get("hosted_zone_id").is_some_and(|v| !v.is_nil());
            let cdn = attrs.get("enable_cdn").and_then(Value::as_bool).unwrap_or(false);
            (zone && !cdn).then(|| Violation::field("hosted_zone_id", "requires enable_cdn"))
        }))
}

fn copy(attributes: &ValidatedAttributes, fields: &[&str]) -> AttrMap {
    fields
        .iter()
        .filter_map(|field| {
            attributes
                .get(field)
                .map(|value| (Arc::from(*field), value.clone()))
        })
        .collect()
}

fn path_flag(attributes: &ValidatedAttributes, path: &str) -> bool {
    attributes.get_path(path).and_then(Value::as_bool).unwrap_or(false)
}

fn network_inputs(attributes: &ValidatedAttributes) -> AttrMap {
    let selected = copy(attributes, &["cidr_block", "availability_zones"]);
    match attributes.get_path("security.allowed_cidrs") {
        Some(cidrs) => selected.insert("allowed_cidrs".into(), cidrs.clone()),
        None => selected,
    }
}

fn compute_inputs(attributes: &ValidatedAttributes) -> AttrMap {
    copy(attributes, &["instance_type", "auto_scaling"]).insert(
        "detailed_monitoring".into(),
        Value::Bool(path_flag(attributes, "monitoring.enabled")),
    )
}

fn database_inputs(attributes: &ValidatedAttributes) -> AttrMap {
    let settings = attributes.record("database").cloned().unwrap_or_default();
    merge_maps(
        &settings,
        &attrs! { "storage_encrypted" => path_flag(attributes, "security.encryption_at_rest") },
    )
}

fn cache_inputs(attributes: &ValidatedAttributes) -> AttrMap {
    match attributes.get("cache_node_type") {
        Some(node) => attrs! { "node_type" => node.clone() },
        None => AttrMap::new(),
    }
}

fn cdn_inputs(attributes: &ValidatedAttributes) -> AttrMap {
    let price_class = match attributes.str("environment") {
        Ok("production") => "PriceClass_All",
        _ => "PriceClass_100",
    };
    copy(attributes, &["domain_name", "hosted_zone_id"])
        .insert("price_class".into(), Value::from(price_class))
        .insert(
            "https_only".into(),
            Value::Bool(path_flag(attributes, "security.enforce_https")),
        )
}

fn monitoring_inputs(attributes: &ValidatedAttributes) -> AttrMap {
    let selected = copy(attributes, &["region"]);
    match attributes.get_path("monitoring.retention_days") {
        Some(days) => selected.insert("retention_days".into(), days.clone()),
        None => selected,
    }
}

fn member_output(application: &AggregateReference, member: &str, output: &str) -> Result<Value> {
    application
        .member(member)
        .and_then(|m| m.output(output))
        .ok_or_else(|| Error::missing_output(member, output))
}

fn capabilities(application: &AggregateReference) -> Value {
    let attributes = application.attributes();
    let resilient_compute = application
        .member("compute")
        .is_some_and(|m| !m.is_fallback())
        && attributes
            .get_path("auto_scaling.min")
            .and_then(Value::as_int)
            .is_some_and(|min| min >= 2);
    let resilient_database = application
        .member("database")
        .is_some_and(|m| !m.is_fallback())
        && path_flag(attributes, "database.multi_az");
    let fallbacks: LtVec<Value> = application
        .fallback_members()
        .into_iter()
        .map(Value::from)
        .collect();

    Value::from(attrs! {
        "caching" => application.has_member("cache"),
        "cdn" => application.has_member("cdn"),
        "monitoring" => application.has_member("monitoring"),
        "high_availability" => resilient_compute && resilient_database,
        "fallback_members" => Value::List(fallbacks),
    })
}

/// Builds the blueprint.
#[must_use]
pub fn blueprint(provider: &'static str) -> Blueprint {
    Blueprint::new(provider, schema())
        .describe("Load-balanced web tier with a database and optional cache, CDN, and monitoring")
        .with_member(
            ComponentRequest::new(network::CAPABILITY)
                .select(network_inputs)
                .fallback(network::minimal)
                .provides(network::OUTPUTS),
        )
        .with_member(
            ComponentRequest::new(compute::CAPABILITY)
                .select(compute_inputs)
                .depends_on(&["network"])
                .fallback(compute::minimal)
                .provides(compute::OUTPUTS),
        )
        .with_member(
            ComponentRequest::new(database::CAPABILITY)
                .select(database_inputs)
                .depends_on(&["network"])
                .fallback(database::minimal)
                .provides(database::OUTPUTS),
        )
        .with_member(
            ComponentRequest::new(cache::CAPABILITY)
                .select(cache_inputs)
                .depends_on(&["network"])
                .when(|attrs| attrs.flag("enable_caching"))
                .provides(&["endpoint"]),
        )
        .with_member(
            ComponentRequest::new(cdn::CAPABILITY)
                .select(cdn_inputs)
                .depends_on(&["compute"])
                .when(|attrs| attrs.flag("enable_cdn"))
                .provides(&["domain_name"]),
        )
        .with_member(
            ComponentRequest::new(monitoring::CAPABILITY)
                .select(monitoring_inputs)
                .depends_on(&["compute", "database"])
                .when(|attrs| path_flag(attrs, "monitoring.enabled"))
                .provides(&["dashboard_url"]),
        )
        .with_output(OutputRule::new("vpc_id", &["network"], |app| {
            member_output(app, "network", "vpc_id")
        }))
        .with_output(OutputRule::new("load_balancer_dns", &["compute"], |app| {
            member_output(app, "compute", "load_balancer_dns")
        }))
        .with_output(OutputRule::new("database_endpoint", &["database"], |app| {
            member_output(app, "database", "endpoint")
        }))
        .with_output(OutputRule::new("application_url", &[], |app| {
            Ok(Value::from(format!("https://{}", app.attributes().str("domain_name")?)))
        }))
        .with_output(OutputRule::new("cdn_domain", &["cdn"], |app| {
            member_output(app, "cdn", "domain_name")
        }))
        .with_output(OutputRule::new("cache_endpoint", &["cache"], |app| {
            member_output(app, "cache", "endpoint")
        }))
        .with_output(OutputRule::new("dashboard_url", &["monitoring"], |app| {
            member_output(app, "monitoring", "dashboard_url")
        }))
        .with_computed("capabilities", capabilities)
        .with_computed("estimated_monthly_cost", |app| {
            Value::Float(estimate::monthly_cost(app))
        })
        .with_computed("security_score", |app| {
            Value::Int(estimate::security_score(app.attributes()))
        })
}

submit_blueprint!(blueprint);

/// Composes a web application named `name`.
///
/// # Errors
///
/// Fails if the attributes are invalid or any required member cannot be
/// composed.
pub fn web_application(
    composer: &mut Composer<'_>,
    name: &str,
    attributes: &AttrMap,
) -> Result<AggregateReference> {
    composer.compose(&blueprint(PROVIDER), name, attributes)
}
