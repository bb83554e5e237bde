//! CDN distributions and DNS records.

use stratus_foundation::{AttrMap, Result, Type, Value, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema, FieldType, Format, Validator};
use stratus_synth::{OutputBundle, ResourceKind, SynthesisContext, submit_kind};

pub(super) const PROVIDER: &str = module_path!();
pub(super) const DEFINITIONS: &[super::Define] = &[cloudfront_distribution_kind, route53_record_kind];

/// Kind name of a CDN distribution.
pub const CLOUDFRONT_DISTRIBUTION: &str = "aws_cloudfront_distribution";
/// Kind name of a DNS record.
pub const ROUTE53_RECORD: &str = "aws_route53_record";

fn cloudfront_distribution_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(CLOUDFRONT_DISTRIBUTION)
        .with_field(FieldSchema::required("origin_domain_name", Type::String))
        .with_field(FieldSchema::optional(
            "aliases",
            Type::list(Type::String),
            Vec::<Value>::new(),
        ))
        .with_field(FieldSchema::optional("enabled", Type::Bool, true))
        .with_field(
            FieldSchema::optional("price_class", Type::String, "PriceClass_100").with_constraint(
                Constraint::one_of(["PriceClass_100", "PriceClass_200", "PriceClass_All"]),
            ),
        )
        .with_field(
            FieldSchema::optional("viewer_protocol_policy", Type::String, "redirect-to-https")
                .with_constraint(Constraint::one_of([
                    "redirect-to-https",
                    "https-only",
                    "allow-all",
                ])),
        )
        .with_field(
            FieldSchema::optional("default_ttl", Type::Int, 3600)
                .with_constraint(Constraint::at_least(0.0)),
        )
        .with_field(FieldSchema::optional_unset("web_acl_id", Type::String));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "domain_name", "hosted_zone_id"])
        .with_computed(|attrs| {
            let https = attrs.str("viewer_protocol_policy").is_ok_and(|p| p != "allow-all");
            attrs! { "https_only" => https, "waf" => attrs.contains("web_acl_id") }
        })
        .describe("Content delivery network in front of an origin")
}

submit_kind!(cloudfront_distribution_kind);

fn alias_schema() -> AttributeSchema {
    AttributeSchema::new("route53_alias")
        .with_field(FieldSchema::required("name", Type::String))
        .with_field(FieldSchema::required("zone_id", Type::String))
        .with_field(FieldSchema::optional("evaluate_target_health", Type::Bool, false))
}

fn route53_record_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(ROUTE53_RECORD)
        .with_field(FieldSchema::required("zone_id", Type::String))
        .with_field(
            FieldSchema::required("name", Type::String)
                .with_constraint(Constraint::Format(Format::DomainName)),
        )
        .with_field(
            FieldSchema::optional("type", Type::String, "A")
                .with_constraint(Constraint::one_of(["A", "AAAA", "CNAME", "TXT"])),
        )
        .with_field(
            FieldSchema::optional_unset("ttl", Type::Int).with_constraint(Constraint::at_least(0.0)),
        )
        .with_field(FieldSchema::optional_unset("records", Type::list(Type::String)))
        .with_field(FieldSchema::optional_unset("alias", FieldType::record(alias_schema())))
        .with_validator(Validator::exactly_one_of(["records", "alias"]))
        .with_validator(Validator::requires("records", "ttl"))
        .with_validator(Validator::mutually_exclusive(["alias", "ttl"]));

    ResourceKind::new(provider, schema)
        .with_outputs(&["fqdn"])
        .describe("DNS record in a hosted zone")
}

submit_kind!(route53_record_kind);

/// Declares an `aws_cloudfront_distribution`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn cloudfront_distribution(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(CLOUDFRONT_DISTRIBUTION, name, attrs)
}

/// Declares an `aws_route53_record`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn route53_record(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(ROUTE53_RECORD, name, attrs)
}
