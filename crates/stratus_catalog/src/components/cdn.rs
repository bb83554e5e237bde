//! CDN distribution in front of the load balancer, with an optional DNS
//! alias.

use stratus_compose::{
    AggregateBuilder, AggregateReference, Component, ComponentInput, submit_component,
};
use stratus_foundation::{Result, Type, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema, Format};
use stratus_synth::SynthesisContext;

use super::one;
use crate::kinds::edge::{cloudfront_distribution, route53_record};

pub(super) const PROVIDER: &str = module_path!();

/// Capability name.
pub const CAPABILITY: &str = "cdn";

fn schema() -> AttributeSchema {
    AttributeSchema::new(CAPABILITY)
        .with_field(
            FieldSchema::required("domain_name", Type::String)
                .with_constraint(Constraint::Format(Format::DomainName)),
        )
        .with_field(FieldSchema::optional("price_class", Type::String, "PriceClass_100"))
        .with_field(FieldSchema::optional("https_only", Type::Bool, true))
        .with_field(FieldSchema::optional_unset("hosted_zone_id", Type::String))
}

pub(super) fn component(provider: &'static str) -> Component {
    Component::new(CAPABILITY, provider, build)
        .describe("CDN distribution for the application domain")
}

submit_component!(component);

fn build(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let origin = input.dependency_output("compute", "load_balancer_dns")?;
    let domain = attributes.str("domain_name")?;
    let policy = if attributes.flag("https_only") { "redirect-to-https" } else { "allow-all" };

    let distribution = cloudfront_distribution(
        ctx,
        input.name(),
        &attrs! {
            "origin_domain_name" => origin,
            "aliases" => one(domain),
            "price_class" => attributes.str("price_class")?,
            "viewer_protocol_policy" => policy,
        },
    )?;

    let record = match attributes.get("hosted_zone_id") {
        Some(zone) => Some(route53_record(
            ctx,
            input.name(),
            &attrs! {
                "zone_id" => zone.clone(),
                "name" => domain,
                "alias" => attrs! {
                    "name" => distribution.require("domain_name")?,
                    "zone_id" => distribution.require("hosted_zone_id")?,
                },
            },
        )?),
        None => None,
    };

    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes.clone());
    builder.resource("distribution", distribution.clone())?;
    builder
        .output("domain_name", distribution.require("domain_name")?)?
        .output("distribution_arn", distribution.require("arn")?)?;
    if let Some(record) = record {
        let fqdn = record.require("fqdn")?;
        builder.resource("alias_record", record)?;
        builder.output("fqdn", fqdn)?;
    }
    Ok(builder.build())
}
