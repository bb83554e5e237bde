//! In-memory cache next to the database.

use stratus_compose::{
    AggregateBuilder, AggregateReference, Component, ComponentInput, submit_component,
};
use stratus_foundation::{Result, Type, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema};
use stratus_synth::SynthesisContext;

use super::one;
use crate::kinds::data::elasticache_cluster;

pub(super) const PROVIDER: &str = module_path!();

/// Capability name.
pub const CAPABILITY: &str = "cache";

fn schema() -> AttributeSchema {
    AttributeSchema::new(CAPABILITY)
        .with_field(
            FieldSchema::optional("engine", Type::String, "redis")
                .with_constraint(Constraint::one_of(["redis", "memcached"])),
        )
        .with_field(FieldSchema::optional("node_type", Type::String, "cache.t3.micro"))
}

pub(super) fn component(provider: &'static str) -> Component {
    Component::new(CAPABILITY, provider, build).describe("Single-node cache in the private subnets")
}

submit_component!(component);

fn build(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let subnets = input.dependency_output("network", "private_subnet_ids")?;
    let group = input.dependency_output("network", "data_security_group_id")?;

    let cluster = elasticache_cluster(
        ctx,
        input.name(),
        &attrs! {
            "engine" => attributes.str("engine")?,
            "node_type" => attributes.str("node_type")?,
            "subnet_ids" => subnets,
            "security_group_ids" => one(group),
        },
    )?;

    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes);
    builder.resource("cluster", cluster.clone())?;
    builder
        .output("endpoint", cluster.require("endpoint")?)?
        .output("port", cluster.require("port")?)?;
    Ok(builder.build())
}
