//! Relational database in the private subnets.

use stratus_compose::{
    AggregateBuilder, AggregateReference, Component, ComponentInput, submit_component,
};
use stratus_foundation::{Result, Type, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema};
use stratus_synth::{OutputBundle, SynthesisContext};

use super::{one, tags};
use crate::kinds::data::db_instance;

pub(super) const PROVIDER: &str = module_path!();

/// Capability name.
pub const CAPABILITY: &str = "database";

/// Outputs every database builder provides.
pub const OUTPUTS: &[&str] = &["endpoint", "address", "port", "arn"];

/// Schema of the `database` settings, shared with architectures that
/// expose them as a nested record.
#[must_use]
pub fn schema() -> AttributeSchema {
    AttributeSchema::new(CAPABILITY)
        .with_field(
            FieldSchema::optional("engine", Type::String, "postgres")
                .with_constraint(Constraint::one_of(["postgres", "mysql", "mariadb"])),
        )
        .with_field(FieldSchema::optional("instance_class", Type::String, "db.t3.micro"))
        .with_field(
            FieldSchema::optional("allocated_storage", Type::Int, 20)
                .with_constraint(Constraint::range(20.0, 65_536.0)),
        )
        .with_field(FieldSchema::optional("multi_az", Type::Bool, false))
        .with_field(
            FieldSchema::optional("backup_retention_days", Type::Int, 1)
                .with_constraint(Constraint::range(0.0, 35.0)),
        )
        .with_field(FieldSchema::optional("deletion_protection", Type::Bool, false))
        .with_field(FieldSchema::optional("storage_encrypted", Type::Bool, true))
}

pub(super) fn component(provider: &'static str) -> Component {
    Component::new(CAPABILITY, provider, build)
        .describe("Relational database reachable only from the application tier")
}

submit_component!(component);

fn publish(builder: &mut AggregateBuilder, instance: &OutputBundle) -> Result<()> {
    for output in OUTPUTS {
        builder.output(output, instance.require(output)?)?;
    }
    Ok(())
}

fn build(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let subnets = input.dependency_output("network", "private_subnet_ids")?;
    let group = input.dependency_output("network", "data_security_group_id")?;

    let instance = db_instance(
        ctx,
        input.name(),
        &attrs! {
            "engine" => attributes.str("engine")?,
            "instance_class" => attributes.str("instance_class")?,
            "allocated_storage" => attributes.int("allocated_storage")?,
            "multi_az" => attributes.flag("multi_az"),
            "backup_retention_period" => attributes.int("backup_retention_days")?,
            "deletion_protection" => attributes.flag("deletion_protection"),
            "storage_encrypted" => attributes.flag("storage_encrypted"),
            "subnet_ids" => subnets,
            "vpc_security_group_ids" => one(group),
            "tags" => tags(input),
        },
    )?;

    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes);
    builder.resource("instance", instance.clone())?;
    publish(&mut builder, &instance)?;
    Ok(builder.build())
}

/// Builds a single-zone instance with default settings and no dedicated
/// security group.
///
/// # Errors
///
/// Propagates validation and declaration failures.
pub fn minimal(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let subnets = input.dependency_output("network", "private_subnet_ids")?;

    let instance = db_instance(
        ctx,
        input.name(),
        &attrs! {
            "engine" => attributes.str("engine")?,
            "instance_class" => "db.t3.micro",
            "subnet_ids" => subnets,
        },
    )?;

    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes);
    builder.resource("instance", instance.clone())?;
    publish(&mut builder, &instance)?;
    Ok(builder.build())
}
