//! Load-balanced, auto-scaled application tier.

use stratus_compose::{
    AggregateBuilder, AggregateReference, Component, ComponentInput, submit_component,
};
use stratus_foundation::{AttrMap, Result, Type, Value, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema, FieldType, Validator};
use stratus_synth::SynthesisContext;

use super::{one, stand_in, tags};
use crate::kinds::compute::{autoscaling_group, check_capacity, launch_template, load_balancer};
use crate::kinds::is_instance_class;

pub(super) const PROVIDER: &str = module_path!();

/// Capability name.
pub const CAPABILITY: &str = "compute";

/// Outputs every compute builder provides.
pub const OUTPUTS: &[&str] = &[
    "load_balancer_dns",
    "load_balancer_zone_id",
    "load_balancer_arn",
    "autoscaling_group_name",
];

/// Schema of the `auto_scaling` record.
#[must_use]
pub fn scaling_schema() -> AttributeSchema {
    let size = |name: &str, default: i64| {
        FieldSchema::optional(name, Type::Int, default).with_constraint(Constraint::range(0.0, 100.0))
    };
    AttributeSchema::new("auto_scaling")
        .with_field(size("min", 1))
        .with_field(size("max", 2))
        .with_field(size("desired", 1))
        .with_validator(Validator::custom("scaling bounds", |attrs| {
            check_capacity(attrs, "min", "max", "desired")
        }))
}

fn schema() -> AttributeSchema {
    AttributeSchema::new(CAPABILITY)
        .with_field(
            FieldSchema::required("instance_type", Type::String).with_constraint(
                Constraint::predicate("an instance type such as t3.micro", is_instance_class),
            ),
        )
        .with_field(FieldSchema::optional(
            "auto_scaling",
            FieldType::record(scaling_schema()),
            AttrMap::new(),
        ))
        .with_field(FieldSchema::optional("detailed_monitoring", Type::Bool, false))
}

pub(super) fn component(provider: &'static str) -> Component {
    Component::new(CAPABILITY, provider, build)
        .describe("Launch template and auto scaling group behind an application load balancer")
}

submit_component!(component);

fn scaling(attributes: &stratus_schema::ValidatedAttributes, field: &str) -> i64 {
    attributes
        .get_path(&format!("auto_scaling.{field}"))
        .and_then(Value::as_int)
        .unwrap_or(1)
}

fn build(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let public = input.dependency_output("network", "public_subnet_ids")?;
    let private = input.dependency_output("network", "private_subnet_ids")?;
    let lb_group = input.dependency_output("network", "lb_security_group_id")?;
    let app_group = input.dependency_output("network", "app_security_group_id")?;

    let template = launch_template(
        ctx,
        input.name(),
        &attrs! {
            "instance_type" => attributes.str("instance_type")?,
            "security_group_ids" => one(app_group),
            "detailed_monitoring" => attributes.flag("detailed_monitoring"),
        },
    )?;
    let balancer = load_balancer(
        ctx,
        input.name(),
        &attrs! {
            "subnets" => public,
            "security_groups" => one(lb_group),
            "tags" => tags(input),
        },
    )?;
    let group = autoscaling_group(
        ctx,
        input.name(),
        &attrs! {
            "launch_template_id" => template.id()?,
            "subnet_ids" => private,
            "min_size" => scaling(&attributes, "min"),
            "max_size" => scaling(&attributes, "max"),
            "desired_capacity" => scaling(&attributes, "desired"),
            "health_check_type" => "ELB",
        },
    )?;

    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes);
    builder
        .resource("launch_template", template)?
        .resource("load_balancer", balancer.clone())?
        .resource("autoscaling_group", group.clone())?;
    builder
        .output("load_balancer_dns", balancer.require("dns_name")?)?
        .output("load_balancer_zone_id", balancer.require("zone_id")?)?
        .output("load_balancer_arn", balancer.require("arn")?)?
        .output("autoscaling_group_name", group.require("name")?)?;
    Ok(builder.build())
}

/// Builds a single instance group in the public subnets with no load
/// balancer. Load balancer outputs are literal stand-ins.
///
/// # Errors
///
/// Propagates validation and declaration failures.
pub fn minimal(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let public = input.dependency_output("network", "public_subnet_ids")?;

    let template = launch_template(
        ctx,
        input.name(),
        &attrs! { "instance_type" => attributes.str("instance_type")? },
    )?;
    let group = autoscaling_group(
        ctx,
        input.name(),
        &attrs! {
            "launch_template_id" => template.id()?,
            "subnet_ids" => public,
            "min_size" => 1,
            "max_size" => 1,
            "desired_capacity" => 1,
        },
    )?;

    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes);
    builder
        .resource("launch_template", template)?
        .resource("autoscaling_group", group.clone())?;
    builder
        .output("load_balancer_dns", stand_in(input, "load_balancer_dns"))?
        .output("load_balancer_zone_id", stand_in(input, "load_balancer_zone_id"))?
        .output("load_balancer_arn", stand_in(input, "load_balancer_arn"))?
        .output("autoscaling_group_name", group.require("name")?)?;
    Ok(builder.build())
}
