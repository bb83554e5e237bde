//! VPC, subnets per availability zone, and tiered security groups.

use stratus_compose::{
    AggregateBuilder, AggregateReference, Component, ComponentInput, submit_component,
};
use stratus_foundation::{LtVec, Reference, Result, Type, Value, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema, Format, ValidatedAttributes};
use stratus_synth::SynthesisContext;

use super::{child_name, one, subnet_cidr, tags};
use crate::kinds::network::{ingress_from_cidrs, ingress_from_group, security_group, subnet, vpc};

pub(super) const PROVIDER: &str = module_path!();

/// Capability name.
pub const CAPABILITY: &str = "network";

/// Outputs every network builder provides.
pub const OUTPUTS: &[&str] = &[
    "vpc_id",
    "public_subnet_ids",
    "private_subnet_ids",
    "lb_security_group_id",
    "app_security_group_id",
    "data_security_group_id",
];

/// Port the application tier listens on.
pub const APP_PORT: i64 = 8080;

fn schema() -> AttributeSchema {
    AttributeSchema::new(CAPABILITY)
        .with_field(
            FieldSchema::optional("cidr_block", Type::String, "10.0.0.0/16")
                .with_constraint(Constraint::Format(Format::Cidr)),
        )
        .with_field(
            FieldSchema::optional(
                "availability_zones",
                Type::list(Type::String),
                vec!["us-east-1a", "us-east-1b"],
            )
            .with_constraint(Constraint::length(2, 6)),
        )
        .with_field(FieldSchema::optional(
            "allowed_cidrs",
            Type::list(Type::String),
            vec!["0.0.0.0/0"],
        ))
}

pub(super) fn component(provider: &'static str) -> Component {
    Component::new(CAPABILITY, provider, build)
        .describe("VPC with public and private subnets per zone and tiered security groups")
}

submit_component!(component);

struct Subnets {
    public: Vec<Reference>,
    private: Vec<Reference>,
}

/// Declares the VPC and one public and one private subnet per zone.
fn declare_layout(
    ctx: &mut SynthesisContext,
    input: &ComponentInput,
    attributes: &ValidatedAttributes,
    builder: &mut AggregateBuilder,
) -> Result<(Reference, Subnets)> {
    let cidr = attributes.str("cidr_block")?;
    let main = vpc(ctx, input.name(), &attrs! { "cidr_block" => cidr, "tags" => tags(input) })?;
    let vpc_id = main.id()?;
    builder.resource("vpc", main)?;

    let zones: Vec<Value> = attributes
        .list("availability_zones")
        .map(|zones| zones.iter().cloned().collect())
        .unwrap_or_default();

    let mut subnets = Subnets {
        public: Vec::new(),
        private: Vec::new(),
    };
    for (index, zone) in (0u32..).zip(&zones) {
        for (tier, offset, public) in [("public", 0, true), ("private", 10, false)] {
            let name = child_name(input, &format!("{tier}-{index}"));
            let bundle = subnet(
                ctx,
                &name,
                &attrs! {
                    "vpc_id" => &vpc_id,
                    "cidr_block" => subnet_cidr(cidr, offset + index)?,
                    "availability_zone" => zone.clone(),
                    "map_public_ip_on_launch" => public,
                    "tags" => tags(input),
                },
            )?;
            let id = bundle.id()?;
            builder.resource(name, bundle)?;
            if public {
                subnets.public.push(id);
            } else {
                subnets.private.push(id);
            }
        }
    }
    Ok((vpc_id, subnets))
}

fn id_list(ids: Vec<Reference>) -> Value {
    Value::List(ids.into_iter().map(Value::from).collect::<LtVec<Value>>())
}

fn build(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes.clone());
    let (vpc_id, subnets) = declare_layout(ctx, input, &attributes, &mut builder)?;

    let allowed: Vec<&str> = attributes
        .list("allowed_cidrs")
        .map(|cidrs| cidrs.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let lb = security_group(
        ctx,
        &child_name(input, "lb"),
        &attrs! {
            "vpc_id" => &vpc_id,
            "description" => "Load balancer ingress",
            "ingress" => vec![ingress_from_cidrs(80, &allowed), ingress_from_cidrs(443, &allowed)],
            "tags" => tags(input),
        },
    )?;
    let lb_id = lb.id()?;
    let app = security_group(
        ctx,
        &child_name(input, "app"),
        &attrs! {
            "vpc_id" => &vpc_id,
            "description" => "Application tier",
            "ingress" => vec![ingress_from_group(APP_PORT, &lb_id)],
            "tags" => tags(input),
        },
    )?;
    let app_id = app.id()?;
    let data = security_group(
        ctx,
        &child_name(input, "data"),
        &attrs! {
            "vpc_id" => &vpc_id,
            "description" => "Data tier",
            "ingress" => vec![ingress_from_group(5432, &app_id), ingress_from_group(6379, &app_id)],
            "tags" => tags(input),
        },
    )?;
    let data_id = data.id()?;

    builder.resource("lb_security_group", lb)?;
    builder.resource("app_security_group", app)?;
    builder.resource("data_security_group", data)?;
    builder
        .output("vpc_id", vpc_id)?
        .output("public_subnet_ids", id_list(subnets.public))?
        .output("private_subnet_ids", id_list(subnets.private))?
        .output("lb_security_group_id", lb_id)?
        .output("app_security_group_id", app_id)?
        .output("data_security_group_id", data_id)?;
    Ok(builder.build())
}

/// Builds the same VPC and subnets guarded by one shared security group
/// that only admits web traffic.
///
/// # Errors
///
/// Propagates validation and declaration failures.
pub fn minimal(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes.clone());
    let (vpc_id, subnets) = declare_layout(ctx, input, &attributes, &mut builder)?;

    let shared = security_group(
        ctx,
        &child_name(input, "shared"),
        &attrs! {
            "vpc_id" => &vpc_id,
            "description" => "Shared web ingress",
            "ingress" => one(ingress_from_cidrs(443, &["0.0.0.0/0"])),
        },
    )?;
    let shared_id = shared.id()?;
    builder.resource("shared_security_group", shared)?;
    builder
        .output("vpc_id", vpc_id)?
        .output("public_subnet_ids", id_list(subnets.public))?
        .output("private_subnet_ids", id_list(subnets.private))?
        .output("lb_security_group_id", &shared_id)?
        .output("app_security_group_id", &shared_id)?
        .output("data_security_group_id", shared_id)?;
    Ok(builder.build())
}
