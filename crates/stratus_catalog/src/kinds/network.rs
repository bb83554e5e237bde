//! VPCs, subnets, and security groups.

use stratus_foundation::{AttrMap, Result, Type, Value, attrs};
use stratus_schema::{
    AttributeSchema, Constraint, FieldSchema, FieldType, Format, ValidatedAttributes, Validator,
};
use stratus_synth::{OutputBundle, ResourceKind, SynthesisContext, submit_kind};

pub(super) const PROVIDER: &str = module_path!();
pub(super) const DEFINITIONS: &[super::Define] = &[vpc_kind, subnet_kind, security_group_kind];

/// Kind name of a VPC.
pub const VPC: &str = "aws_vpc";
/// Kind name of a subnet.
pub const SUBNET: &str = "aws_subnet";
/// Kind name of a security group.
pub const SECURITY_GROUP: &str = "aws_security_group";

/// Number of addresses in an IPv4 CIDR block, if it parses.
#[must_use]
pub fn address_count(cidr: &str) -> Option<i64> {
    let (_, prefix) = cidr.split_once('/')?;
    let prefix: u32 = prefix.parse().ok()?;
    (prefix <= 32).then(|| 1i64 << (32 - prefix))
}

fn vpc_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(VPC)
        .with_field(
            FieldSchema::required("cidr_block", Type::String)
                .with_constraint(Constraint::Format(Format::Cidr)),
        )
        .with_field(FieldSchema::optional("enable_dns_hostnames", Type::Bool, true))
        .with_field(FieldSchema::optional("enable_dns_support", Type::Bool, true))
        .with_field(FieldSchema::optional_unset("tags", FieldType::map_of(Type::String)));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "default_security_group_id"])
        .with_computed(vpc_computed)
        .describe("Isolated virtual network")
}

fn vpc_computed(attrs: &ValidatedAttributes) -> AttrMap {
    match attrs.str("cidr_block").ok().and_then(address_count) {
        Some(count) => attrs! { "address_count" => count },
        None => AttrMap::new(),
    }
}

submit_kind!(vpc_kind);

fn subnet_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(SUBNET)
        .with_field(FieldSchema::required("vpc_id", Type::String))
        .with_field(
            FieldSchema::required("cidr_block", Type::String)
                .with_constraint(Constraint::Format(Format::Cidr)),
        )
        .with_field(FieldSchema::required("availability_zone", Type::String))
        .with_field(FieldSchema::optional("map_public_ip_on_launch", Type::Bool, false))
        .with_field(FieldSchema::optional_unset("tags", FieldType::map_of(Type::String)));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn"])
        .with_computed(|attrs| {
            let tier = if attrs.flag("map_public_ip_on_launch") { "public" } else { "private" };
            attrs! { "tier" => tier }
        })
        .describe("Address range within a VPC, pinned to one availability zone")
}

submit_kind!(subnet_kind);

fn rule_schema() -> AttributeSchema {
    AttributeSchema::new("security_group_rule")
        .with_field(
            FieldSchema::required("from_port", Type::Int)
                .with_constraint(Constraint::range(0.0, 65535.0)),
        )
        .with_field(
            FieldSchema::required("to_port", Type::Int)
                .with_constraint(Constraint::range(0.0, 65535.0)),
        )
        .with_field(
            FieldSchema::optional("protocol", Type::String, "tcp")
                .with_constraint(Constraint::one_of(["tcp", "udp", "icmp", "-1"])),
        )
        .with_field(FieldSchema::optional_unset("cidr_blocks", Type::list(Type::String)))
        .with_field(FieldSchema::optional_unset("security_groups", Type::list(Type::String)))
        .with_validator(Validator::at_least_one_of(["cidr_blocks", "security_groups"]))
        .with_validator(Validator::custom("port order", |rule| {
            let from = rule.get("from_port").and_then(Value::as_int)?;
            let to = rule.get("to_port").and_then(Value::as_int)?;
            (from > to).then(|| {
                stratus_schema::Violation::field("to_port", format!("{to} is below from_port {from}"))
            })
        }))
}

fn security_group_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(SECURITY_GROUP)
        .with_field(FieldSchema::required("vpc_id", Type::String))
        .with_field(FieldSchema::optional("description", Type::String, "Managed by Stratus"))
        .with_field(FieldSchema::optional(
            "ingress",
            FieldType::list_of(FieldType::record(rule_schema())),
            Vec::<Value>::new(),
        ))
        .with_field(FieldSchema::optional_unset("tags", FieldType::map_of(Type::String)));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn"])
        .with_computed(|attrs| attrs! { "open_to_world" => is_open_to_world(attrs) })
        .describe("Stateful firewall attached to network interfaces")
}

fn is_open_to_world(attrs: &ValidatedAttributes) -> bool {
    attrs.list("ingress").is_some_and(|rules| {
        rules.iter().filter_map(Value::as_map).any(|rule| {
            rule.get("cidr_blocks")
                .and_then(Value::as_list)
                .is_some_and(|cidrs| cidrs.iter().any(|c| c.as_str() == Some("0.0.0.0/0")))
        })
    })
}

submit_kind!(security_group_kind);

/// An ingress rule allowing TCP on `port` from the given CIDR blocks.
#[must_use]
pub fn ingress_from_cidrs(port: i64, cidrs: &[&str]) -> Value {
    let cidrs: Vec<Value> = cidrs.iter().map(|c| Value::from(*c)).collect();
    Value::from(attrs! { "from_port" => port, "to_port" => port, "cidr_blocks" => cidrs })
}

/// An ingress rule allowing TCP on `port` from another security group.
#[must_use]
pub fn ingress_from_group(port: i64, group: impl Into<Value>) -> Value {
    Value::from(attrs! {
        "from_port" => port,
        "to_port" => port,
        "security_groups" => vec![group.into()],
    })
}

/// Declares an `aws_vpc`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn vpc(ctx: &mut SynthesisContext, name: &str, attrs: &AttrMap) -> Result<OutputBundle> {
    ctx.declare(VPC, name, attrs)
}

/// Declares an `aws_subnet`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn subnet(ctx: &mut SynthesisContext, name: &str, attrs: &AttrMap) -> Result<OutputBundle> {
    ctx.declare(SUBNET, name, attrs)
}

/// Declares an `aws_security_group`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn security_group(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(SECURITY_GROUP, name, attrs)
}
