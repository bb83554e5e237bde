//! Load balancers, launch templates, and auto scaling groups.

use stratus_foundation::{AttrMap, Result, Type, Value, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema, FieldType, Validator, Violation};
use stratus_synth::{OutputBundle, ResourceKind, SynthesisContext, submit_kind};

use super::is_instance_class;

pub(super) const PROVIDER: &str = module_path!();
pub(super) const DEFINITIONS: &[super::Define] =
    &[load_balancer_kind, launch_template_kind, autoscaling_group_kind];

/// Kind name of an application or network load balancer.
pub const LOAD_BALANCER: &str = "aws_lb";
/// Kind name of a launch template.
pub const LAUNCH_TEMPLATE: &str = "aws_launch_template";
/// Kind name of an auto scaling group.
pub const AUTOSCALING_GROUP: &str = "aws_autoscaling_group";

/// Image used when a launch template does not name one.
pub const DEFAULT_IMAGE: &str =
    "resolve:ssm:/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64";

fn load_balancer_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(LOAD_BALANCER)
        .with_field(FieldSchema::optional("internal", Type::Bool, false))
        .with_field(
            FieldSchema::optional("load_balancer_type", Type::String, "application")
                .with_constraint(Constraint::one_of(["application", "network"])),
        )
        .with_field(
            FieldSchema::required("subnets", Type::list(Type::String))
                .with_constraint(Constraint::length(2, 16)),
        )
        .with_field(FieldSchema::optional(
            "security_groups",
            Type::list(Type::String),
            Vec::<Value>::new(),
        ))
        .with_field(FieldSchema::optional("idle_timeout", Type::Int, 60).with_constraint(
            Constraint::range(1.0, 4000.0),
        ))
        .with_field(FieldSchema::optional_unset("tags", FieldType::map_of(Type::String)));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "dns_name", "zone_id"])
        .with_computed(|attrs| {
            let scheme = if attrs.flag("internal") { "internal" } else { "internet-facing" };
            attrs! { "scheme" => scheme }
        })
        .describe("Layer 4 or layer 7 load balancer spanning several subnets")
}

submit_kind!(load_balancer_kind);

fn launch_template_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(LAUNCH_TEMPLATE)
        .with_field(
            FieldSchema::required("instance_type", Type::String).with_constraint(
                Constraint::predicate("an instance type such as t3.micro", is_instance_class),
            ),
        )
        .with_field(FieldSchema::optional("image_id", Type::String, DEFAULT_IMAGE))
        .with_field(FieldSchema::optional(
            "security_group_ids",
            Type::list(Type::String),
            Vec::<Value>::new(),
        ))
        .with_field(FieldSchema::optional_unset("user_data", Type::String))
        .with_field(FieldSchema::optional("detailed_monitoring", Type::Bool, false));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "latest_version"])
        .with_computed(|attrs| {
            match attrs.str("instance_type").ok().and_then(|t| t.split('.').next()) {
                Some(family) => attrs! { "instance_family" => family },
                None => AttrMap::new(),
            }
        })
        .describe("Instance configuration used by auto scaling groups")
}

submit_kind!(launch_template_kind);

/// Checks `min <= desired <= max` when all three sizes are present.
pub(crate) fn check_capacity(
    attrs: &AttrMap,
    min: &str,
    max: &str,
    desired: &str,
) -> Option<Violation> {
    let size = |field: &str| attrs.get(field).and_then(Value::as_int);
    let (lo, hi) = (size(min)?, size(max)?);
    if lo > hi {
        return Some(Violation::field(max, format!("{hi} is below {min} {lo}")));
    }
    let wanted = size(desired)?;
    (wanted < lo || wanted > hi)
        .then(|| Violation::field(desired, format!("{wanted} is outside [{lo}, {hi}]")))
}

fn autoscaling_group_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(AUTOSCALING_GROUP)
        .with_field(FieldSchema::required("launch_template_id", Type::String))
        .with_field(
            FieldSchema::required("subnet_ids", Type::list(Type::String))
                .with_constraint(Constraint::non_empty()),
        )
        .with_field(
            FieldSchema::required("min_size", Type::Int).with_constraint(Constraint::at_least(0.0)),
        )
        .with_field(
            FieldSchema::required("max_size", Type::Int).with_constraint(Constraint::at_least(1.0)),
        )
        .with_field(FieldSchema::optional_unset("desired_capacity", Type::Int))
        .with_field(FieldSchema::optional(
            "target_group_arns",
            Type::list(Type::String),
            Vec::<Value>::new(),
        ))
        .with_field(
            FieldSchema::optional("health_check_type", Type::String, "EC2")
                .with_constraint(Constraint::one_of(["EC2", "ELB"])),
        )
        .with_validator(Validator::custom("capacity bounds", |attrs| {
            check_capacity(attrs, "min_size", "max_size", "desired_capacity")
        }));

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn", "name"])
        .with_computed(|attrs| {
            let min = attrs.int("min_size").unwrap_or_default();
            let max = attrs.int("max_size").unwrap_or_default();
            attrs! { "headroom" => max - attrs.int("desired_capacity").unwrap_or(min) }
        })
        .describe("Fleet of instances kept between a minimum and maximum size")
}

submit_kind!(autoscaling_group_kind);

/// Declares an `aws_lb`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn load_balancer(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(LOAD_BALANCER, name, attrs)
}

/// Declares an `aws_launch_template`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn launch_template(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(LAUNCH_TEMPLATE, name, attrs)
}

/// Declares an `aws_autoscaling_group`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn autoscaling_group(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(AUTOSCALING_GROUP, name, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::context;

    #[test]
    fn load_balancer_needs_two_subnets() {
        let mut ctx = context();
        let err = load_balancer(&mut ctx, "web", &attrs! { "subnets" => vec!["subnet-a"] })
            .unwrap_err();
        assert_eq!(err.path().map(ToString::to_string), Some("subnets".to_string()));

        let lb = load_balancer(&mut ctx, "web", &attrs! { "subnets" => vec!["subnet-a", "subnet-b"] })
            .unwrap();
        assert_eq!(lb.computed("scheme"), Some(&Value::from("internet-facing")));
    }

    #[test]
    fn launch_template_checks_instance_type() {
        let mut ctx = context();
        assert!(launch_template(&mut ctx, "web", &attrs! { "instance_type" => "huge" }).is_err());
        let template =
            launch_template(&mut ctx, "web", &attrs! { "instance_type" => "m5.large" }).unwrap();
        assert_eq!(template.computed("instance_family"), Some(&Value::from("m5")));
        assert_eq!(
            ctx.emit().resource(LAUNCH_TEMPLATE, "web").unwrap().get("image_id"),
            Some(&Value::from(DEFAULT_IMAGE))
        );
    }

    #[test]
    fn autoscaling_capacity_bounds() {
        let mut ctx = context();
        let template =
            launch_template(&mut ctx, "web", &attrs! { "instance_type" => "t3.micro" }).unwrap();
        let base = attrs! {
            "launch_template_id" => template.id().unwrap(),
            "subnet_ids" => vec!["subnet-a"],
            "min_size" => 2,
            "max_size" => 4,
        };

        let err = autoscaling_group(&mut ctx, "web", &base.insert("desired_capacity".into(), 5.into()))
            .unwrap_err();
        assert_eq!(err.path().map(ToString::to_string), Some("desired_capacity".to_string()));

        let err = autoscaling_group(&mut ctx, "web", &base.insert("max_size".into(), 1.into()))
            .unwrap_err();
        assert_eq!(err.path().map(ToString::to_string), Some("max_size".to_string()));

        let group = autoscaling_group(&mut ctx, "web", &base.insert("desired_capacity".into(), 3.into()))
            .unwrap();
        assert_eq!(group.computed("headroom"), Some(&Value::Int(1)));
    }
}
