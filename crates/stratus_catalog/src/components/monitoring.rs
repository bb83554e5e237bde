//! Dashboard over the application tier and an alarm queue.

use stratus_compose::{
    AggregateBuilder, AggregateReference, Component, ComponentInput, submit_component,
};
use stratus_foundation::{Result, Type, Value, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema};
use stratus_synth::SynthesisContext;

use super::child_name;
use crate::kinds::data::sqs_queue;
use crate::kinds::ops::{cloudwatch_dashboard, dashboard_url};

pub(super) const PROVIDER: &str = module_path!();

/// Capability name.
pub const CAPABILITY: &str = "monitoring";

const MAX_RETENTION_SECONDS: i64 = 1_209_600;

fn schema() -> AttributeSchema {
    AttributeSchema::new(CAPABILITY)
        .with_field(
            FieldSchema::optional("retention_days", Type::Int, 7)
                .with_constraint(Constraint::range(1.0, 3653.0)),
        )
        .with_field(FieldSchema::optional("region", Type::String, "us-east-1"))
}

pub(super) fn component(provider: &'static str) -> Component {
    Component::new(CAPABILITY, provider, build)
        .describe("Dashboard for compute and database metrics, plus an alarm queue")
}

submit_component!(component);

/// Dashboard names are lowercase identifiers; everything else becomes a
/// hyphen.
fn dashboard_name(input: &ComponentInput) -> String {
    let raw = format!("{}-{}", input.name(), input.environment());
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        name.insert_str(0, "d-");
    }
    name
}

fn widget(title: &str, namespace: &str, metric: &str, resource: Value) -> Value {
    Value::from(attrs! {
        "title" => title,
        "namespace" => namespace,
        "metric" => metric,
        "resource" => resource,
    })
}

fn build(ctx: &mut SynthesisContext, input: &ComponentInput) -> Result<AggregateReference> {
    let attributes = schema().instantiate(input.attributes())?;
    let group = input.dependency_output("compute", "autoscaling_group_name")?;
    let balancer = input.dependency_output("compute", "load_balancer_arn")?;
    let database = input.dependency_output("database", "arn")?;

    let name = dashboard_name(input);
    let dashboard = cloudwatch_dashboard(
        ctx,
        input.name(),
        &attrs! {
            "dashboard_name" => name.as_str(),
            "widgets" => vec![
                widget("Instance CPU", "AWS/EC2", "CPUUtilization", group),
                widget("Response time", "AWS/ApplicationELB", "TargetResponseTime", balancer),
                widget("Database CPU", "AWS/RDS", "CPUUtilization", database),
            ],
        },
    )?;

    let retention = attributes
        .int("retention_days")?
        .saturating_mul(86_400)
        .min(MAX_RETENTION_SECONDS);
    let alarms = sqs_queue(
        ctx,
        &child_name(input, "alarms"),
        &attrs! { "message_retention_seconds" => retention },
    )?;

    let url = dashboard_url(attributes.str("region")?, &name);
    let mut builder = AggregateBuilder::new(CAPABILITY, input.name(), attributes);
    builder
        .resource("dashboard", dashboard.clone())?
        .resource("alarm_queue", alarms.clone())?;
    builder
        .output("dashboard_name", name)?
        .output("dashboard_url", url)?
        .output("dashboard_arn", dashboard.require("arn")?)?
        .output("alarm_queue_url", alarms.require("url")?)?;
    Ok(builder.build())
}
