//! Dashboards.

use stratus_foundation::{AttrMap, Result, Type, attrs};
use stratus_schema::{AttributeSchema, Constraint, FieldSchema, FieldType, Format};
use stratus_synth::{OutputBundle, ResourceKind, SynthesisContext, submit_kind};

pub(super) const PROVIDER: &str = module_path!();
pub(super) const DEFINITIONS: &[super::Define] = &[cloudwatch_dashboard_kind];

/// Kind name of a metrics dashboard.
pub const CLOUDWATCH_DASHBOARD: &str = "aws_cloudwatch_dashboard";

fn widget_schema() -> AttributeSchema {
    AttributeSchema::new("dashboard_widget")
        .with_field(FieldSchema::required("title", Type::String))
        .with_field(
            FieldSchema::required("namespace", Type::String)
                .with_constraint(Constraint::non_empty()),
        )
        .with_field(FieldSchema::required("metric", Type::String))
        .with_field(FieldSchema::required("resource", Type::String))
        .with_field(
            FieldSchema::optional("stat", Type::String, "Average")
                .with_constraint(Constraint::one_of(["Average", "Sum", "Maximum", "p99"])),
        )
}

fn cloudwatch_dashboard_kind(provider: &'static str) -> ResourceKind {
    let schema = AttributeSchema::new(CLOUDWATCH_DASHBOARD)
        .with_field(
            FieldSchema::required("dashboard_name", Type::String)
                .with_constraint(Constraint::Format(Format::Identifier)),
        )
        .with_field(
            FieldSchema::required("widgets", FieldType::list_of(FieldType::record(widget_schema())))
                .with_constraint(Constraint::length(1, 100)),
        )
        .with_field(
            FieldSchema::optional("period_seconds", Type::Int, 300)
                .with_constraint(Constraint::one_of([60, 300, 3600])),
        );

    ResourceKind::new(provider, schema)
        .with_outputs(&["arn"])
        .with_computed(|attrs| {
            let widgets = attrs.list("widgets").map_or(0, |w| w.len());
            attrs! { "widget_count" => i64::try_from(widgets).unwrap_or(i64::MAX) }
        })
        .describe("Metrics dashboard")
}

submit_kind!(cloudwatch_dashboard_kind);

/// Console URL of a dashboard.
#[must_use]
pub fn dashboard_url(region: &str, dashboard_name: &str) -> String {
    format!(
        "https://console.aws.amazon.com/cloudwatch/home?region={region}#dashboards:name={dashboard_name}"
    )
}

/// Declares an `aws_cloudwatch_dashboard`.
///
/// # Errors
///
/// Fails if the attributes are invalid or the name is already declared.
pub fn cloudwatch_dashboard(
    ctx: &mut SynthesisContext,
    name: &str,
    attrs: &AttrMap,
) -> Result<OutputBundle> {
    ctx.declare(CLOUDWATCH_DASHBOARD, name, attrs)
}
