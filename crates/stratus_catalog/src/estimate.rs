//! Rough monthly cost and security posture of a composed web application.
//!
//! Prices are on-demand list prices in USD for `us-east-1` and only meant
//! for comparing configurations, not for billing.

use stratus_compose::AggregateReference;
use stratus_foundation::Value;
use stratus_schema::ValidatedAttributes;

/// Hours in an average month.
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Hourly price assumed for classes missing from the table.
pub const DEFAULT_HOURLY: f64 = 0.10;

const HOURLY: &[(&str, f64)] = &[
    ("t3.micro", 0.0104),
    ("t3.small", 0.0208),
    ("t3.medium", 0.0416),
    ("t3.large", 0.0832),
    ("m5.large", 0.096),
    ("m5.xlarge", 0.192),
    ("c5.large", 0.085),
    ("c5.xlarge", 0.17),
    ("db.t3.micro", 0.017),
    ("db.t3.small", 0.034),
    ("db.t3.medium", 0.068),
    ("db.r5.large", 0.25),
    ("db.r5.xlarge", 0.50),
    ("cache.t3.micro", 0.017),
    ("cache.t3.small", 0.034),
    ("cache.r5.large", 0.216),
];

const LOAD_BALANCER_MONTHLY: f64 = 16.43;
const CDN_MONTHLY: f64 = 10.0;
const MONITORING_MONTHLY: f64 = 3.40;
const STORAGE_PER_GB_MONTH: f64 = 0.115;

/// Hourly on-demand price of an instance class.
#[must_use]
pub fn hourly_price(class: &str) -> f64 {
    HOURLY
        .iter()
        .find(|(name, _)| *name == class)
        .map_or(DEFAULT_HOURLY, |(_, price)| *price)
}

fn text<'a>(attributes: &'a ValidatedAttributes, path: &str) -> Option<&'a str> {
    attributes.get_path(path).and_then(Value::as_str)
}

fn int(attributes: &ValidatedAttributes, path: &str) -> Option<i64> {
    attributes.get_path(path).and_then(Value::as_int)
}

fn flag(attributes: &ValidatedAttributes, path: &str) -> bool {
    attributes.get_path(path).and_then(Value::as_bool).unwrap_or(false)
}

#[allow(clippy::cast_precision_loss)]
fn compute_cost(member: &AggregateReference) -> f64 {
    let attributes = member.attributes();
    let instance = hourly_price(text(attributes, "instance_type").unwrap_or_default());
    if member.is_fallback() {
        return instance * HOURS_PER_MONTH;
    }
    let count = int(attributes, "auto_scaling.desired").unwrap_or(1) as f64;
    instance * HOURS_PER_MONTH * count + LOAD_BALANCER_MONTHLY
}

#[allow(clippy::cast_precision_loss)]
fn database_cost(member: &AggregateReference) -> f64 {
    let attributes = member.attributes();
    let storage = int(attributes, "allocated_storage").unwrap_or(20) as f64 * STORAGE_PER_GB_MONTH;
    if member.is_fallback() {
        return hourly_price("db.t3.micro") * HOURS_PER_MONTH + storage;
    }
    let class = hourly_price(text(attributes, "instance_class").unwrap_or_default());
    let copies = if flag(attributes, "multi_az") { 2.0 } else { 1.0 };
    (class * HOURS_PER_MONTH + storage) * copies
}

/// Estimated monthly cost of every present member, rounded to cents.
#[must_use]
pub fn monthly_cost(application: &AggregateReference) -> f64 {
    let component = |name: &str| application.member(name).and_then(|m| m.as_component());

    let mut total = 0.0;
    if let Some(compute) = component("compute") {
        total += compute_cost(compute);
    }
    if let Some(database) = component("database") {
        total += database_cost(database);
    }
    if let Some(cache) = component("cache") {
        let node = text(cache.attributes(), "node_type").unwrap_or_default();
        total += hourly_price(node) * HOURS_PER_MONTH;
    }
    if component("cdn").is_some() {
        total += CDN_MONTHLY;
    }
    if component("monitoring").is_some() {
        total += MONITORING_MONTHLY;
    }
    (total * 100.0).round() / 100.0
}

/// Security posture from 0 to 100, scored from the application settings.
#[must_use]
pub fn security_score(attributes: &ValidatedAttributes) -> i64 {
    let open_to_world = attributes
        .get_path("security.allowed_cidrs")
        .and_then(Value::as_list)
        .is_none_or(|cidrs| cidrs.iter().any(|c| c.as_str() == Some("0.0.0.0/0")));

    [
        (flag(attributes, "security.encryption_at_rest"), 25),
        (flag(attributes, "security.enforce_https"), 20),
        (flag(attributes, "security.waf_enabled"), 20),
        (int(attributes, "database.backup_retention_days").unwrap_or(0) >= 7, 15),
        (!open_to_world, 10),
        (flag(attributes, "database.deletion_protection"), 10),
    ]
    .into_iter()
    .filter(|(applies, _)| *applies)
    .map(|(_, points)| points)
    .sum()
}
