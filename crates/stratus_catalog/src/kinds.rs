//! Resource kinds for a representative slice of AWS.
//!
//! Each kind is submitted through `inventory` from its defining module and
//! can also be registered explicitly with [`register_kinds`]. Both paths
//! use the defining module as the provider, so mixing them is harmless.
//!
//! Every kind comes with a typed builder, e.g. [`network::vpc`], that
//! declares a resource of that kind in a synthesis context.

pub mod compute;
pub mod data;
pub mod edge;
pub mod network;
pub mod ops;

use stratus_foundation::{Result, Value};
use stratus_registry::Registry;
use stratus_synth::ResourceKind;
use tracing::debug;

type Define = fn(&'static str) -> ResourceKind;

const CATALOG: &[(&str, &[Define])] = &[
    (network::PROVIDER, network::DEFINITIONS),
    (compute::PROVIDER, compute::DEFINITIONS),
    (data::PROVIDER, data::DEFINITIONS),
    (edge::PROVIDER, edge::DEFINITIONS),
    (ops::PROVIDER, ops::DEFINITIONS),
];

/// Registers every catalog kind into `registry`, returning how many were
/// registered.
///
/// # Errors
///
/// Fails if another provider already registered one of the kind names, or
/// if the registry is frozen.
pub fn register_kinds(registry: &Registry<ResourceKind>) -> Result<usize> {
    let mut count = 0;
    for (provider, definitions) in CATALOG {
        for define in *definitions {
            let kind = define(provider);
            registry.register(kind.name().to_string(), kind)?;
            count += 1;
        }
    }
    debug!(count, "catalog kinds registered");
    Ok(count)
}

/// Names of every catalog kind.
#[must_use]
pub fn kind_names() -> Vec<&'static str> {
    vec![
        network::VPC,
        network::SUBNET,
        network::SECURITY_GROUP,
        compute::LOAD_BALANCER,
        compute::LAUNCH_TEMPLATE,
        compute::AUTOSCALING_GROUP,
        data::DB_INSTANCE,
        data::ELASTICACHE_CLUSTER,
        data::SQS_QUEUE,
        edge::CLOUDFRONT_DISTRIBUTION,
        edge::ROUTE53_RECORD,
        ops::CLOUDWATCH_DASHBOARD,
    ]
}

/// Accepts EC2-style instance classes such as `t3.micro`, `db.r5.large`,
/// or `cache.t3.small`.
pub(crate) fn is_instance_class(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return matches!(value, Value::Ref(_));
    };
    let parts: Vec<&str> = s.split('.').collect();
    let (family, size) = match parts.as_slice() {
        [family, size] | ["db" | "cache", family, size] => (*family, *size),
        _ => return false,
    };
    family.starts_with(|c: char| c.is_ascii_lowercase())
        && family.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && !size.is_empty()
        && size.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
