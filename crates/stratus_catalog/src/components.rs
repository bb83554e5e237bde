//! Components for the capabilities a web application is built from.
//!
//! ```text
//! network ──▶ compute ──▶ cdn
//!    │           │
//!    ├──▶ database ──▶ monitoring
//!    └──▶ cache
//! ```
//!
//! Every component reads its dependencies' outputs through
//! [`ComponentInput::dependency_output`] and publishes its own through an
//! [`AggregateBuilder`](stratus_compose::AggregateBuilder). Network,
//! compute, and database also provide a minimal builder used when no
//! component is registered for the capability.

pub mod cache;
pub mod cdn;
pub mod compute;
pub mod database;
pub mod monitoring;
pub mod network;

use std::net::Ipv4Addr;

use stratus_compose::{Component, ComponentInput};
use stratus_foundation::{AttrMap, Error, FieldPath, LtVec, Result, Value, attrs};
use stratus_registry::Registry;
use tracing::debug;

type Define = fn(&'static str) -> Component;

const CATALOG: &[(&str, Define)] = &[
    (network::PROVIDER, network::component),
    (compute::PROVIDER, compute::component),
    (database::PROVIDER, database::component),
    (cache::PROVIDER, cache::component),
    (cdn::PROVIDER, cdn::component),
    (monitoring::PROVIDER, monitoring::component),
];

/// Registers every catalog component into `registry`, returning how many
/// were registered.
///
/// # Errors
///
/// Fails if another provider already registered one of the capabilities,
/// or if the registry is frozen.
pub fn register_components(registry: &Registry<Component>) -> Result<usize> {
    for (provider, define) in CATALOG {
        let component = define(provider);
        registry.register(component.capability().to_string(), component)?;
    }
    debug!(count = CATALOG.len(), "catalog components registered");
    Ok(CATALOG.len())
}

/// Tags applied to every taggable resource a component declares.
pub(crate) fn tags(input: &ComponentInput) -> AttrMap {
    attrs! {
        "Name" => input.name(),
        "Environment" => input.environment().as_str(),
        "Component" => input.member(),
        "ManagedBy" => "stratus",
    }
}

/// Logical name of a secondary resource, e.g. `shop-public-0`.
pub(crate) fn child_name(input: &ComponentInput, suffix: &str) -> String {
    format!("{}-{suffix}", input.name())
}

/// Literal stand-in for an output a minimal builder cannot produce.
pub(crate) fn stand_in(input: &ComponentInput, output: &str) -> Value {
    Value::from(format!("{}-{output}", input.name()))
}

/// A single-element list.
pub(crate) fn one(value: impl Into<Value>) -> Value {
    Value::List(std::iter::once(value.into()).collect::<LtVec<Value>>())
}

/// Carves the `index`th /24 out of `base`.
///
/// # Errors
///
/// Returns a validation error if `base` does not parse or is too small to
/// hold the subnet.
pub fn subnet_cidr(base: &str, index: u32) -> Result<String> {
    let invalid = |reason: String| {
        Error::validation("network", FieldPath::field("cidr_block"), reason)
    };
    let (address, prefix) = base
        .split_once('/')
        .ok_or_else(|| invalid(format!("{base:?} is not a CIDR block")))?;
    let address: Ipv4Addr = address
        .parse()
        .map_err(|_| invalid(format!("{base:?} is not a CIDR block")))?;
    let prefix: u32 = prefix
        .parse()
        .ok()
        .filter(|p| *p <= 24)
        .ok_or_else(|| invalid(format!("{base:?} must be /24 or larger")))?;

    let capacity = 1u32 << (24 - prefix);
    if index >= capacity {
        return Err(invalid(format!("{base} holds {capacity} /24 subnets, needed {}", index + 1)));
    }
    let network = u32::from(address) & (u32::MAX.checked_shl(32 - prefix).unwrap_or(0));
    Ok(format!("{}/24", Ipv4Addr::from(network + (index << 8))))
}
