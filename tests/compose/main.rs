//! Integration tests for Layer 3: Composition
//!
//! Tests for composing the catalog's `web_application` architecture under
//! different component registries and profiles.

mod fallback;
mod profiles;

use std::sync::Arc;

use stratus_compose::{AggregateReference, Component, Composer, Environment, Profile};
use stratus_foundation::{AttrMap, Result};
use stratus_registry::Registry;
use stratus_synth::{ResourceKind, SynthesisContext};

/// Frozen catalog kinds.
pub fn kinds() -> Arc<Registry<ResourceKind>> {
    let kinds = Registry::new("resource kind");
    stratus_catalog::register_kinds(&kinds).unwrap();
    kinds.freeze();
    Arc::new(kinds)
}

/// Every catalog component, frozen.
pub fn catalog_components() -> Arc<Registry<Component>> {
    let components = Registry::new("component");
    stratus_catalog::register_components(&components).unwrap();
    components.freeze();
    Arc::new(components)
}

/// A frozen registry holding only `components`.
pub fn only(components: Vec<Component>) -> Arc<Registry<Component>> {
    let registry = Registry::new("component");
    for component in components {
        registry
            .register(component.capability().to_string(), component)
            .unwrap();
    }
    registry.freeze();
    Arc::new(registry)
}

/// Composes `web_application` named `shop` in `ctx` with the standard
/// profile.
pub fn compose_in(
    ctx: &mut SynthesisContext,
    components: Arc<Registry<Component>>,
    raw: &AttrMap,
) -> Result<AggregateReference> {
    let mut composer = Composer::new(ctx, components)
        .with_profile(Profile::standard())
        .with_environment(Environment::Development);
    stratus_catalog::web_application(&mut composer, "shop", raw)
}
