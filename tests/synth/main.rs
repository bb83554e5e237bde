//! Integration tests for Layer 2: Synthesis
//!
//! Tests for declarations, reference checking, and document emission over
//! the catalog's resource kinds.

mod context;
mod document;

use std::sync::Arc;

use stratus_registry::Registry;
use stratus_synth::{ResourceKind, SynthesisContext};

/// Frozen catalog kinds.
pub fn kinds() -> Arc<Registry<ResourceKind>> {
    let kinds = Registry::new("resource kind");
    stratus_catalog::register_kinds(&kinds).unwrap();
    kinds.freeze();
    Arc::new(kinds)
}

/// A fresh context over the catalog kinds.
pub fn context() -> SynthesisContext {
    SynthesisContext::new(kinds())
}
