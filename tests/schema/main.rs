//! Integration tests for Layer 1: Schema and Registry
//!
//! Tests for attribute schemas, phase ordering, nested paths, and guarded
//! registries.

mod instantiate;
mod registry;
