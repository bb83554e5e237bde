//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Reference, FieldPath, Error, and persistent
//! collections.

mod errors;
mod references;
mod values;
