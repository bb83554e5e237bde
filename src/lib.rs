//! Stratus - Declarative resource graph and synthesis engine
//!
//! This crate re-exports all layers of the Stratus system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: stratus_runtime    - Sessions, config, serialization, CLI
//! Layer 4: stratus_catalog    - AWS resource kinds, components, web_application
//! Layer 3: stratus_compose    - Composer, aggregates, fallbacks, profiles
//! Layer 2: stratus_synth      - Resource kinds, synthesis context, document
//! Layer 1: stratus_schema     - Attribute schemas, constraints, validators
//!          stratus_registry   - Guarded registries with freeze
//! Layer 0: stratus_foundation - Core types (Value, Reference, Error)
//! ```

pub use stratus_catalog as catalog;
pub use stratus_compose as compose;
pub use stratus_foundation as foundation;
pub use stratus_registry as registry;
pub use stratus_runtime as runtime;
pub use stratus_schema as schema;
pub use stratus_synth as synth;
