//! Component and architecture composition for Stratus.
//!
//! A [`Blueprint`] describes a composed unit: its attribute schema, member
//! slots in a fixed order, curated outputs and computed properties. The
//! [`Composer`] walks it through four phases:
//!
//! ```text
//! MERGING_ATTRS ──▶ COMPOSING_MEMBERS ──▶ DERIVING_OUTPUTS ──▶ DERIVING_COMPUTED ──▶ DONE
//!   profile < caller    per member:           rules whose            attach pure
//!   schema instantiate    component found?      members are present   fn(&aggregate)
//!                           yes: build
//!                           no:  fallback / omit / fail
//! ```
//!
//! Phases never repeat. Any failure aborts the composition; a fallback is
//! the only soft degrade.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregate;
pub mod blueprint;
pub mod component;
pub mod composer;
pub mod profile;

pub use aggregate::{AggregateBuilder, AggregateReference, ComputedProperty, Member};
pub use blueprint::{
    Blueprint, BlueprintRegistration, ComponentRequest, DeriveFn, GateFn, OutputRule, SelectFn,
    register_blueprints,
};
pub use component::{
    BuildFn, Component, ComponentInput, ComponentRegistration, register_components,
};
pub use composer::{Composer, CompositionState};
pub use profile::{Environment, Profile};

#[doc(hidden)]
pub use inventory;
