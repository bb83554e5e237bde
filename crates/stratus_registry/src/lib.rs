//! Process-wide builder registries for Stratus.
//!
//! Resource kinds, components and architectures make themselves
//! discoverable by registering under a unique name. A [`Registry`] has two
//! phases:
//!
//! ```text
//! LOADING ──freeze()──▶ FROZEN
//!  register: guarded     register: rejected
//!  lookup:   guarded     lookup:   lock-free
//! ```
//!
//! The mutex guarding the loading phase is the only lock in the system.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod registry;

pub use registry::{Registry, RegistryEntry};
