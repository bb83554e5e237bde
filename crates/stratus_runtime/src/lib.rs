//! Sessions, configuration, document serialization, and CLI for Stratus.
//!
//! This crate provides:
//! - [`Session`] - Frozen registries and the synthesis entry point
//! - [`SynthConfig`] - Environment, output, and profile settings, loadable from TOML
//! - Attribute input from JSON/TOML files and `key.path=value` assignments
//! - Document serialization to JSON and `MessagePack`
//!
//! ```text
//! attrs file ─┐
//! --set k=v ──┴─▶ AttrMap ─▶ Session::synthesize ─▶ Document ─▶ json | msgpack
//!                              (fresh context each call)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod input;
pub mod serialize;
pub mod session;

pub use config::{OutputFormat, SynthConfig};
pub use input::{apply_assignments, load_attributes};
pub use serialize::{encode, save_to_file, to_json, to_json_pretty, to_msgpack};
pub use session::{Session, Synthesis};
