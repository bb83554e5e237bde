//! End-to-end tests: attributes in, documents out
//!
//! These drive a [`Session`](stratus_runtime::Session) the way the CLI
//! does, from raw attributes and config text through to encoded bytes.

mod documents;
mod inputs;

use stratus_foundation::{AttrMap, attrs};
use stratus_runtime::{Session, SynthConfig};

/// A session over the built-in catalog with default configuration.
pub fn session() -> Session {
    Session::new(SynthConfig::default()).unwrap()
}

/// Minimal attributes for the `web_application` architecture.
pub fn shop() -> AttrMap {
    attrs! { "domain_name" => "example.com" }
}
