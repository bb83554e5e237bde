//! Core values, types, references, and errors for Stratus.
//!
//! This crate provides:
//! - [`Value`] - The attribute value type for every resource definition
//! - [`Reference`] - Symbolic handles to outputs that only exist after deployment
//! - [`Type`] - Type descriptors for schema validation
//! - [`FieldPath`] - Addresses of fields inside nested attribute values
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod path;
pub mod reference;
pub mod types;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use path::{FieldPath, PathSegment};
pub use reference::{ContextId, Reference};
pub use types::Type;
pub use value::{AttrMap, Value, merge_maps};

/// Builds an [`AttrMap`] from `key => value` pairs.
///
/// ```
/// use stratus_foundation::{attrs, Value};
///
/// let map = attrs! { "cidr_block" => "10.0.0.0/16", "enable_dns" => true };
/// assert_eq!(map.get("enable_dns"), Some(&Value::Bool(true)));
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::AttrMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        $crate::AttrMap::new()
            $(.insert(::std::sync::Arc::<str>::from($key), $crate::Value::from($value)))+
    }};
}
