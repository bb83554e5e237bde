//! Attribute schemas and validation for Stratus.
//!
//! A schema describes the configuration surface of one resource kind,
//! component, or architecture. Instantiating a schema against raw input is
//! the only way to obtain [`ValidatedAttributes`]:
//!
//! ```text
//! raw AttrMap
//!      │
//!      ▼
//! ┌──────────────┐
//! │ 1. SHAPE     │  unknown keys, required fields, defaults
//! └──────────────┘
//!      │
//!      ▼
//! ┌──────────────┐
//! │ 2. TYPES     │  per field, nested records recurse
//! └──────────────┘
//!      │
//!      ▼
//! ┌──────────────┐
//! │ 3. FIELD     │  range, one-of, pattern, format, length
//! │ CONSTRAINTS  │
//! └──────────────┘
//!      │
//!      ▼
//! ┌──────────────┐
//! │ 4. CROSS-    │  exactly-one-of, requires, custom rules
//! │ FIELD RULES  │
//! └──────────────┘
//!      │
//!      ▼
//! ValidatedAttributes (immutable)
//! ```
//!
//! The first failure aborts instantiation with a validation error carrying
//! the full field path.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attributes;
pub mod constraint;
mod instantiate;
pub mod schema;
pub mod validator;

pub use attributes::ValidatedAttributes;
pub use constraint::{Constraint, Format};
pub use schema::{AttributeSchema, FieldSchema, FieldType, UnknownFields};
pub use validator::{Validator, Violation};
