//! Resource declaration and synthesis for Stratus.
//!
//! A [`SynthesisContext`] turns declarations into a [`Document`]:
//!
//! ```text
//! declare(kind, name, raw)
//!      │
//!      ├─▶ Registry<ResourceKind>::lookup(kind)     unknown kind: abort
//!      ├─▶ AttributeSchema::instantiate(raw)        invalid input: abort
//!      ├─▶ embedded references minted here?         foreign/dangling: abort
//!      ├─▶ (kind, name) unique?                     duplicate: abort
//!      ├─▶ append declaration
//!      └─▶ OutputBundle { one Reference per documented output, computed }
//!
//! emit() ──▶ Document { resource: kind → name → fields, output: name → value }
//! ```
//!
//! Resource kinds make themselves discoverable with [`submit_kind!`] and
//! are loaded into a registry with [`register_inventory`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod context;
pub mod document;
pub mod kind;

pub use context::{OutputBundle, ResourceDeclaration, SynthesisContext};
pub use document::{Document, ResourceGroup};
pub use kind::{ComputedFn, KindRegistration, ResourceKind, register_inventory};

#[doc(hidden)]
pub use inventory;
