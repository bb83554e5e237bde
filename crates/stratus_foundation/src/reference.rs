//! Symbolic references to resource outputs.
//!
//! A [`Reference`] names a value that only exists once a declared resource
//! has been realized by the downstream consumer: a VPC's id, a load
//! balancer's DNS name, a database endpoint. References are opaque data.
//! They can be minted, rendered as a placeholder, and compared; they are
//! never resolved inside this system.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

/// Identifies the synthesis session that minted a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocates a fresh, process-unique context id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONTEXT.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Symbolic handle to `kind.logical_name.output_path`.
///
/// Equality, ordering and hashing use only the triple. The originating
/// [`ContextId`] is carried so a context can reject references minted
/// elsewhere, but two references with the same triple compare equal.
#[derive(Clone)]
pub struct Reference {
    kind: Arc<str>,
    name: Arc<str>,
    path: Arc<str>,
    origin: ContextId,
}

impl Reference {
    /// Mints a reference owned by the given context.
    ///
    /// Synthesis contexts call this once per documented output of a
    /// declaration; other callers should go through the context.
    #[must_use]
    pub fn mint(
        origin: ContextId,
        kind: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        path: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            path: path.into(),
            origin,
        }
    }

    /// The resource kind, e.g. `aws_vpc`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The logical name of the declaration.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        &self.name
    }

    /// The output path on the resource, e.g. `id` or `endpoint`.
    #[must_use]
    pub fn output_path(&self) -> &str {
        &self.path
    }

    /// The context that minted this reference.
    #[must_use]
    pub const fn origin(&self) -> ContextId {
        self.origin
    }

    /// Returns true if this reference was minted by `context`.
    #[must_use]
    pub fn is_from(&self, context: ContextId) -> bool {
        self.origin == context
    }

    /// Returns the reference to another output of the same resource.
    #[must_use]
    pub fn sibling(&self, path: impl Into<Arc<str>>) -> Self {
        Self {
            kind: Arc::clone(&self.kind),
            name: Arc::clone(&self.name),
            path: path.into(),
            origin: self.origin,
        }
    }

    /// Renders the deferred-value placeholder, `${kind.name.path}`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("${{{}.{}.{}}}", self.kind, self.name, self.path)
    }

    fn triple(&self) -> (&str, &str, &str) {
        (&self.kind, &self.name, &self.path)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.triple().hash(state);
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({}.{}.{} @{})", self.kind, self.name, self.path, self.origin)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(feature = "serde")]
impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}
