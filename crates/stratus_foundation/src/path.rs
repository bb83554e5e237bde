//! Field paths into nested attribute values.

use std::fmt;
use std::sync::Arc;

/// One step in a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field of a record.
    Field(Arc<str>),
    /// A position in a list.
    Index(usize),
    /// A key in a free-form map.
    Key(Arc<str>),
}

/// Location of a value inside a (possibly nested) attribute set.
///
/// Displays as `auto_scaling.min`, `listeners[0].port` or `tags["Name"]`.
/// The empty path displays as `<root>` and addresses the whole attribute set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A single-segment path naming a top-level field.
    #[must_use]
    pub fn field(name: impl Into<Arc<str>>) -> Self {
        Self(vec![PathSegment::Field(name.into())])
    }

    /// Returns this path extended by a field segment.
    #[must_use]
    pub fn join_field(&self, name: impl Into<Arc<str>>) -> Self {
        self.join(PathSegment::Field(name.into()))
    }

    /// Returns this path extended by a list index.
    #[must_use]
    pub fn join_index(&self, index: usize) -> Self {
        self.join(PathSegment::Index(index))
    }

    /// Returns this path extended by a map key.
    #[must_use]
    pub fn join_key(&self, key: impl Into<Arc<str>>) -> Self {
        self.join(PathSegment::Key(key.into()))
    }

    /// Returns this path extended by every segment of `suffix`.
    #[must_use]
    pub fn join_path(&self, suffix: &FieldPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(suffix.0.iter().cloned());
        Self(segments)
    }

    fn join(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Returns true for the empty path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments of this path, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}
