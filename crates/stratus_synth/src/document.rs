//! The synthesis document.
//!
//! Serializes as
//!
//! ```text
//! {
//!   "resource": { kind: { logical_name: { field: value, .. }, .. }, .. },
//!   "output":   { name: { "value": value }, .. }
//! }
//! ```
//!
//! Kinds appear in first-declaration order, blocks in declaration order,
//! and fields sorted by name. References serialize as their placeholder.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use stratus_foundation::{AttrMap, Value};

/// All declarations of one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceGroup {
    pub(crate) kind: Arc<str>,
    pub(crate) blocks: Vec<(Arc<str>, AttrMap)>,
}

impl ResourceGroup {
    /// The resource kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Logical names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|(name, _)| &**name)
    }

    /// The block for a logical name.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&AttrMap> {
        self.blocks
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, block)| block)
    }

    /// Number of declarations in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the group has no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Ordered, grouped-by-kind result of a synthesis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    groups: Vec<ResourceGroup>,
    outputs: Vec<(Arc<str>, Value)>,
}

impl Document {
    pub(crate) fn new(groups: Vec<ResourceGroup>, outputs: Vec<(Arc<str>, Value)>) -> Self {
        Self { groups, outputs }
    }

    /// Resource groups in first-declaration order.
    #[must_use]
    pub fn groups(&self) -> &[ResourceGroup] {
        &self.groups
    }

    /// The group for a kind.
    #[must_use]
    pub fn group(&self, kind: &str) -> Option<&ResourceGroup> {
        self.groups.iter().find(|g| &*g.kind == kind)
    }

    /// The block for a declaration.
    #[must_use]
    pub fn resource(&self, kind: &str, name: &str) -> Option<&AttrMap> {
        self.group(kind).and_then(|g| g.block(name))
    }

    /// A document output.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, value)| value)
    }

    /// Document outputs in export order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.outputs.iter().map(|(name, value)| (&**name, value))
    }

    /// Total number of declarations.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.groups.iter().map(ResourceGroup::len).sum()
    }

    /// Returns true if nothing was declared or exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.outputs.is_empty()
    }
}

struct Blocks<'a>(&'a [(Arc<str>, AttrMap)]);

impl Serialize for Blocks<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, block) in self.0 {
            map.serialize_entry(&**name, block)?;
        }
        map.end()
    }
}

struct Groups<'a>(&'a [ResourceGroup]);

impl Serialize for Groups<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in self.0 {
            map.serialize_entry(&*group.kind, &Blocks(&group.blocks))?;
        }
        map.end()
    }
}

struct OutputValue<'a>(&'a Value);

impl Serialize for OutputValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("value", self.0)?;
        map.end()
    }
}

struct Outputs<'a>(&'a [(Arc<str>, Value)]);

impl Serialize for Outputs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(&**name, &OutputValue(value))?;
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.outputs.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("resource", &Groups(&self.groups))?;
        if !self.outputs.is_empty() {
            map.serialize_entry("output", &Outputs(&self.outputs))?;
        }
        map.end()
    }
}
