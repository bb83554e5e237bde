//! Resource kinds and their registration.

use std::fmt;
use std::sync::Arc;

use stratus_foundation::{AttrMap, Result};
use stratus_registry::{Registry, RegistryEntry};
use stratus_schema::{AttributeSchema, ValidatedAttributes};
use tracing::debug;

/// Derives kind-specific computed properties from validated attributes.
///
/// Must be pure: the same attributes always produce the same map.
pub type ComputedFn = fn(&ValidatedAttributes) -> AttrMap;

/// Builder contract for one cloud resource kind.
///
/// A kind pairs the schema its attributes are checked against with the
/// outputs a declaration exposes as references.
#[derive(Clone)]
pub struct ResourceKind {
    name: Arc<str>,
    provider: Arc<str>,
    schema: Arc<AttributeSchema>,
    outputs: Vec<Arc<str>>,
    computed: ComputedFn,
    description: Option<&'static str>,
}

fn no_computed(_: &ValidatedAttributes) -> AttrMap {
    AttrMap::new()
}

impl ResourceKind {
    /// Creates a kind with the given schema. The kind name is the schema
    /// name.
    #[must_use]
    pub fn new(provider: impl Into<Arc<str>>, schema: AttributeSchema) -> Self {
        Self {
            name: Arc::clone(&schema.name),
            provider: provider.into(),
            schema: Arc::new(schema),
            outputs: vec![Arc::from("id")],
            computed: no_computed,
            description: None,
        }
    }

    /// Replaces the documented outputs. Every kind exposes `id`, which is
    /// kept even if absent from `outputs`.
    #[must_use]
    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        self.outputs = vec![Arc::from("id")];
        for output in outputs {
            if !self.outputs.iter().any(|o| &**o == *output) {
                self.outputs.push(Arc::from(*output));
            }
        }
        self
    }

    /// Sets the computed-property function.
    #[must_use]
    pub fn with_computed(mut self, computed: ComputedFn) -> Self {
        self.computed = computed;
        self
    }

    /// Attaches a one-line description for listings.
    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// The kind name, e.g. `aws_vpc`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute schema.
    #[must_use]
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Documented outputs, in declaration order.
    #[must_use]
    pub fn outputs(&self) -> &[Arc<str>] {
        &self.outputs
    }

    /// Returns true if `output` is a documented output of this kind.
    #[must_use]
    pub fn has_output(&self, output: &str) -> bool {
        self.outputs.iter().any(|o| &**o == output)
    }

    /// Evaluates the computed properties for `attrs`.
    #[must_use]
    pub fn computed(&self, attrs: &ValidatedAttributes) -> AttrMap {
        (self.computed)(attrs)
    }

    /// One-line description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }
}

impl RegistryEntry for ResourceKind {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn same_builder(&self, other: &Self) -> bool {
        self.name == other.name
            && self.outputs == other.outputs
            && same_fields(&self.schema, &other.schema)
            && std::ptr::fn_addr_eq(self.computed, other.computed)
    }
}

fn same_fields(a: &AttributeSchema, b: &AttributeSchema) -> bool {
    a.fields.len() == b.fields.len()
        && a.fields.iter().zip(&b.fields).all(|(x, y)| x.name == y.name)
}

impl fmt::Debug for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceKind")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Static registration entry collected via `inventory`.
///
/// Submit one per kind with [`submit_kind!`](crate::submit_kind); the
/// entries are turned into [`ResourceKind`]s by [`register_inventory`].
pub struct KindRegistration {
    /// Module that submitted the entry.
    pub provider: &'static str,
    /// Builds the kind definition.
    pub define: fn(&'static str) -> ResourceKind,
}

inventory::collect!(KindRegistration);

/// Registers every kind submitted through `inventory` into `registry`.
///
/// Returns the number of kinds registered.
///
/// # Errors
///
/// Fails on the first ambiguous registration, or if the registry is frozen.
pub fn register_inventory(registry: &Registry<ResourceKind>) -> Result<usize> {
    let mut count = 0;
    for reg in inventory::iter::<KindRegistration> {
        let kind = (reg.define)(reg.provider);
        registry.register(Arc::clone(&kind.name), kind)?;
        count += 1;
    }
    debug!(count, "resource kinds loaded from inventory");
    Ok(count)
}

/// Submits a resource kind definition for discovery at load time.
///
/// `$define` is a `fn(&'static str) -> ResourceKind` receiving the
/// submitting module's path as the provider.
#[macro_export]
macro_rules! submit_kind {
    ($define:path) => {
        $crate::inventory::submit! {
            $crate::KindRegistration {
                provider: module_path!(),
                define: $define,
            }
        }
    };
}
