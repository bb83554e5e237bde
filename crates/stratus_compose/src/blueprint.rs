//! Blueprints: declarative descriptions of a composed unit.

use std::fmt;
use std::sync::Arc;

use stratus_foundation::{AttrMap, Result, Value};
use stratus_registry::{Registry, RegistryEntry};
use stratus_schema::{AttributeSchema, ValidatedAttributes};
use tracing::debug;

use crate::aggregate::{AggregateReference, ComputedProperty};
use crate::component::BuildFn;

/// Selects the attributes a member receives.
pub type SelectFn = fn(&ValidatedAttributes) -> AttrMap;

/// Decides whether an optional member is wanted.
pub type GateFn = fn(&ValidatedAttributes) -> bool;

/// Derives an output from the aggregate once its members are composed.
pub type DeriveFn = fn(&AggregateReference) -> Result<Value>;

fn select_nothing(_: &ValidatedAttributes) -> AttrMap {
    AttrMap::new()
}

/// One member slot of a blueprint.
#[derive(Clone)]
pub struct ComponentRequest {
    member: Arc<str>,
    capability: Arc<str>,
    select: SelectFn,
    depends_on: Vec<Arc<str>>,
    gate: Option<GateFn>,
    fallback: Option<BuildFn>,
    optional: bool,
    outputs: Vec<Arc<str>>,
}

impl ComponentRequest {
    /// A required member filled by the component registered under
    /// `capability`. The member takes the capability's name.
    #[must_use]
    pub fn new(capability: impl Into<Arc<str>>) -> Self {
        let capability = capability.into();
        Self {
            member: Arc::clone(&capability),
            capability,
            select: select_nothing,
            depends_on: Vec::new(),
            gate: None,
            fallback: None,
            optional: false,
            outputs: Vec::new(),
        }
    }

    /// Names the member differently from its capability.
    #[must_use]
    pub fn named(mut self, member: impl Into<Arc<str>>) -> Self {
        self.member = member.into();
        self
    }

    /// Sets the attribute selector.
    #[must_use]
    pub fn select(mut self, select: SelectFn) -> Self {
        self.select = select;
        self
    }

    /// Members that must be composed before this one.
    #[must_use]
    pub fn depends_on(mut self, members: &[&str]) -> Self {
        self.depends_on = members.iter().map(|m| Arc::from(*m)).collect();
        self
    }

    /// Only composes the member when `gate` holds. A gated member is
    /// optional.
    #[must_use]
    pub fn when(mut self, gate: GateFn) -> Self {
        self.gate = Some(gate);
        self.optional = true;
        self
    }

    /// Declares resources directly when no component is registered.
    #[must_use]
    pub fn fallback(mut self, fallback: BuildFn) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Omits the member instead of failing when nothing can build it.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Outputs the member must provide, whichever path builds it.
    #[must_use]
    pub fn provides(mut self, outputs: &[&str]) -> Self {
        self.outputs = outputs.iter().map(|o| Arc::from(*o)).collect();
        self
    }

    /// The member name.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The capability looked up in the component registry.
    #[must_use]
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Dependencies, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[Arc<str>] {
        &self.depends_on
    }

    /// The output-name contract.
    #[must_use]
    pub fn contract(&self) -> &[Arc<str>] {
        &self.outputs
    }

    /// Returns true if the member may be omitted.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns true if a fallback path exists.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub(crate) fn is_wanted(&self, attributes: &ValidatedAttributes) -> bool {
        self.gate.is_none_or(|gate| gate(attributes))
    }

    pub(crate) fn inputs(&self, attributes: &ValidatedAttributes) -> AttrMap {
        (self.select)(attributes)
    }

    pub(crate) fn fallback_fn(&self) -> Option<BuildFn> {
        self.fallback
    }
}

impl fmt::Debug for ComponentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRequest")
            .field("member", &self.member)
            .field("capability", &self.capability)
            .field("depends_on", &self.depends_on)
            .field("optional", &self.optional)
            .field("fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}

/// An output of the composed unit.
#[derive(Clone)]
pub struct OutputRule {
    name: Arc<str>,
    requires: Vec<Arc<str>>,
    derive: DeriveFn,
}

impl OutputRule {
    /// An output derived when every member in `requires` is present, and
    /// omitted otherwise.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, requires: &[&str], derive: DeriveFn) -> Self {
        Self {
            name: name.into(),
            requires: requires.iter().map(|r| Arc::from(*r)).collect(),
            derive,
        }
    }

    /// The output name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn applies_to(&self, aggregate: &AggregateReference) -> bool {
        self.requires.iter().all(|member| aggregate.has_member(member))
    }

    pub(crate) fn derive(&self, aggregate: &AggregateReference) -> Result<Value> {
        (self.derive)(aggregate)
    }
}

impl fmt::Debug for OutputRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputRule")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

/// A reusable composed unit, such as a web application stack.
#[derive(Clone)]
pub struct Blueprint {
    kind: Arc<str>,
    provider: Arc<str>,
    schema: Arc<AttributeSchema>,
    requests: Vec<ComponentRequest>,
    outputs: Vec<OutputRule>,
    computed: Vec<(Arc<str>, ComputedProperty)>,
    description: Option<&'static str>,
}

impl Blueprint {
    /// Creates a blueprint whose kind is the schema name.
    #[must_use]
    pub fn new(provider: impl Into<Arc<str>>, schema: AttributeSchema) -> Self {
        Self {
            kind: Arc::clone(&schema.name),
            provider: provider.into(),
            schema: Arc::new(schema),
            requests: Vec::new(),
            outputs: Vec::new(),
            computed: Vec::new(),
            description: None,
        }
    }

    /// Appends a member slot. Members compose in the order they are added.
    #[must_use]
    pub fn with_member(mut self, request: ComponentRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// Appends an output rule.
    #[must_use]
    pub fn with_output(mut self, rule: OutputRule) -> Self {
        self.outputs.push(rule);
        self
    }

    /// Appends a computed property.
    #[must_use]
    pub fn with_computed(mut self, name: impl Into<Arc<str>>, derive: ComputedProperty) -> Self {
        self.computed.push((name.into(), derive));
        self
    }

    /// Attaches a one-line description for listings.
    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// The blueprint kind, e.g. `web_application`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The attribute schema.
    #[must_use]
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Member slots in composition order.
    #[must_use]
    pub fn requests(&self) -> &[ComponentRequest] {
        &self.requests
    }

    /// Output rules in derivation order.
    #[must_use]
    pub fn output_rules(&self) -> &[OutputRule] {
        &self.outputs
    }

    /// Computed properties.
    #[must_use]
    pub fn computed(&self) -> &[(Arc<str>, ComputedProperty)] {
        &self.computed
    }

    /// One-line description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }
}

impl RegistryEntry for Blueprint {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn same_builder(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.schema.fields.len() == other.schema.fields.len()
            && self
                .schema
                .fields
                .iter()
                .zip(&other.schema.fields)
                .all(|(a, b)| a.name == b.name)
            && self.requests.len() == other.requests.len()
            && self.requests.iter().zip(&other.requests).all(|(a, b)| {
                a.member == b.member
                    && a.capability == b.capability
                    && std::ptr::fn_addr_eq(a.select, b.select)
            })
            && self.outputs.len() == other.outputs.len()
            && self.outputs.iter().zip(&other.outputs).all(|(a, b)| {
                a.name == b.name && std::ptr::fn_addr_eq(a.derive, b.derive)
            })
            && self.computed.len() == other.computed.len()
            && self
                .computed
                .iter()
                .zip(&other.computed)
                .all(|((a, f), (b, g))| a == b && std::ptr::fn_addr_eq(*f, *g))
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("kind", &self.kind)
            .field("provider", &self.provider)
            .field("requests", &self.requests)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Static registration entry collected via `inventory`.
pub struct BlueprintRegistration {
    /// Module that submitted the entry.
    pub provider: &'static str,
    /// Builds the blueprint.
    pub define: fn(&'static str) -> Blueprint,
}

inventory::collect!(BlueprintRegistration);

/// Registers every blueprint submitted through `inventory` into `registry`,
/// returning how many were registered.
///
/// # Errors
///
/// Fails on the first ambiguous registration, or if the registry is frozen.
pub fn register_blueprints(registry: &Registry<Blueprint>) -> Result<usize> {
    let mut count = 0;
    for reg in inventory::iter::<BlueprintRegistration> {
        let blueprint = (reg.define)(reg.provider);
        registry.register(Arc::clone(&blueprint.kind), blueprint)?;
        count += 1;
    }
    debug!(count, "blueprints loaded from inventory");
    Ok(count)
}

/// Submits a blueprint for discovery at load time.
#[macro_export]
macro_rules! submit_blueprint {
    ($define:path) => {
        $crate::inventory::submit! {
            $crate::BlueprintRegistration {
                provider: module_path!(),
                define: $define,
            }
        }
    };
}
