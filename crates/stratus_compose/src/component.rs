//! Components: registered builders for one capability.

use std::fmt;
use std::sync::Arc;

use stratus_foundation::{AttrMap, Error, ErrorKind, Result, Value};
use stratus_registry::{Registry, RegistryEntry};
use stratus_synth::SynthesisContext;
use tracing::debug;

use crate::aggregate::{AggregateReference, Member};
use crate::profile::Environment;

/// Builds a member aggregate. Shared by registered components and fallback
/// paths, so both satisfy the same contract.
pub type BuildFn = fn(&mut SynthesisContext, &ComponentInput) -> Result<AggregateReference>;

/// What a component or fallback receives when it is invoked.
#[derive(Clone, Debug)]
pub struct ComponentInput {
    name: Arc<str>,
    member: Arc<str>,
    environment: Environment,
    attributes: AttrMap,
    dependencies: Vec<(Arc<str>, Member)>,
}

impl ComponentInput {
    /// Creates an input. The composer builds these; tests and ad-hoc
    /// callers may too.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        member: impl Into<Arc<str>>,
        environment: Environment,
        attributes: AttrMap,
    ) -> Self {
        Self {
            name: name.into(),
            member: member.into(),
            environment,
            attributes,
            dependencies: Vec::new(),
        }
    }

    /// Adds an already-composed dependency.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<Arc<str>>, member: Member) -> Self {
        self.dependencies.push((name.into(), member));
        self
    }

    /// Logical name of the enclosing aggregate; used to name declarations.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member slot being filled, e.g. `database`.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Target environment.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// The attribute subset selected for this member.
    #[must_use]
    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    /// A dependency, if it was composed.
    #[must_use]
    pub fn dependency(&self, name: &str) -> Option<&Member> {
        self.dependencies
            .iter()
            .find(|(dependency, _)| &**dependency == name)
            .map(|(_, member)| member)
    }

    /// An output of a dependency.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::OrderingViolation`] if the dependency was not
    /// composed, and [`ErrorKind::MissingOutput`] if it lacks the output.
    pub fn dependency_output(&self, dependency: &str, output: &str) -> Result<Value> {
        let member = self
            .dependency(dependency)
            .ok_or_else(|| Error::ordering_violation(&*self.member, dependency))?;
        member
            .output(output)
            .ok_or_else(|| Error::missing_output(dependency, output))
    }
}

/// A registered builder for one capability, such as `network`.
#[derive(Clone)]
pub struct Component {
    capability: Arc<str>,
    provider: Arc<str>,
    build: BuildFn,
    description: Option<&'static str>,
}

impl Component {
    /// Creates a component.
    #[must_use]
    pub fn new(
        capability: impl Into<Arc<str>>,
        provider: impl Into<Arc<str>>,
        build: BuildFn,
    ) -> Self {
        Self {
            capability: capability.into(),
            provider: provider.into(),
            build,
            description: None,
        }
    }

    /// Attaches a one-line description for listings.
    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// The capability this component provides.
    #[must_use]
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// One-line description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Invokes the builder.
    ///
    /// # Errors
    ///
    /// Propagates any declaration or composition failure.
    pub fn build(
        &self,
        context: &mut SynthesisContext,
        input: &ComponentInput,
    ) -> Result<AggregateReference> {
        (self.build)(context, input)
    }
}

impl RegistryEntry for Component {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn same_builder(&self, other: &Self) -> bool {
        self.capability == other.capability && std::ptr::fn_addr_eq(self.build, other.build)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("capability", &self.capability)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// Static registration entry collected via `inventory`.
pub struct ComponentRegistration {
    /// Module that submitted the entry.
    pub provider: &'static str,
    /// Builds the component definition.
    pub define: fn(&'static str) -> Component,
}

inventory::collect!(ComponentRegistration);

/// Registers every component submitted through `inventory` into
/// `registry`, returning how many were registered.
///
/// # Errors
///
/// Fails on the first ambiguous registration, or if the registry is frozen.
pub fn register_components(registry: &Registry<Component>) -> Result<usize> {
    let mut count = 0;
    for reg in inventory::iter::<ComponentRegistration> {
        let component = (reg.define)(reg.provider);
        registry.register(Arc::clone(&component.capability), component)?;
        count += 1;
    }
    debug!(count, "components loaded from inventory");
    Ok(count)
}

/// Submits a component definition for discovery at load time.
#[macro_export]
macro_rules! submit_component {
    ($define:path) => {
        $crate::inventory::submit! {
            $crate::ComponentRegistration {
                provider: module_path!(),
                define: $define,
            }
        }
    };
}

/// Error for a required capability with neither a component nor a
/// fallback.
pub(crate) fn unavailable(capability: &str) -> Error {
    Error::new(ErrorKind::UnknownKind(format!("component {capability}")))
}
