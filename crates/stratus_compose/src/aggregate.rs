//! Aggregate references: the result of composing many resources into one
//! unit.

use std::collections::BTreeSet;
use std::sync::Arc;

use stratus_foundation::{AttrMap, Error, ErrorKind, LtVec, Result, Value};
use stratus_schema::ValidatedAttributes;
use stratus_synth::OutputBundle;

/// Derives a computed property from an aggregate.
///
/// Receives nothing but the aggregate, so the value can be recomputed at
/// any time and always agrees with the aggregate's members and attributes.
pub type ComputedProperty = fn(&AggregateReference) -> Value;

/// A composed member of an aggregate.
#[derive(Clone, Debug)]
pub enum Member {
    /// A single declared resource.
    Resource(OutputBundle),
    /// A sub-component, itself an aggregate.
    Component(AggregateReference),
}

impl Member {
    /// Looks up an output. For a resource this is a documented output
    /// reference; for a component, one of its curated outputs.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<Value> {
        match self {
            Self::Resource(bundle) => bundle.output(name).map(Value::from),
            Self::Component(aggregate) => aggregate.output(name).cloned(),
        }
    }

    /// Returns true if this member was produced by a fallback path.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Component(aggregate) if aggregate.is_fallback())
    }

    /// Returns the component aggregate, if this member is one.
    #[must_use]
    pub fn as_component(&self) -> Option<&AggregateReference> {
        match self {
            Self::Component(aggregate) => Some(aggregate),
            Self::Resource(_) => None,
        }
    }

    fn collect_resources(&self, into: &mut BTreeSet<(String, String)>) {
        match self {
            Self::Resource(bundle) => {
                into.insert((bundle.kind().to_string(), bundle.logical_name().to_string()));
            }
            Self::Component(aggregate) => {
                for (_, member) in &aggregate.members {
                    member.collect_resources(into);
                }
            }
        }
    }
}

/// A composed unit: members, curated outputs, and computed properties.
///
/// Members are explicitly present or absent; an optional member that was
/// not composed simply has no entry. Outputs only reference resources
/// owned by present members.
#[derive(Clone, Debug)]
pub struct AggregateReference {
    kind: Arc<str>,
    name: Arc<str>,
    attributes: ValidatedAttributes,
    members: Vec<(Arc<str>, Member)>,
    outputs: AttrMap,
    computed: Vec<(Arc<str>, ComputedProperty)>,
    fallback: bool,
}

impl AggregateReference {
    /// The capability or architecture name, e.g. `network`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The logical name the aggregate was composed under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated attributes the aggregate was composed from.
    #[must_use]
    pub fn attributes(&self) -> &ValidatedAttributes {
        &self.attributes
    }

    /// A member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|(member, _)| &**member == name)
            .map(|(_, m)| m)
    }

    /// Returns true if the member is present.
    #[must_use]
    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Members in composition order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, m)| (&**name, m))
    }

    /// A curated output.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// All curated outputs.
    #[must_use]
    pub fn outputs(&self) -> &AttrMap {
        &self.outputs
    }

    /// Evaluates one computed property.
    #[must_use]
    pub fn computed(&self, name: &str) -> Option<Value> {
        self.computed
            .iter()
            .find(|(property, _)| &**property == name)
            .map(|(_, derive)| derive(self))
    }

    /// Evaluates every computed property.
    #[must_use]
    pub fn computed_values(&self) -> AttrMap {
        self.computed
            .iter()
            .map(|(name, derive)| (Arc::clone(name), derive(self)))
            .collect()
    }

    /// Names of computed properties, in registration order.
    pub fn computed_names(&self) -> impl Iterator<Item = &str> {
        self.computed.iter().map(|(name, _)| &**name)
    }

    /// Returns true if this aggregate was synthesized by a fallback path
    /// instead of a registered component.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Names of direct members produced by a fallback path.
    #[must_use]
    pub fn fallback_members(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|(_, member)| member.is_fallback())
            .map(|(name, _)| &**name)
            .collect()
    }

    /// A plain-value view of the aggregate for reporting.
    #[must_use]
    pub fn summary(&self) -> AttrMap {
        let members: LtVec<Value> = self
            .members
            .iter()
            .map(|(name, _)| Value::from(Arc::clone(name)))
            .collect();
        let fallbacks: LtVec<Value> = self
            .fallback_members()
            .into_iter()
            .map(Value::from)
            .collect();
        AttrMap::new()
            .insert("kind".into(), Value::from(Arc::clone(&self.kind)))
            .insert("name".into(), Value::from(Arc::clone(&self.name)))
            .insert("members".into(), Value::List(members))
            .insert("fallback_members".into(), Value::List(fallbacks))
            .insert("outputs".into(), Value::Map(self.outputs.clone()))
            .insert("computed".into(), Value::Map(self.computed_values()))
    }

    pub(crate) fn mark_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub(crate) fn insert_output(&mut self, name: &str, value: Value) -> Result<()> {
        let owned = self.owned_resources();
        let mut checked = Ok(());
        value.for_each_reference(&mut |r| {
            let key = (r.kind().to_string(), r.logical_name().to_string());
            if checked.is_ok() && !owned.contains(&key) {
                checked = Err(Error::new(ErrorKind::DanglingReference(r.render()))
                    .with_frame(format!("output {name} of {} {}", self.kind, self.name)));
            }
        });
        checked?;
        self.outputs = self.outputs.insert(Arc::from(name), value);
        Ok(())
    }

    pub(crate) fn push_computed(&mut self, name: &str, derive: ComputedProperty) {
        self.computed.retain(|(existing, _)| &**existing != name);
        self.computed.push((Arc::from(name), derive));
    }

    fn owned_resources(&self) -> BTreeSet<(String, String)> {
        let mut owned = BTreeSet::new();
        for (_, member) in &self.members {
            member.collect_resources(&mut owned);
        }
        owned
    }
}

/// Assembles an [`AggregateReference`].
///
/// Components and fallbacks use this to collect the resources they declare
/// and to publish their outputs.
#[derive(Debug)]
pub struct AggregateBuilder {
    aggregate: AggregateReference,
}

impl AggregateBuilder {
    /// Starts an aggregate of the given kind.
    #[must_use]
    pub fn new(
        kind: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        attributes: ValidatedAttributes,
    ) -> Self {
        Self {
            aggregate: AggregateReference {
                kind: kind.into(),
                name: name.into(),
                attributes,
                members: Vec::new(),
                outputs: AttrMap::new(),
                computed: Vec::new(),
                fallback: false,
            },
        }
    }

    /// Adds a declared resource as a member.
    ///
    /// # Errors
    ///
    /// See [`AggregateBuilder::member`].
    pub fn resource(
        &mut self,
        member: impl Into<Arc<str>>,
        bundle: OutputBundle,
    ) -> Result<&mut Self> {
        self.member(member, Member::Resource(bundle))
    }

    /// Adds a member.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateDeclaration`] if a member with the same
    /// name already exists. Published outputs may reference it, so members
    /// are never replaced.
    pub fn member(&mut self, name: impl Into<Arc<str>>, member: Member) -> Result<&mut Self> {
        let name = name.into();
        if self.aggregate.has_member(&name) {
            return Err(
                Error::duplicate_declaration(&*self.aggregate.kind, &*name).with_frame(format!(
                    "aggregate {} {}",
                    self.aggregate.kind, self.aggregate.name
                )),
            );
        }
        self.aggregate.members.push((name, member));
        Ok(self)
    }

    /// Publishes an output.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DanglingReference`] if `value` references a
    /// resource that is not owned by a member of this aggregate.
    pub fn output(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.aggregate.insert_output(name, value.into())?;
        Ok(self)
    }

    /// Attaches a computed property.
    pub fn computed(&mut self, name: &str, derive: ComputedProperty) -> &mut Self {
        self.aggregate.push_computed(name, derive);
        self
    }

    /// The aggregate so far.
    #[must_use]
    pub fn peek(&self) -> &AggregateReference {
        &self.aggregate
    }

    /// Finishes the aggregate.
    #[must_use]
    pub fn build(self) -> AggregateReference {
        self.aggregate
    }
}
