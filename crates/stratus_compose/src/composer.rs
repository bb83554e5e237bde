//! The composer: turns a blueprint and caller attributes into an aggregate.

use std::fmt;
use std::sync::Arc;

use stratus_foundation::{AttrMap, Error, ErrorKind, Result, Value, merge_maps};
use stratus_registry::Registry;
use stratus_schema::UnknownFields;
use stratus_synth::SynthesisContext;
use tracing::{debug, info};

use crate::aggregate::{AggregateBuilder, AggregateReference, Member};
use crate::blueprint::{Blueprint, ComponentRequest};
use crate::component::{Component, ComponentInput, unavailable};
use crate::profile::{Environment, Profile};

/// Phase of a composition. Phases only move forward; a failure in any
/// phase aborts the composition where it stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompositionState {
    /// Layering caller attributes over profile defaults and validating.
    MergingAttrs,
    /// Composing member slots in declared order.
    ComposingMembers,
    /// Deriving curated outputs from present members.
    DerivingOutputs,
    /// Attaching computed properties.
    DerivingComputed,
    /// The aggregate is complete.
    Done,
}

impl fmt::Display for CompositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MergingAttrs => "MERGING_ATTRS",
            Self::ComposingMembers => "COMPOSING_MEMBERS",
            Self::DerivingOutputs => "DERIVING_OUTPUTS",
            Self::DerivingComputed => "DERIVING_COMPUTED",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

struct Progress<'b> {
    kind: &'b str,
    name: &'b str,
    state: CompositionState,
}

impl Progress<'_> {
    fn advance(&mut self, next: CompositionState) -> Result<()> {
        if next <= self.state {
            return Err(Error::new(ErrorKind::Internal(format!(
                "composition {} {} cannot move from {} to {next}",
                self.kind, self.name, self.state
            ))));
        }
        debug!(kind = self.kind, name = self.name, from = %self.state, to = %next, "composition state");
        self.state = next;
        Ok(())
    }
}

/// Composes blueprints inside one synthesis context.
pub struct Composer<'a> {
    context: &'a mut SynthesisContext,
    components: Arc<Registry<Component>>,
    profile: Profile,
    environment: Environment,
    last_state: Option<CompositionState>,
}

impl<'a> Composer<'a> {
    /// Creates a composer with an empty profile, targeting development.
    #[must_use]
    pub fn new(context: &'a mut SynthesisContext, components: Arc<Registry<Component>>) -> Self {
        Self {
            context,
            components,
            profile: Profile::empty(),
            environment: Environment::default(),
            last_state: None,
        }
    }

    /// Sets the default-attribute profile.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the environment used when the caller does not name one.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// The synthesis context declarations go into.
    pub fn context(&mut self) -> &mut SynthesisContext {
        self.context
    }

    /// The phase the most recent composition reached, whether it
    /// succeeded or failed.
    #[must_use]
    pub fn last_state(&self) -> Option<CompositionState> {
        self.last_state
    }

    /// Composes `blueprint` under `name`.
    ///
    /// 1. Layers `raw` over the profile defaults for the environment and
    ///    instantiates the blueprint schema.
    /// 2. Composes each member in declared order: through its registered
    ///    component, else its fallback, else omits it if optional.
    /// 3. Derives outputs whose required members are present.
    /// 4. Attaches computed properties.
    ///
    /// # Errors
    ///
    /// Any failure aborts the composition. Errors carry a frame naming the
    /// composition and, where applicable, the member.
    pub fn compose(
        &mut self,
        blueprint: &Blueprint,
        name: &str,
        raw: &AttrMap,
    ) -> Result<AggregateReference> {
        let mut progress = Progress {
            kind: blueprint.kind(),
            name,
            state: CompositionState::MergingAttrs,
        };
        debug!(kind = blueprint.kind(), name, "composition started");
        let result = self.run(blueprint, name, raw, &mut progress);
        self.last_state = Some(progress.state);
        result.map_err(|e| e.with_frame(format!("composition {} {name}", blueprint.kind())))
    }

    fn run(
        &mut self,
        blueprint: &Blueprint,
        name: &str,
        raw: &AttrMap,
        progress: &mut Progress<'_>,
    ) -> Result<AggregateReference> {
        let environment = raw
            .get("environment")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Environment>().ok())
            .unwrap_or(self.environment);
        let merged = self.merge_attributes(blueprint, environment, raw);
        let attributes = blueprint.schema().instantiate(&merged)?;

        progress.advance(CompositionState::ComposingMembers)?;
        let mut builder = AggregateBuilder::new(blueprint.kind(), name, attributes.clone());
        let mut skipped: Vec<&str> = Vec::new();

        for request in blueprint.requests() {
            if !request.is_wanted(&attributes) {
                debug!(member = request.member(), "member not requested");
                skipped.push(request.member());
                continue;
            }

            let mut input = ComponentInput::new(
                name,
                request.member(),
                environment,
                request.inputs(&attributes),
            );
            for dependency in request.dependencies() {
                match builder.peek().member(dependency) {
                    Some(member) => {
                        input = input.with_dependency(Arc::clone(dependency), member.clone());
                    }
                    None if skipped.contains(&&**dependency) => {}
                    None => {
                        return Err(Error::ordering_violation(request.member(), &**dependency));
                    }
                }
            }

            match self.compose_member(request, &input) {
                Ok(Some(aggregate)) => {
                    builder.member(request.member(), Member::Component(aggregate))?;
                }
                Ok(None) => skipped.push(request.member()),
                Err(e) => return Err(e.with_frame(format!("member {}", request.member()))),
            }
        }

        progress.advance(CompositionState::DerivingOutputs)?;
        for rule in blueprint.output_rules() {
            if !rule.applies_to(builder.peek()) {
                debug!(output = rule.name(), "output omitted, prerequisite member absent");
                continue;
            }
            let value = rule
                .derive(builder.peek())
                .map_err(|e| e.with_frame(format!("output {}", rule.name())))?;
            builder.output(rule.name(), value)?;
        }

        progress.advance(CompositionState::DerivingComputed)?;
        for (property, derive) in blueprint.computed() {
            builder.computed(property, *derive);
        }

        progress.advance(CompositionState::Done)?;
        let aggregate = builder.build();
        debug!(
            kind = aggregate.kind(),
            name,
            members = aggregate.members().count(),
            outputs = aggregate.outputs().len(),
            "composition done"
        );
        Ok(aggregate)
    }

    fn merge_attributes(
        &self,
        blueprint: &Blueprint,
        environment: Environment,
        raw: &AttrMap,
    ) -> AttrMap {
        let schema = blueprint.schema();
        let defaults: AttrMap = self
            .profile
            .defaults(environment)
            .iter()
            .filter(|(key, _)| {
                schema.unknown == UnknownFields::Passthrough || schema.field(key).is_some()
            })
            .map(|(key, value)| (Arc::clone(key), value.clone()))
            .collect();

        let merged = merge_maps(&defaults, raw);
        if schema.field("environment").is_some() && !merged.contains_key("environment") {
            merged.insert(Arc::from("environment"), Value::from(environment.as_str()))
        } else {
            merged
        }
    }

    fn compose_member(
        &mut self,
        request: &ComponentRequest,
        input: &ComponentInput,
    ) -> Result<Option<AggregateReference>> {
        let aggregate = if let Some(component) = self.components.lookup(request.capability()) {
            component.build(self.context, input)?
        } else if let Some(fallback) = request.fallback_fn() {
            info!(
                member = request.member(),
                capability = request.capability(),
                "component not registered, using fallback"
            );
            fallback(self.context, input)?.mark_fallback()
        } else if request.is_optional() {
            info!(
                member = request.member(),
                capability = request.capability(),
                "component not registered, member omitted"
            );
            return Ok(None);
        } else {
            return Err(unavailable(request.capability()));
        };

        for output in request.contract() {
            if aggregate.output(output).is_none() {
                return Err(Error::missing_output(request.member(), &**output));
            }
        }
        Ok(Some(aggregate))
    }
}

impl fmt::Debug for Composer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("context", &self.context)
            .field("environment", &self.environment)
            .field("last_state", &self.last_state)
            .finish_non_exhaustive()
    }
}
