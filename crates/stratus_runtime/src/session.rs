//! Synthesis sessions.
//!
//! A session loads the resource kind, component, and blueprint registries
//! once, freezes them, and then runs any number of syntheses against them.
//! Each synthesis gets a fresh [`SynthesisContext`], so references never
//! leak from one document into another.

use std::sync::Arc;

use stratus_compose::{AggregateReference, Blueprint, Component, Composer};
use stratus_foundation::{AttrMap, Error, Result};
use stratus_registry::Registry;
use stratus_schema::ValidatedAttributes;
use stratus_synth::{Document, ResourceKind, SynthesisContext};
use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::serialize;

/// The result of one synthesis.
#[derive(Debug)]
pub struct Synthesis {
    document: Document,
    aggregate: AggregateReference,
}

impl Synthesis {
    /// The synthesized document, with the aggregate's outputs exported.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The composed architecture.
    #[must_use]
    pub fn aggregate(&self) -> &AggregateReference {
        &self.aggregate
    }

    /// Splits into document and aggregate.
    #[must_use]
    pub fn into_parts(self) -> (Document, AggregateReference) {
        (self.document, self.aggregate)
    }
}

/// Frozen registries plus configuration.
pub struct Session {
    kinds: Arc<Registry<ResourceKind>>,
    components: Arc<Registry<Component>>,
    blueprints: Arc<Registry<Blueprint>>,
    config: SynthConfig,
}

impl Session {
    /// Creates a session over the built-in catalog and everything
    /// submitted through `inventory`.
    ///
    /// # Errors
    ///
    /// Fails if two providers register the same name.
    pub fn new(config: SynthConfig) -> Result<Self> {
        let kinds = Registry::new("resource kind");
        stratus_catalog::register_kinds(&kinds)?;
        stratus_synth::register_inventory(&kinds)?;

        let components = Registry::new("component");
        stratus_catalog::register_components(&components)?;
        stratus_compose::register_components(&components)?;

        let blueprints = Registry::new("blueprint");
        stratus_catalog::register_blueprints(&blueprints)?;
        stratus_compose::register_blueprints(&blueprints)?;

        Ok(Self::with_registries(kinds, components, blueprints, config))
    }

    /// Creates a session over caller-built registries, freezing them.
    #[must_use]
    pub fn with_registries(
        kinds: Registry<ResourceKind>,
        components: Registry<Component>,
        blueprints: Registry<Blueprint>,
        config: SynthConfig,
    ) -> Self {
        kinds.freeze();
        components.freeze();
        blueprints.freeze();
        info!(
            kinds = kinds.len(),
            components = components.len(),
            blueprints = blueprints.len(),
            "session ready"
        );
        Self {
            kinds: Arc::new(kinds),
            components: Arc::new(components),
            blueprints: Arc::new(blueprints),
            config,
        }
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Registered resource kinds.
    #[must_use]
    pub fn kinds(&self) -> &Registry<ResourceKind> {
        &self.kinds
    }

    /// Registered components.
    #[must_use]
    pub fn components(&self) -> &Registry<Component> {
        &self.components
    }

    /// Registered architectures.
    #[must_use]
    pub fn blueprints(&self) -> &Registry<Blueprint> {
        &self.blueprints
    }

    /// A fresh synthesis context over the session's kinds.
    #[must_use]
    pub fn context(&self) -> SynthesisContext {
        SynthesisContext::new(Arc::clone(&self.kinds))
    }

    /// Composes `architecture` under `name` in a fresh context and emits
    /// the document, exporting every aggregate output.
    ///
    /// # Errors
    ///
    /// Fails if the architecture is unknown or composition fails.
    pub fn synthesize(&self, architecture: &str, name: &str, raw: &AttrMap) -> Result<Synthesis> {
        let blueprint = self
            .blueprints
            .lookup(architecture)
            .ok_or_else(|| Error::unknown_kind(format!("architecture {architecture}")))?;

        let mut context = self.context();
        let aggregate = {
            let mut composer = Composer::new(&mut context, Arc::clone(&self.components))
                .with_profile(self.config.profile())
                .with_environment(self.config.environment);
            composer.compose(&blueprint, name, raw)?
        };

        for (output, value) in aggregate.outputs().iter() {
            context.export(output, value.clone())?;
        }
        let document = context.emit();
        debug!(
            architecture,
            name,
            resources = document.resource_count(),
            "synthesis complete"
        );
        Ok(Synthesis {
            document,
            aggregate,
        })
    }

    /// Synthesizes and encodes with the session's output settings.
    ///
    /// # Errors
    ///
    /// Fails if synthesis or serialization fails.
    pub fn render(&self, architecture: &str, name: &str, raw: &AttrMap) -> Result<Vec<u8>> {
        let synthesis = self.synthesize(architecture, name, raw)?;
        serialize::encode(synthesis.document(), self.config.format, self.config.pretty)
    }

    /// Validates attributes against a resource kind or architecture schema
    /// without declaring anything.
    ///
    /// # Errors
    ///
    /// Fails if `kind` is neither a registered kind nor architecture, or
    /// if the attributes do not validate.
    pub fn validate(&self, kind: &str, raw: &AttrMap) -> Result<ValidatedAttributes> {
        if let Some(resource) = self.kinds.lookup(kind) {
            return resource.schema().instantiate(raw);
        }
        if let Some(blueprint) = self.blueprints.lookup(kind) {
            return blueprint.schema().instantiate(raw);
        }
        Err(Error::unknown_kind(kind))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("kinds", &self.kinds.len())
            .field("components", &self.components.len())
            .field("blueprints", &self.blueprints.len())
            .field("config", &self.config)
            .finish()
    }
}
