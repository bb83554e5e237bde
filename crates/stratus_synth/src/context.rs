//! Session-scoped synthesis context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use stratus_foundation::{AttrMap, ContextId, Error, ErrorKind, Reference, Result, Value};
use stratus_registry::Registry;
use stratus_schema::ValidatedAttributes;
use tracing::debug;

use crate::document::{Document, ResourceGroup};
use crate::kind::ResourceKind;

/// One declared resource.
#[derive(Clone, Debug)]
pub struct ResourceDeclaration {
    kind: Arc<str>,
    name: Arc<str>,
    attributes: ValidatedAttributes,
}

impl ResourceDeclaration {
    /// The resource kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The logical name, unique per kind within a context.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        &self.name
    }

    /// The validated attributes.
    #[must_use]
    pub fn attributes(&self) -> &ValidatedAttributes {
        &self.attributes
    }
}

/// References and computed properties returned by a declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputBundle {
    kind: Arc<str>,
    name: Arc<str>,
    outputs: Vec<(Arc<str>, Reference)>,
    computed: AttrMap,
}

impl OutputBundle {
    /// The declared kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The declared logical name.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        &self.name
    }

    /// Reference to a documented output.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Reference> {
        self.outputs
            .iter()
            .find(|(output, _)| &**output == name)
            .map(|(_, r)| r)
    }

    /// Reference to a documented output, as an error if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DanglingReference`] if the kind does not
    /// document `name`.
    pub fn require(&self, name: &str) -> Result<Reference> {
        self.output(name).cloned().ok_or_else(|| {
            Error::new(ErrorKind::DanglingReference(format!(
                "${{{}.{}.{name}}}",
                self.kind, self.name
            )))
        })
    }

    /// Reference to the `id` output every kind exposes.
    ///
    /// # Errors
    ///
    /// Never fails for bundles returned by [`SynthesisContext::declare`].
    pub fn id(&self) -> Result<Reference> {
        self.require("id")
    }

    /// Documented outputs in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &Reference)> {
        self.outputs.iter().map(|(name, r)| (&**name, r))
    }

    /// A computed property.
    #[must_use]
    pub fn computed(&self, name: &str) -> Option<&Value> {
        self.computed.get(name)
    }

    /// All computed properties.
    #[must_use]
    pub fn computed_values(&self) -> &AttrMap {
        &self.computed
    }
}

/// Mutable, session-scoped builder that accumulates declarations.
///
/// A context owns its declarations and the references it mints. It is used
/// from one thread for the duration of a synthesis; independent contexts
/// share nothing but the frozen kind registry.
pub struct SynthesisContext {
    id: ContextId,
    kinds: Arc<Registry<ResourceKind>>,
    declarations: Vec<ResourceDeclaration>,
    index: HashMap<(Arc<str>, Arc<str>), usize>,
    outputs: Vec<(Arc<str>, Value)>,
}

impl SynthesisContext {
    /// Creates an empty context resolving kinds through `kinds`.
    #[must_use]
    pub fn new(kinds: Arc<Registry<ResourceKind>>) -> Self {
        let id = ContextId::next();
        debug!(context = %id, "synthesis context created");
        Self {
            id,
            kinds,
            declarations: Vec::new(),
            index: HashMap::new(),
            outputs: Vec::new(),
        }
    }

    /// Identity stamped on every reference this context mints.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The kind registry this context resolves against.
    #[must_use]
    pub fn kinds(&self) -> &Arc<Registry<ResourceKind>> {
        &self.kinds
    }

    /// Declares a resource.
    ///
    /// Looks up the kind, instantiates its schema against `raw`, checks that
    /// every embedded reference was minted here for an existing declaration,
    /// enforces `(kind, name)` uniqueness, appends the declaration, and
    /// returns one reference per documented output plus the kind's computed
    /// properties.
    ///
    /// # Errors
    ///
    /// Unknown kind, validation failure, foreign or dangling reference, and
    /// duplicate declaration are all fatal to the session.
    pub fn declare(&mut self, kind: &str, name: &str, raw: &AttrMap) -> Result<OutputBundle> {
        let resource = self
            .kinds
            .lookup(kind)
            .ok_or_else(|| Error::unknown_kind(kind))?;

        let attributes = resource
            .schema()
            .instantiate(raw)
            .map_err(|e| e.with_frame(format!("resource {kind}.{name}")))?;

        for reference in attributes.references() {
            self.check_reference(&reference)
                .map_err(|e| e.with_frame(format!("resource {kind}.{name}")))?;
        }

        let key: (Arc<str>, Arc<str>) = (Arc::from(kind), Arc::from(name));
        if self.index.contains_key(&key) {
            return Err(Error::duplicate_declaration(kind, name));
        }

        let computed = resource.computed(&attributes);
        let outputs = resource
            .outputs()
            .iter()
            .map(|output| {
                let r = Reference::mint(
                    self.id,
                    Arc::clone(&key.0),
                    Arc::clone(&key.1),
                    Arc::clone(output),
                );
                (Arc::clone(output), r)
            })
            .collect();

        debug!(
            context = %self.id,
            kind,
            name,
            fields = attributes.len(),
            "resource declared"
        );

        self.index.insert(key.clone(), self.declarations.len());
        self.declarations.push(ResourceDeclaration {
            kind: Arc::clone(&key.0),
            name: Arc::clone(&key.1),
            attributes,
        });

        Ok(OutputBundle {
            kind: key.0,
            name: key.1,
            outputs,
            computed,
        })
    }

    /// Mints a reference to an output of an existing declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DanglingReference`] if the declaration does not
    /// exist or its kind does not document `output`.
    pub fn reference(&self, kind: &str, name: &str, output: &str) -> Result<Reference> {
        let reference = Reference::mint(self.id, kind, name, output);
        self.check_reference(&reference)?;
        Ok(reference)
    }

    /// Returns true if `(kind, name)` has been declared.
    #[must_use]
    pub fn is_declared(&self, kind: &str, name: &str) -> bool {
        self.declaration(kind, name).is_some()
    }

    /// Looks up a declaration.
    #[must_use]
    pub fn declaration(&self, kind: &str, name: &str) -> Option<&ResourceDeclaration> {
        let key: (Arc<str>, Arc<str>) = (Arc::from(kind), Arc::from(name));
        self.index.get(&key).map(|&i| &self.declarations[i])
    }

    /// Declarations in the order they were made.
    #[must_use]
    pub fn declarations(&self) -> &[ResourceDeclaration] {
        &self.declarations
    }

    /// Records a top-level document output.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateOutput`] if `name` was already
    /// exported, or a reference error if `value` embeds a reference this
    /// context cannot vouch for.
    pub fn export(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if self.outputs.iter().any(|(existing, _)| &**existing == name) {
            return Err(Error::new(ErrorKind::DuplicateOutput(name.to_string())));
        }

        let mut checked = Ok(());
        value.for_each_reference(&mut |r| {
            if checked.is_ok() {
                checked = self.check_reference(r);
            }
        });
        checked.map_err(|e| e.with_frame(format!("output {name}")))?;

        debug!(context = %self.id, name, "output exported");
        self.outputs.push((Arc::from(name), value));
        Ok(())
    }

    /// Produces the synthesis document.
    ///
    /// Declarations are grouped by kind; groups appear in the order their
    /// kind was first declared and blocks within a group in declaration
    /// order. Emitting is read-only and deterministic.
    #[must_use]
    pub fn emit(&self) -> Document {
        let mut groups: Vec<ResourceGroup> = Vec::new();
        for decl in &self.declarations {
            let block = (Arc::clone(&decl.name), decl.attributes.values().clone());
            match groups.iter_mut().find(|g| g.kind == decl.kind) {
                Some(group) => group.blocks.push(block),
                None => groups.push(ResourceGroup {
                    kind: Arc::clone(&decl.kind),
                    blocks: vec![block],
                }),
            }
        }
        Document::new(groups, self.outputs.clone())
    }

    fn check_reference(&self, reference: &Reference) -> Result<()> {
        if !reference.is_from(self.id) {
            return Err(Error::new(ErrorKind::ForeignReference(reference.render())));
        }
        let documented = self
            .declaration(reference.kind(), reference.logical_name())
            .and_then(|decl| self.kinds.lookup(&decl.kind))
            .is_some_and(|kind| kind.has_output(reference.output_path()));
        if documented {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::DanglingReference(reference.render())))
        }
    }
}

impl fmt::Debug for SynthesisContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisContext")
            .field("id", &self.id)
            .field("declarations", &self.declarations.len())
            .field("outputs", &self.outputs.len())
            .finish_non_exhaustive()
    }
}
