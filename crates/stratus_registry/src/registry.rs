//! Guarded name-to-builder registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use stratus_foundation::{Error, ErrorKind, Result};
use tracing::{debug, info};

/// An entry that can be stored in a [`Registry`].
///
/// The provider string identifies which module supplied the builder,
/// usually `module_path!()`. Registering the same name twice is a no-op
/// only when both the provider and the builder match; anything else is
/// ambiguous.
pub trait RegistryEntry {
    /// Identity of the module that supplied this entry.
    fn provider(&self) -> &str;

    /// Returns true if `other` builds the same thing as `self`.
    ///
    /// Builders are plain `fn` pointers, so implementations compare them
    /// by address together with whatever declarative parts the entry
    /// carries.
    fn same_builder(&self, other: &Self) -> bool;
}

/// Catalog of builders keyed by kind or capability name.
pub struct Registry<T> {
    /// What this registry holds, for diagnostics (e.g. "resource kind").
    label: &'static str,
    /// Entries registered during the loading phase.
    pending: Mutex<BTreeMap<Arc<str>, Arc<T>>>,
    /// Read-only snapshot installed by [`Registry::freeze`].
    frozen: OnceLock<BTreeMap<Arc<str>, Arc<T>>>,
}

impl<T: RegistryEntry> Registry<T> {
    /// Creates an empty registry in the loading phase.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            pending: Mutex::new(BTreeMap::new()),
            frozen: OnceLock::new(),
        }
    }

    /// What this registry holds.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Registers `entry` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::AmbiguousRegistration`] if `name` is already
    /// registered with a different provider or a different builder, and [`ErrorKind::RegistryFrozen`] once
    /// the registry has been frozen.
    pub fn register(&self, name: impl Into<Arc<str>>, entry: T) -> Result<()> {
        let name = name.into();
        let mut pending = self.pending.lock();

        // Checked under the lock: freeze() installs the snapshot while
        // holding it, so no registration can slip in afterwards.
        if self.frozen.get().is_some() {
            return Err(Error::new(ErrorKind::RegistryFrozen(format!(
                "{} {name}",
                self.label
            ))));
        }

        if let Some(existing) = pending.get(&name) {
            if existing.provider() == entry.provider() && existing.same_builder(&entry) {
                debug!(registry = self.label, %name, "duplicate registration ignored");
                return Ok(());
            }
            return Err(Error::ambiguous_registration(
                format!("{} {name}", self.label),
                existing.provider(),
                entry.provider(),
            ));
        }

        debug!(registry = self.label, %name, provider = entry.provider(), "registered");
        pending.insert(name, Arc::new(entry));
        Ok(())
    }

    /// Ends the loading phase. Later registrations fail and lookups no
    /// longer take the lock. Freezing twice is a no-op.
    pub fn freeze(&self) {
        let mut pending = self.pending.lock();
        if self.frozen.get().is_some() {
            return;
        }
        let entries = std::mem::take(&mut *pending);
        info!(registry = self.label, entries = entries.len(), "registry frozen");
        // Cannot fail: the snapshot is only ever set here, under the lock.
        let _ = self.frozen.set(entries);
    }

    /// Returns true once [`Registry::freeze`] has run.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.get().is_some()
    }

    /// Looks up an entry. Absence is an ordinary outcome.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<T>> {
        if let Some(entries) = self.frozen.get() {
            return entries.get(name).cloned();
        }
        self.pending.lock().get(name).cloned()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        if let Some(entries) = self.frozen.get() {
            return entries.keys().map(ToString::to_string).collect();
        }
        self.pending.lock().keys().map(ToString::to_string).collect()
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        if let Some(entries) = self.frozen.get() {
            return entries.len();
        }
        self.pending.lock().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("label", &self.label)
            .field("frozen", &self.frozen.get().is_some())
            .finish_non_exhaustive()
    }
}
