//! Error types for the Stratus system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every error aborts the synthesis session it occurs in; the only soft
//! degrade in the system is the composer's fallback path, which never
//! produces an error at all.

use std::fmt;

use thiserror::Error;

use crate::path::FieldPath;
use crate::types::Type;

/// Result type alias for Stratus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Stratus operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto the error's context stack, creating the context
    /// if needed. Frames are pushed innermost first.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a validation error at `path` inside the named schema.
    #[must_use]
    pub fn validation(
        schema: impl Into<String>,
        path: FieldPath,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Validation {
            schema: schema.into(),
            path,
            reason: reason.into(),
        })
    }

    /// Creates an unknown kind error.
    #[must_use]
    pub fn unknown_kind(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownKind(name.into()))
    }

    /// Creates a duplicate declaration error.
    #[must_use]
    pub fn duplicate_declaration(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateDeclaration {
            kind: kind.into(),
            name: name.into(),
        })
    }

    /// Creates an ambiguous registration error.
    #[must_use]
    pub fn ambiguous_registration(
        name: impl Into<String>,
        existing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::AmbiguousRegistration {
            name: name.into(),
            existing: existing.into(),
            incoming: incoming.into(),
        })
    }

    /// Creates an ordering violation error.
    #[must_use]
    pub fn ordering_violation(member: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::new(ErrorKind::OrderingViolation {
            member: member.into(),
            dependency: dependency.into(),
        })
    }

    /// Creates a missing output error.
    #[must_use]
    pub fn missing_output(member: impl Into<String>, output: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingOutput {
            member: member.into(),
            output: output.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Returns the field path for validation errors.
    #[must_use]
    pub fn path(&self) -> Option<&FieldPath> {
        match &self.kind {
            ErrorKind::Validation { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Raw input failed a type, constraint, or cross-field rule.
    #[error("validation failed for {schema} at {path}: {reason}")]
    Validation {
        /// The schema being instantiated.
        schema: String,
        /// Location of the offending field.
        path: FieldPath,
        /// Human-readable reason.
        reason: String,
    },

    /// No registry entry for a resource kind or capability.
    #[error("unknown kind: {0}")]
    UnknownKind(String),

    /// The same `(kind, logical_name)` was declared twice in one context.
    #[error("duplicate declaration: {kind}.{name}")]
    DuplicateDeclaration {
        /// Resource kind.
        kind: String,
        /// Logical name.
        name: String,
    },

    /// A document output name was exported twice.
    #[error("duplicate output: {0}")]
    DuplicateOutput(String),

    /// Two different builders were registered under one name.
    #[error("ambiguous registration for {name}: already provided by {existing}, refused {incoming}")]
    AmbiguousRegistration {
        /// Registry key.
        name: String,
        /// Provider of the entry already registered.
        existing: String,
        /// Provider of the rejected entry.
        incoming: String,
    },

    /// Registration attempted after the registry was frozen.
    #[error("registry is frozen, cannot register {0}")]
    RegistryFrozen(String),

    /// A composition step referenced a member that is not yet composed.
    #[error("member {member} depends on {dependency}, which has not been composed yet")]
    OrderingViolation {
        /// Member being composed.
        member: String,
        /// The missing dependency.
        dependency: String,
    },

    /// A component or fallback did not provide an output its request
    /// promised.
    #[error("member {member} did not provide output {output}")]
    MissingOutput {
        /// Member that was composed.
        member: String,
        /// The promised output.
        output: String,
    },

    /// A reference minted by another synthesis context was used.
    #[error("reference {0} belongs to a different synthesis context")]
    ForeignReference(String),

    /// A reference names a declaration that does not exist.
    #[error("reference {0} does not name a declared resource output")]
    DanglingReference(String),

    /// Type mismatch while reading a value.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Serialization of a document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The synthesis session or file the error came from.
    pub source: Option<String>,
    /// Stack of composition frames, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
