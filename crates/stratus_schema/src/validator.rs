//! Schema-level validators that inspect several fields together.

use std::sync::Arc;

use stratus_foundation::{AttrMap, FieldPath, Value};

/// A cross-field rule violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Field the violation is reported against.
    pub path: FieldPath,
    /// Human-readable reason.
    pub reason: String,
}

impl Violation {
    /// A violation reported against a top-level field.
    #[must_use]
    pub fn field(name: impl Into<Arc<str>>, reason: impl Into<String>) -> Self {
        Self {
            path: FieldPath::field(name),
            reason: reason.into(),
        }
    }

    /// A violation reported against the attribute set as a whole.
    #[must_use]
    pub fn root(reason: impl Into<String>) -> Self {
        Self {
            path: FieldPath::root(),
            reason: reason.into(),
        }
    }
}

/// A cross-field rule.
///
/// A field counts as *set* when it is present and not nil, after defaults
/// have been applied.
#[derive(Clone, Debug)]
pub enum Validator {
    /// Exactly one of the fields must be set.
    ExactlyOneOf(Vec<Arc<str>>),
    /// At least one of the fields must be set.
    AtLeastOneOf(Vec<Arc<str>>),
    /// At most one of the fields may be set.
    MutuallyExclusive(Vec<Arc<str>>),
    /// If `field` is set, `requires` must be set too.
    Requires {
        /// The field that carries the requirement.
        field: Arc<str>,
        /// The field it requires.
        requires: Arc<str>,
    },
    /// Arbitrary rule over the whole attribute set.
    Custom {
        /// Rule name, for diagnostics.
        name: &'static str,
        /// Returns the violation, if any.
        check: fn(&AttrMap) -> Option<Violation>,
    },
}

impl Validator {
    /// Exactly one of `fields` must be set.
    #[must_use]
    pub fn exactly_one_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::ExactlyOneOf(fields.into_iter().map(Into::into).collect())
    }

    /// At least one of `fields` must be set.
    #[must_use]
    pub fn at_least_one_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::AtLeastOneOf(fields.into_iter().map(Into::into).collect())
    }

    /// At most one of `fields` may be set.
    #[must_use]
    pub fn mutually_exclusive<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::MutuallyExclusive(fields.into_iter().map(Into::into).collect())
    }

    /// `field` requires `requires`.
    #[must_use]
    pub fn requires(field: impl Into<Arc<str>>, requires: impl Into<Arc<str>>) -> Self {
        Self::Requires {
            field: field.into(),
            requires: requires.into(),
        }
    }

    /// Custom rule.
    #[must_use]
    pub fn custom(name: &'static str, check: fn(&AttrMap) -> Option<Violation>) -> Self {
        Self::Custom { name, check }
    }

    /// Runs the rule against fully type-checked attributes.
    #[must_use]
    pub fn check(&self, attrs: &AttrMap) -> Option<Violation> {
        match self {
            Self::ExactlyOneOf(fields) => {
                let set = set_fields(attrs, fields);
                (set.len() != 1).then(|| {
                    Violation::root(format!(
                        "exactly one of [{}] must be set, found {}",
                        fields.join(", "),
                        describe(&set)
                    ))
                })
            }
            Self::AtLeastOneOf(fields) => set_fields(attrs, fields).is_empty().then(|| {
                Violation::root(format!("at least one of [{}] must be set", fields.join(", ")))
            }),
            Self::MutuallyExclusive(fields) => {
                let set = set_fields(attrs, fields);
                (set.len() > 1).then(|| {
                    Violation::field(
                        Arc::clone(set[1]),
                        format!("cannot be combined with {}", set[0]),
                    )
                })
            }
            Self::Requires { field, requires } => (is_set(attrs, field)
                && !is_set(attrs, requires))
            .then(|| Violation::field(Arc::clone(field), format!("requires {requires} to be set"))),
            Self::Custom { check, .. } => check(attrs),
        }
    }
}

fn is_set(attrs: &AttrMap, field: &str) -> bool {
    attrs.get(field).is_some_and(|v| !v.is_nil())
}

fn set_fields<'a>(attrs: &AttrMap, fields: &'a [Arc<str>]) -> Vec<&'a Arc<str>> {
    fields.iter().filter(|f| is_set(attrs, f)).collect()
}

fn describe(set: &[&Arc<str>]) -> String {
    if set.is_empty() {
        "none".to_string()
    } else {
        set.iter().map(|f| f.as_ref()).collect::<Vec<_>>().join(", ")
    }
}

/// Returns true if the value at `field` is truthy: present, not nil, and not
/// `false`. Convenience for custom rules.
#[must_use]
pub fn is_enabled(attrs: &AttrMap, field: &str) -> bool {
    !matches!(attrs.get(field), None | Some(Value::Nil | Value::Bool(false)))
}
