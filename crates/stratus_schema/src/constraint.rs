//! Field-level constraints.
//!
//! Constraints run after a field's type has been checked. References are
//! opaque until deployment, so every constraint except
//! [`Constraint::Predicate`] accepts a reference without inspecting it.

use std::fmt;
use std::net::Ipv4Addr;

use regex::Regex;
use stratus_foundation::{Error, ErrorKind, Result, Value};

/// Well-known string formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// IPv4 CIDR block, e.g. `10.0.0.0/16`.
    Cidr,
    /// DNS domain name, e.g. `example.com`.
    DomainName,
    /// Lowercase identifier of letters, digits and hyphens, starting with a
    /// letter, e.g. `orders-db`.
    Identifier,
}

impl Format {
    fn matches(self, s: &str) -> bool {
        match self {
            Self::Cidr => is_cidr(s),
            Self::DomainName => is_domain_name(s),
            Self::Identifier => is_identifier(s),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cidr => write!(f, "CIDR block"),
            Self::DomainName => write!(f, "domain name"),
            Self::Identifier => write!(f, "identifier"),
        }
    }
}

/// A constraint on a single field value.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// Numeric value within inclusive bounds.
    Range {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
    },
    /// Value must equal one of the listed values.
    OneOf(Vec<Value>),
    /// String must match the regular expression.
    Pattern(Regex),
    /// String must have the given format.
    Format(Format),
    /// String length, list length, or map size within inclusive bounds.
    Length {
        /// Minimum size.
        min: Option<usize>,
        /// Maximum size.
        max: Option<usize>,
    },
    /// Arbitrary check on the value.
    Predicate {
        /// What the predicate requires, used as the failure reason.
        description: &'static str,
        /// Returns true if the value is acceptable.
        check: fn(&Value) -> bool,
    },
}

impl Constraint {
    /// Numeric value within `[min, max]`.
    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        Self::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Numeric value of at least `min`.
    #[must_use]
    pub fn at_least(min: f64) -> Self {
        Self::Range {
            min: Some(min),
            max: None,
        }
    }

    /// Value must be one of `values`.
    #[must_use]
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// String must match `pattern`, anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Self::Pattern)
            .map_err(|e| {
                Error::new(ErrorKind::Internal(format!(
                    "invalid pattern constraint '{pattern}': {e}"
                )))
            })
    }

    /// Size within `[min, max]`.
    #[must_use]
    pub fn length(min: usize, max: usize) -> Self {
        Self::Length {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Size of at least one.
    #[must_use]
    pub fn non_empty() -> Self {
        Self::Length {
            min: Some(1),
            max: None,
        }
    }

    /// Arbitrary predicate.
    #[must_use]
    pub fn predicate(description: &'static str, check: fn(&Value) -> bool) -> Self {
        Self::Predicate { description, check }
    }

    /// Checks `value`, returning the failure reason.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value violates the
    /// constraint.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        if let Self::Predicate { description, check } = self {
            return if check(value) {
                Ok(())
            } else {
                Err(format!("must satisfy: {description}"))
            };
        }
        if matches!(value, Value::Ref(_)) {
            return Ok(());
        }

        match self {
            Self::Range { min, max } => {
                let n = value.as_number().ok_or_else(|| {
                    format!("range constraint needs a number, got {}", value.value_type())
                })?;
                if let Some(min) = min.filter(|min| n < *min) {
                    return Err(format!("{n} is below the minimum {min}"));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    return Err(format!("{n} is above the maximum {max}"));
                }
                Ok(())
            }
            Self::OneOf(allowed) => {
                if allowed.contains(value) {
                    Ok(())
                } else {
                    let listed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                    Err(format!("{value} is not one of [{}]", listed.join(", ")))
                }
            }
            Self::Pattern(re) => {
                let s = expect_str(value, "pattern")?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("{s:?} does not match pattern {}", re.as_str()))
                }
            }
            Self::Format(format) => {
                let s = expect_str(value, "format")?;
                if format.matches(s) {
                    Ok(())
                } else {
                    Err(format!("{s:?} is not a valid {format}"))
                }
            }
            Self::Length { min, max } => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::List(items) => items.len(),
                    Value::Map(map) => map.len(),
                    other => {
                        return Err(format!(
                            "length constraint needs a string, list, or map, got {}",
                            other.value_type()
                        ));
                    }
                };
                if let Some(min) = min.filter(|min| len < *min) {
                    return Err(format!("length {len} is below the minimum {min}"));
                }
                if let Some(max) = max.filter(|max| len > *max) {
                    return Err(format!("length {len} is above the maximum {max}"));
                }
                Ok(())
            }
            Self::Predicate { .. } => Ok(()),
        }
    }
}

fn expect_str<'a>(value: &'a Value, constraint: &str) -> std::result::Result<&'a str, String> {
    value.as_str().ok_or_else(|| {
        format!(
            "{constraint} constraint needs a string, got {}",
            value.value_type()
        )
    })
}

fn is_cidr(s: &str) -> bool {
    let Some((addr, prefix)) = s.split_once('/') else {
        return false;
    };
    addr.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
}

fn is_domain_name(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 || !s.contains('.') {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
