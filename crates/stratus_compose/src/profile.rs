//! Deployment environments and their default attribute profiles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stratus_foundation::{AttrMap, Error, ErrorKind, Result, attrs, merge_maps};

/// Deployment environment.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Smallest footprint, no redundancy.
    #[default]
    Development,
    /// Production-like, reduced scale.
    Staging,
    /// Redundant and protected.
    Production,
}

impl Environment {
    /// All environments.
    pub const ALL: [Environment; 3] = [Self::Development, Self::Staging, Self::Production];

    /// Lowercase name as used in attributes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::new(ErrorKind::Config(format!(
                "unknown environment '{other}', expected development, staging, or production"
            )))),
        }
    }
}

/// Default attributes per environment.
///
/// Profile defaults sit beneath caller attributes: the caller wins on every
/// key it supplies, and nested maps merge key by key. Schema defaults only
/// apply to fields neither side supplied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    defaults: BTreeMap<Environment, AttrMap>,
}

impl Profile {
    /// A profile with no defaults.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in defaults sized for each environment.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_defaults(
                Environment::Development,
                attrs! {
                    "instance_type" => "t3.micro",
                    "auto_scaling" => attrs! { "min" => 1, "max" => 2, "desired" => 1 },
                    "database" => attrs! {
                        "instance_class" => "db.t3.micro",
                        "multi_az" => false,
                        "backup_retention_days" => 1,
                        "deletion_protection" => false,
                    },
                    "monitoring" => attrs! { "enabled" => false, "retention_days" => 7 },
                },
            )
            .with_defaults(
                Environment::Staging,
                attrs! {
                    "instance_type" => "t3.small",
                    "auto_scaling" => attrs! { "min" => 1, "max" => 4, "desired" => 2 },
                    "database" => attrs! {
                        "instance_class" => "db.t3.small",
                        "multi_az" => false,
                        "backup_retention_days" => 7,
                        "deletion_protection" => false,
                    },
                    "monitoring" => attrs! { "enabled" => true, "retention_days" => 14 },
                },
            )
            .with_defaults(
                Environment::Production,
                attrs! {
                    "instance_type" => "m5.large",
                    "auto_scaling" => attrs! { "min" => 2, "max" => 10, "desired" => 3 },
                    "database" => attrs! {
                        "instance_class" => "db.r5.large",
                        "multi_az" => true,
                        "backup_retention_days" => 30,
                        "deletion_protection" => true,
                    },
                    "monitoring" => attrs! { "enabled" => true, "retention_days" => 90 },
                },
            )
    }

    /// Merges `defaults` into the defaults for `environment`; later calls win.
    #[must_use]
    pub fn with_defaults(mut self, environment: Environment, defaults: AttrMap) -> Self {
        let merged = match self.defaults.get(&environment) {
            Some(existing) => merge_maps(existing, &defaults),
            None => defaults,
        };
        self.defaults.insert(environment, merged);
        self
    }

    /// Defaults for an environment; empty if none were set.
    #[must_use]
    pub fn defaults(&self, environment: Environment) -> AttrMap {
        self.defaults.get(&environment).cloned().unwrap_or_default()
    }

    /// Layers caller attributes over the defaults for `environment`.
    #[must_use]
    pub fn apply(&self, environment: Environment, raw: &AttrMap) -> AttrMap {
        merge_maps(&self.defaults(environment), raw)
    }
}
