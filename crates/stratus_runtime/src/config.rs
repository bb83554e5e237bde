//! Configuration for synthesis sessions.
//!
//! A config file is TOML:
//!
//! ```toml
//! environment = "staging"
//! format = "json"
//! output = "stack.json"
//! pretty = true
//!
//! [profile.production]
//! instance_type = "m5.xlarge"
//!
//! [profile.production.database]
//! backup_retention_days = 35
//! ```
//!
//! `[profile.<environment>]` tables layer over the built-in profile for
//! that environment.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use stratus_compose::{Environment, Profile};
use stratus_foundation::{AttrMap, Error, ErrorKind, Result};

use crate::input::from_toml_table;

/// Encoding of the synthesized document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON text.
    #[default]
    Json,
    /// `MessagePack` with named fields.
    #[serde(alias = "messagepack")]
    Msgpack,
}

impl OutputFormat {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Msgpack => "msgpack",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "msgpack" | "messagepack" => Ok(Self::Msgpack),
            other => Err(Error::new(ErrorKind::Config(format!(
                "unknown output format '{other}', expected json or msgpack"
            )))),
        }
    }
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SynthConfig {
    /// Environment used when the attributes do not name one.
    pub environment: Environment,

    /// Document encoding.
    pub format: OutputFormat,

    /// Where to write the document; stdout when unset.
    pub output: Option<PathBuf>,

    /// Indent JSON output.
    pub pretty: bool,

    /// Defaults layered over the built-in profile, per environment.
    pub profile_overrides: BTreeMap<Environment, AttrMap>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    environment: Option<String>,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    pretty: Option<bool>,
    #[serde(default)]
    profile: BTreeMap<String, toml::Table>,
}

impl SynthConfig {
    /// Creates a configuration with defaults: development, compact JSON to
    /// stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid TOML, has
    /// unknown keys, or names an unknown environment.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| Error::new(ErrorKind::Config(e.message().to_string())))?;

        let mut config = Self::new();
        if let Some(environment) = file.environment {
            config.environment = environment.parse()?;
        }
        if let Some(format) = file.format {
            config.format = format;
        }
        config.output = file.output;
        config.pretty = file.pretty.unwrap_or(false);
        for (environment, table) in &file.profile {
            let environment: Environment = environment.parse()?;
            config = config.with_profile_override(environment, from_toml_table(table));
        }
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::new(ErrorKind::Io(format!(
                "failed to read config '{}': {e}",
                path.as_ref().display()
            )))
        })?;
        Self::from_toml_str(&text)
            .map_err(|e| e.with_frame(format!("config {}", path.as_ref().display())))
    }

    /// Builder method to set the default environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Builder method to set the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder method to set the output path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Builder method to enable/disable indented JSON.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Builder method to layer defaults over one environment's profile.
    /// Repeated calls for one environment merge, later calls winning.
    #[must_use]
    pub fn with_profile_override(mut self, environment: Environment, defaults: AttrMap) -> Self {
        let merged = match self.profile_overrides.get(&environment) {
            Some(existing) => stratus_foundation::merge_maps(existing, &defaults),
            None => defaults,
        };
        self.profile_overrides.insert(environment, merged);
        self
    }

    /// The built-in profile with the overrides applied.
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.profile_overrides
            .iter()
            .fold(Profile::standard(), |profile, (environment, defaults)| {
                profile.with_defaults(*environment, defaults.clone())
            })
    }
}
