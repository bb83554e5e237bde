//! Raw attributes from files and `key.path=value` assignments.
//!
//! JSON and TOML documents convert into [`Value`]s one to one, except that
//! JSON `null` becomes [`Value::Nil`] and TOML datetimes become strings.
//! Assignment values are read as JSON when they parse as JSON, and as
//! plain strings otherwise, so `count=3` sets an integer and
//! `name=shop` sets a string.

use std::path::Path;
use std::sync::Arc;

use stratus_foundation::{AttrMap, Error, ErrorKind, LtVec, Result, Value};

/// Converts a JSON value.
#[must_use]
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Nil),
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(from_json).collect::<LtVec<Value>>())
        }
        serde_json::Value::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(key, value)| (Arc::from(key.as_str()), from_json(value)))
                .collect(),
        ),
    }
}

/// Converts a TOML value.
#[must_use]
pub fn from_toml(toml: &toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::from(s.as_str()),
        toml::Value::Integer(n) => Value::Int(*n),
        toml::Value::Float(x) => Value::Float(*x),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::from(dt.to_string()),
        toml::Value::Array(items) => {
            Value::List(items.iter().map(from_toml).collect::<LtVec<Value>>())
        }
        toml::Value::Table(table) => Value::Map(from_toml_table(table)),
    }
}

/// Converts a TOML table into an attribute map.
#[must_use]
pub fn from_toml_table(table: &toml::Table) -> AttrMap {
    table
        .iter()
        .map(|(key, value)| (Arc::from(key.as_str()), from_toml(value)))
        .collect()
}

fn config_error(message: String) -> Error {
    Error::new(ErrorKind::Config(message))
}

/// Parses JSON text whose top level is an object.
///
/// # Errors
///
/// Returns a configuration error if the text is not JSON or not an object.
pub fn parse_json(text: &str) -> Result<AttrMap> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| config_error(format!("invalid JSON: {e}")))?;
    match from_json(&json) {
        Value::Map(map) => Ok(map),
        other => Err(config_error(format!(
            "attributes must be a JSON object, got {}",
            other.value_type()
        ))),
    }
}

/// Parses TOML text.
///
/// # Errors
///
/// Returns a configuration error if the text is not TOML.
pub fn parse_toml(text: &str) -> Result<AttrMap> {
    let table: toml::Table =
        toml::from_str(text).map_err(|e| config_error(format!("invalid TOML: {}", e.message())))?;
    Ok(from_toml_table(&table))
}

/// Loads attributes from a `.json` or `.toml` file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, and a configuration
/// error for other extensions or unparsable content.
pub fn load_attributes<P: AsRef<Path>>(path: P) -> Result<AttrMap> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read attributes '{}': {e}",
            path.display()
        )))
    })?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&text),
        Some("toml") => parse_toml(&text),
        _ => Err(config_error(format!(
            "cannot read attributes from '{}', expected a .json or .toml file",
            path.display()
        ))),
    };
    parsed.map_err(|e| e.with_frame(format!("attributes {}", path.display())))
}

/// Parses the value side of an assignment.
#[must_use]
pub fn parse_scalar(text: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(text)
        .map_or_else(|_| Value::from(text), |json| from_json(&json))
}

/// Applies a `key.path=value` assignment, creating intermediate maps.
///
/// # Errors
///
/// Returns a configuration error if the assignment has no `=`, has an
/// empty path segment, or descends into a value that is not a map.
pub fn apply_assignment(attrs: &AttrMap, assignment: &str) -> Result<AttrMap> {
    let (path, raw) = assignment
        .split_once('=')
        .ok_or_else(|| config_error(format!("expected key=value, got '{assignment}'")))?;
    let segments: Vec<&str> = path.trim().split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(config_error(format!("empty key segment in '{path}'")));
    }
    set_path(attrs, &segments, parse_scalar(raw.trim()))
        .map_err(|e| e.with_frame(format!("assignment {path}")))
}

fn set_path(attrs: &AttrMap, segments: &[&str], value: Value) -> Result<AttrMap> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(attrs.clone());
    };
    if rest.is_empty() {
        return Ok(attrs.insert(Arc::from(*head), value));
    }
    let nested = match attrs.get(*head) {
        None => AttrMap::new(),
        Some(Value::Map(map)) => map.clone(),
        Some(other) => {
            return Err(config_error(format!(
                "'{head}' holds a {}, not a map",
                other.value_type()
            )));
        }
    };
    Ok(attrs.insert(Arc::from(*head), Value::Map(set_path(&nested, rest, value)?)))
}

/// Applies assignments in order; later assignments win.
///
/// # Errors
///
/// Fails on the first malformed assignment.
pub fn apply_assignments<S: AsRef<str>>(attrs: &AttrMap, assignments: &[S]) -> Result<AttrMap> {
    assignments
        .iter()
        .try_fold(attrs.clone(), |acc, assignment| {
            apply_assignment(&acc, assignment.as_ref())
        })
}
