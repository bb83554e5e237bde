//! Document serialization to JSON and `MessagePack`.
//!
//! Both encodings preserve the document's ordering, so the same
//! declarations always produce byte-identical output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use stratus_foundation::{Error, ErrorKind, Result};
use stratus_synth::Document;

use crate::config::OutputFormat;

fn serialization_error(e: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Serialization(e.to_string()))
}

/// Serializes a document to compact JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(document: &Document) -> Result<String> {
    serde_json::to_string(document).map_err(serialization_error)
}

/// Serializes a document to indented JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty(document: &Document) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(serialization_error)
}

/// Serializes a document to `MessagePack`.
///
/// Uses named serialization so maps keep their string keys.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_msgpack(document: &Document) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(document).map_err(serialization_error)
}

/// Encodes a document in `format`. `pretty` only affects JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(document: &Document, format: OutputFormat, pretty: bool) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json if pretty => to_json_pretty(document).map(String::into_bytes),
        OutputFormat::Json => to_json(document).map(String::into_bytes),
        OutputFormat::Msgpack => to_msgpack(document),
    }
}

/// Saves an encoded document to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to,
/// or if serialization fails.
pub fn save_to_file<P: AsRef<Path>>(
    document: &Document,
    format: OutputFormat,
    pretty: bool,
    path: P,
) -> Result<()> {
    let bytes = encode(document, format, pretty)?;
    let file = File::create(path.as_ref()).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to create file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to write to file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    writer.flush().map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to flush file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    Ok(())
}
