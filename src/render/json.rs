//! JSON rendering for outlines and extracted fragments.

use serde::Serialize;

use crate::error::Result;
use crate::model::{DocumentFragments, Heading, Outline};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Convert an outline to JSON.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    serialize(outline, format)
}

/// Convert extracted fragments to JSON.
pub fn fragments_to_json(document: &DocumentFragments, format: JsonFormat) -> Result<String> {
    serialize(document, format)
}

#[derive(Serialize)]
struct AnnotatedOutline<'a> {
    #[serde(flatten)]
    outline: &'a Outline,
    error: &'a str,
}

/// Convert an outline to JSON with an `error` note, used when a document
/// yielded no text.
pub fn to_json_with_error(outline: &Outline, error: &str, format: JsonFormat) -> Result<String> {
    serialize(&AnnotatedOutline { outline, error }, format)
}

#[derive(Serialize)]
struct FailureMetadata<'a> {
    source_file: &'a str,
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    title: &'a str,
    headings: &'a [Heading],
    error: &'a str,
    metadata: FailureMetadata<'a>,
}

/// JSON written in place of an outline when a document fails to process.
pub fn failure_json(source_file: &str, error: &str, format: JsonFormat) -> Result<String> {
    serialize(
        &FailureRecord {
            title: "",
            headings: &[],
            error,
            metadata: FailureMetadata { source_file },
        },
        format,
    )
}
