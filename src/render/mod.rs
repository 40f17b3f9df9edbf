//! Serialization of outlines, fragments and batch records.

mod json;

pub use json::{failure_json, fragments_to_json, to_json, to_json_with_error, JsonFormat};
