//! Collects the uploaded files a request points at out of a demand's fields.

use serde_json::{Map, Value};
use thiserror::Error as ThisError;

use super::selector::{FileSelection, FileSelector};

/// Sub-entry key holding the file inside a bloc row.
const BLOC_FILE_KEY: &str = "fichier";

/// The submitted record does not match what the file selection says it holds.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("bloc '{bloc}' is set but its '{bloc}_raw' companion field is missing")]
    MissingCompanionData { bloc: String },

    #[error("'{bloc}_raw' must be a list of bloc rows")]
    MalformedCompanion { bloc: String },

    #[error("row {index} of bloc '{bloc}' has no 'fichier' entry")]
    MissingBlocFile { bloc: String, index: usize },

    #[error("field '{field}' does not hold a file (expected an object with 'filename' and 'content')")]
    MalformedFile { field: String },

    #[error("workflow files were requested but the demand has no workflow fields")]
    MissingWorkflowFields,

    #[error("files were requested but the demand has no 'fields' mapping")]
    MissingDemandFields,
}

/// One uploaded file as the caller platform serialises it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFileEntry {
    pub filename: String,
    /// Opaque payload, normally base64 text; forwarded untouched.
    pub content: Value,
}

impl RawFileEntry {
    fn from_value(field: &str, value: &Value) -> Result<Self, ExtractionError> {
        let malformed = || ExtractionError::MalformedFile { field: field.to_string() };
        let file = value.as_object().ok_or_else(malformed)?;
        let filename = file.get("filename").and_then(Value::as_str).ok_or_else(malformed)?;
        let content = file.get("content").ok_or_else(malformed)?;

        Ok(Self {
            filename: filename.to_string(),
            content: content.clone(),
        })
    }
}

/// Truthiness as the caller platform's form engine understands it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn truthy_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|value| is_truthy(value))
}

fn simple_files(fields: &Map<String, Value>, names: &[String], out: &mut Vec<RawFileEntry>) -> Result<(), ExtractionError> {
    for name in names {
        if let Some(value) = truthy_field(fields, name) {
            out.push(RawFileEntry::from_value(name, value)?);
        }
    }
    Ok(())
}

fn bloc_files(fields: &Map<String, Value>, blocs: &[String], out: &mut Vec<RawFileEntry>) -> Result<(), ExtractionError> {
    for bloc in blocs {
        if truthy_field(fields, bloc).is_none() {
            continue;
        }

        let rows = fields
            .get(&format!("{bloc}_raw"))
            .ok_or_else(|| ExtractionError::MissingCompanionData { bloc: bloc.clone() })?
            .as_array()
            .ok_or_else(|| ExtractionError::MalformedCompanion { bloc: bloc.clone() })?;

        for (index, row) in rows.iter().enumerate() {
            let file = row
                .get(BLOC_FILE_KEY)
                .ok_or_else(|| ExtractionError::MissingBlocFile { bloc: bloc.clone(), index })?;
            out.push(RawFileEntry::from_value(&format!("{bloc}_raw[{index}].{BLOC_FILE_KEY}"), file)?);
        }
    }
    Ok(())
}

/// Flattens every selected file into one list.
///
/// Simple files come first, then workflow files, then bloc files; within each
/// category the order of the listed field names (and of bloc rows) is kept.
/// Listed fields that are absent or falsy contribute nothing.
pub fn extract(
    fields: &Map<String, Value>,
    workflow_fields: Option<&Map<String, Value>>,
    selection: &FileSelection,
) -> Result<Vec<RawFileEntry>, ExtractionError> {
    let mut entries = Vec::new();

    for selector in selection.selectors() {
        match selector {
            FileSelector::Simple(names) => simple_files(fields, names, &mut entries)?,
            FileSelector::Workflow(names) => {
                let workflow_fields = workflow_fields.ok_or(ExtractionError::MissingWorkflowFields)?;
                simple_files(workflow_fields, names, &mut entries)?;
            }
            FileSelector::Blocs(blocs) => bloc_files(fields, blocs, &mut entries)?,
        }
    }

    Ok(entries)
}
