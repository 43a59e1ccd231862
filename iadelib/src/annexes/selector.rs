//! File selectors carried in an inbound request body.

use serde_json::{Map, Value};

use crate::errors::Error;

/// One recognised file-selector key and the field names it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelector {
    /// `simple_files`: fields of the demand each holding one file
    Simple(Vec<String>),
    /// `workflow_files`: same shape, resolved against the workflow's fields
    Workflow(Vec<String>),
    /// `blocs_of_files`: bloc fields gating a `<name>_raw` sequence of sub-entries
    Blocs(Vec<String>),
}

impl FileSelector {
    /// Request keys in extraction order.
    pub const KEYS: [&'static str; 3] = ["simple_files", "workflow_files", "blocs_of_files"];

    pub fn key(&self) -> &'static str {
        match self {
            FileSelector::Simple(_) => "simple_files",
            FileSelector::Workflow(_) => "workflow_files",
            FileSelector::Blocs(_) => "blocs_of_files",
        }
    }

    pub fn field_names(&self) -> &[String] {
        match self {
            FileSelector::Simple(names) | FileSelector::Workflow(names) | FileSelector::Blocs(names) => names,
        }
    }

    fn from_key(key: &str, names: Vec<String>) -> Option<Self> {
        match key {
            "simple_files" => Some(FileSelector::Simple(names)),
            "workflow_files" => Some(FileSelector::Workflow(names)),
            "blocs_of_files" => Some(FileSelector::Blocs(names)),
            _ => None,
        }
    }
}

/// The file selectors present in a request, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    selectors: Vec<FileSelector>,
}

impl FileSelection {
    pub fn new(mut selectors: Vec<FileSelector>) -> Self {
        selectors.sort_by_key(|s| FileSelector::KEYS.iter().position(|k| *k == s.key()));
        Self { selectors }
    }

    /// Reads the selector keys out of a request body.
    ///
    /// Returns `None` when no selector key is present at all. A key mapped to
    /// `null` counts as present with no field names; any other non-list value, or
    /// a list holding anything but strings, is rejected.
    pub fn from_post_data(post_data: &Map<String, Value>) -> Result<Option<Self>, Error> {
        let mut selectors = Vec::new();

        for key in FileSelector::KEYS {
            let Some(value) = post_data.get(key) else {
                continue;
            };

            let names = match value {
                Value::Null => Vec::new(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| Error::BadRequest {
                            message: format!("'{key}' must be a list of field names, found {item}"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                other => {
                    return Err(Error::BadRequest {
                        message: format!("'{key}' must be a list of field names, found {other}"),
                    });
                }
            };

            if let Some(selector) = FileSelector::from_key(key, names) {
                selectors.push(selector);
            }
        }

        if selectors.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self { selectors }))
        }
    }

    pub fn selectors(&self) -> &[FileSelector] {
        &self.selectors
    }

    pub fn requires_workflow(&self) -> bool {
        self.selectors.iter().any(|s| matches!(s, FileSelector::Workflow(_)))
    }
}
