//! Backend attachment documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::RawFileEntry;

/// Content type tag of an annex on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnexType {
    Annex,
}

/// Category under which the backend files every annex sent by this connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Annexe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnexFile {
    pub data: Value,
    pub filename: String,
}

/// An annex as the backend expects it, either embedded as a child of a new item
/// or posted on its own onto an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnexDocument {
    #[serde(rename = "@type")]
    pub kind: AnnexType,
    pub title: String,
    pub content_category: ContentCategory,
    pub file: AnnexFile,
}

impl From<RawFileEntry> for AnnexDocument {
    fn from(entry: RawFileEntry) -> Self {
        Self {
            kind: AnnexType::Annex,
            title: entry.filename.clone(),
            content_category: ContentCategory::Annexe,
            file: AnnexFile {
                data: entry.content,
                filename: entry.filename,
            },
        }
    }
}

/// Converts extracted files one to one, preserving order.
pub fn structure(entries: Vec<RawFileEntry>) -> Vec<AnnexDocument> {
    entries.into_iter().map(AnnexDocument::from).collect()
}
