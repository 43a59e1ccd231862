//! Annex extraction and structuring.
//!
//! A request names the demand fields holding files through three selector keys
//! ([`FileSelection`]). [`extract`] pulls the matching uploads out of the demand
//! into a flat, ordered list of [`RawFileEntry`], and [`structure`] turns each of
//! them into the [`AnnexDocument`] shape the backend stores.

pub mod extract;
pub mod selector;
pub mod structure;

pub use extract::{ExtractionError, RawFileEntry, extract, is_truthy};
pub use selector::{FileSelection, FileSelector};
pub use structure::{AnnexDocument, AnnexFile, AnnexType, ContentCategory, structure};
