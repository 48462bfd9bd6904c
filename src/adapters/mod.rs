//! File adapters around the anonymization core.
//!
//! - [`document`] - loads input documents and writes anonymized output
//! - [`docx`] - Word documents: run text extraction and in-place rewrite
//! - [`mapping`] - serializes placeholder mappings as JSON, TXT or CSV
//!
//! The core only sees a text buffer and hands back a
//! [`MappingExport`](crate::anonymization::MappingExport); everything about
//! files and encodings lives here.

pub mod document;
pub mod docx;
pub mod mapping;

pub use document::{
    mapping_path_for, output_path_for, read_document, write_document, SourceDocument,
};
pub use docx::DocxDocument;
pub use mapping::{render, write_mapping, MappingFormat};
