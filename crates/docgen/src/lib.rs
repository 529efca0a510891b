//! Document generation pipeline.
//!
//! Takes a DOCX template with `{{placeholder}}` fields and tabular data from
//! an Excel workbook, and produces filled documents (DOCX or PDF) singly or
//! as a ZIP archive of one document per data row.
//!
//! - [`docx`] -- template parsing, placeholder extraction, rendering.
//! - [`workbook`] -- Excel ingestion, column analysis, row filtering.
//! - [`batch`] -- row-to-document mapping and ZIP assembly.
//! - [`pdf`] -- DOCX to PDF conversion via headless LibreOffice.

pub mod batch;
pub mod docx;
pub mod error;
pub mod pdf;
pub mod workbook;

pub use error::DocgenError;
