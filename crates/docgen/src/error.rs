/// Error type for the document generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DocgenError {
    #[error("invalid DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid DOCX template: {0}")]
    InvalidTemplate(String),

    #[error("failed to read Excel workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("workbook contains no worksheets")]
    EmptyWorkbook,

    #[error("{0}")]
    Validation(String),

    #[error("no rows matched the given filters. {0}")]
    NoMatchingRows(String),

    #[error("no documents could be generated from the selected rows")]
    NothingGenerated,

    #[error("document converter binary not found: {0}")]
    ConverterNotFound(std::io::Error),

    #[error("PDF conversion failed (exit code {exit_code:?}): {stderr}")]
    ConversionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("PDF conversion produced no output file")]
    PdfNotProduced,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
