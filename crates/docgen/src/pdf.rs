//! DOCX to PDF conversion via headless LibreOffice.

use std::path::Path;

use tempfile::TempDir;

use crate::error::DocgenError;

/// Binary name; override with the `LIBREOFFICE_BIN` environment variable
/// when the host installs it as `libreoffice7.6` or similar.
fn converter_binary() -> String {
    std::env::var("LIBREOFFICE_BIN").unwrap_or_else(|_| "libreoffice".to_string())
}

/// Convert DOCX bytes to PDF bytes.
///
/// LibreOffice only converts files on disk and only writes next to
/// `--outdir`, so the input is staged in a temporary directory that is
/// removed when the conversion finishes.
pub async fn docx_to_pdf(docx: &[u8]) -> Result<Vec<u8>, DocgenError> {
    let workdir = TempDir::new()?;
    let input_path = workdir.path().join("document.docx");
    tokio::fs::write(&input_path, docx).await?;

    convert_file(&input_path, workdir.path()).await?;

    let pdf_path = workdir.path().join("document.pdf");
    if !pdf_path.exists() {
        return Err(DocgenError::PdfNotProduced);
    }
    Ok(tokio::fs::read(&pdf_path).await?)
}

async fn convert_file(input: &Path, outdir: &Path) -> Result<(), DocgenError> {
    let output = tokio::process::Command::new(converter_binary())
        .args(["--headless", "--norestore", "--convert-to", "pdf", "--outdir"])
        .arg(outdir)
        .arg(input)
        .output()
        .await
        .map_err(DocgenError::ConverterNotFound)?;

    if !output.status.success() {
        return Err(DocgenError::ConversionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}
