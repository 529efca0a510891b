//! Batch document generation: one document per table row, zipped.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};

use serde::Deserialize;
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use contracts_core::naming;
use contracts_core::numtext::format_amount_with_words;

use crate::docx::DocxTemplate;
use crate::error::DocgenError;
use crate::pdf;
use crate::workbook::Table;

/// Target format of the generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// Parameters for a batch run.
#[derive(Debug, Deserialize)]
pub struct GenerateOptions {
    pub output_format: OutputFormat,
    /// Placeholder name to column name.
    pub mapping: HashMap<String, String>,
    /// Columns whose numeric values are expanded to amount-in-words form.
    #[serde(default)]
    pub number_to_text_columns: Vec<String>,
    /// Currency phrase appended to amounts in words, e.g.
    /// "белорусских рубля 00 копеек".
    #[serde(default)]
    pub currency: Option<String>,
    /// Optional `{{placeholder}}` template for output filenames.
    #[serde(default)]
    pub filename_template: Option<String>,
}

/// Result of a batch run: the ZIP archive plus per-row accounting.
#[derive(Debug)]
pub struct BatchOutcome {
    pub archive: Vec<u8>,
    pub generated: usize,
    /// Rows that failed to render or convert; their errors are logged,
    /// not fatal.
    pub skipped: usize,
}

/// Generate one document per row of `table` and pack them into a ZIP.
///
/// A row that fails (a PDF conversion error, usually) is skipped and
/// counted; the batch only fails when every row does, or when the mapping
/// references a column the table does not have.
pub async fn generate_batch(
    template: &DocxTemplate,
    table: &Table,
    options: &GenerateOptions,
) -> Result<BatchOutcome, DocgenError> {
    // Resolve mapping columns up front so a typo fails the whole request
    // instead of silently skipping every row.
    let mut column_indices: HashMap<&str, usize> = HashMap::new();
    for column in options.mapping.values() {
        let idx = table
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DocgenError::Validation(format!("unknown column: {column}")))?;
        column_indices.insert(column.as_str(), idx);
    }

    if table.rows.is_empty() {
        return Err(DocgenError::NoMatchingRows(
            "the table has no rows to generate from".into(),
        ));
    }

    let extension = options.output_format.extension();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let zip_options = SimpleFileOptions::default();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut generated = 0;
    let mut skipped = 0;

    for (i, row) in table.rows.iter().enumerate() {
        let index = i + 1;
        let values = row_values(row, options, &column_indices);

        let bytes = match render_row(template, &values, options.output_format).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(row = index, error = %err, "skipping row: document generation failed");
                skipped += 1;
                continue;
            }
        };

        let name = unique_name(
            naming::render_filename(
                options.filename_template.as_deref(),
                &values,
                extension,
                index,
            ),
            &mut used_names,
        );

        writer.start_file(&name, zip_options)?;
        writer.write_all(&bytes)?;
        generated += 1;
    }

    if generated == 0 {
        return Err(DocgenError::NothingGenerated);
    }

    Ok(BatchOutcome {
        archive: writer.finish()?.into_inner(),
        generated,
        skipped,
    })
}

/// Substitution values for one row. Empty cells render as empty strings;
/// numeric cells from amount columns are expanded to words.
fn row_values(
    row: &[crate::workbook::Cell],
    options: &GenerateOptions,
    column_indices: &HashMap<&str, usize>,
) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for (placeholder, column) in &options.mapping {
        let cell = &row[column_indices[column.as_str()]];
        let mut value = cell.display();

        if options.number_to_text_columns.contains(column) {
            let number = cell
                .as_number()
                .or_else(|| value.trim().replace(',', ".").parse::<f64>().ok());
            if let Some(number) = number {
                let currency = options.currency.as_deref().unwrap_or("");
                value = format_amount_with_words(number, currency);
            }
        }

        values.insert(placeholder.clone(), value);
    }
    values
}

async fn render_row(
    template: &DocxTemplate,
    values: &HashMap<String, String>,
    format: OutputFormat,
) -> Result<Vec<u8>, DocgenError> {
    let docx = template.render(values)?;
    match format {
        OutputFormat::Docx => Ok(docx),
        OutputFormat::Pdf => pdf::docx_to_pdf(&docx).await,
    }
}

/// Deduplicate archive entry names by inserting ` (n)` before the extension.
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.clone(), String::new()),
    };
    for n in 2.. {
        let candidate = format!("{stem} ({n}){ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }
    unreachable!("counter space exhausted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Cell;
    use std::io::Read;
    use zip::ZipArchive;

    fn make_template() -> DocxTemplate {
        let body = "<w:p><w:r><w:t>Клиент: {{client}}, сумма: {{amount}}</w:t></w:r></w:p>";
        let document = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        DocxTemplate::from_bytes(&writer.finish().unwrap().into_inner()).unwrap()
    }

    fn make_table() -> Table {
        Table {
            headers: vec!["Клиент".into(), "Сумма".into()],
            rows: vec![
                vec![Cell::Text("ООО Ромашка".into()), Cell::Number(5200.0)],
                vec![Cell::Text("ИП Иванов".into()), Cell::Number(150.5)],
            ],
        }
    }

    fn docx_options() -> GenerateOptions {
        GenerateOptions {
            output_format: OutputFormat::Docx,
            mapping: HashMap::from([
                ("client".to_string(), "Клиент".to_string()),
                ("amount".to_string(), "Сумма".to_string()),
            ]),
            number_to_text_columns: Vec::new(),
            currency: None,
            filename_template: None,
        }
    }

    fn archive_names(archive: &[u8]) -> Vec<String> {
        let zip = ZipArchive::new(Cursor::new(archive.to_vec())).unwrap();
        zip.file_names().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn generates_one_document_per_row() {
        let outcome = generate_batch(&make_template(), &make_table(), &docx_options())
            .await
            .unwrap();

        assert_eq!(outcome.generated, 2);
        assert_eq!(outcome.skipped, 0);

        let mut names = archive_names(&outcome.archive);
        names.sort();
        assert_eq!(names, vec!["act_1.docx", "act_2.docx"]);
    }

    #[tokio::test]
    async fn substitutes_row_values_into_each_document() {
        let outcome = generate_batch(&make_template(), &make_table(), &docx_options())
            .await
            .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(outcome.archive)).unwrap();
        let mut entry = zip.by_name("act_1.docx").unwrap();
        let mut inner = Vec::new();
        entry.read_to_end(&mut inner).unwrap();

        let mut inner_zip = ZipArchive::new(Cursor::new(inner)).unwrap();
        let mut doc = inner_zip.by_name("word/document.xml").unwrap();
        let mut xml = String::new();
        doc.read_to_string(&mut xml).unwrap();
        assert!(xml.contains("ООО Ромашка"));
        assert!(xml.contains("5200"));
    }

    #[tokio::test]
    async fn filename_template_names_documents() {
        let mut options = docx_options();
        options.filename_template = Some("Акт {{client}}".to_string());

        let outcome = generate_batch(&make_template(), &make_table(), &options)
            .await
            .unwrap();

        let mut names = archive_names(&outcome.archive);
        names.sort();
        assert_eq!(names, vec!["Акт ИП Иванов.docx", "Акт ООО Ромашка.docx"]);
    }

    #[tokio::test]
    async fn colliding_filenames_get_numbered() {
        let mut table = make_table();
        table.rows[1][0] = Cell::Text("ООО Ромашка".into());
        let mut options = docx_options();
        options.filename_template = Some("Акт {{client}}".to_string());

        let outcome = generate_batch(&make_template(), &table, &options).await.unwrap();

        let mut names = archive_names(&outcome.archive);
        names.sort();
        assert_eq!(names, vec!["Акт ООО Ромашка (2).docx", "Акт ООО Ромашка.docx"]);
    }

    #[tokio::test]
    async fn amount_columns_are_expanded_to_words() {
        let mut options = docx_options();
        options.number_to_text_columns = vec!["Сумма".to_string()];
        options.currency = Some("белорусских рубля 00 копеек".to_string());

        let outcome = generate_batch(&make_template(), &make_table(), &options)
            .await
            .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(outcome.archive)).unwrap();
        let mut entry = zip.by_name("act_1.docx").unwrap();
        let mut inner = Vec::new();
        entry.read_to_end(&mut inner).unwrap();

        let mut inner_zip = ZipArchive::new(Cursor::new(inner)).unwrap();
        let mut doc = inner_zip.by_name("word/document.xml").unwrap();
        let mut xml = String::new();
        doc.read_to_string(&mut xml).unwrap();
        assert!(xml.contains("пять тысяч двести"), "got: {xml}");
    }

    #[tokio::test]
    async fn unknown_mapped_column_fails_fast() {
        let mut options = docx_options();
        options.mapping.insert("x".to_string(), "Нет такой".to_string());

        assert!(matches!(
            generate_batch(&make_template(), &make_table(), &options).await,
            Err(DocgenError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn empty_table_is_rejected() {
        let mut table = make_table();
        table.rows.clear();

        assert!(matches!(
            generate_batch(&make_template(), &table, &docx_options()).await,
            Err(DocgenError::NoMatchingRows(_))
        ));
    }
}
