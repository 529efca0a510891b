//! Excel workbook ingestion and tabular analysis.
//!
//! The first worksheet is read into a [`Table`]: the first row supplies
//! column headers, every following row becomes a record. Analysis mirrors
//! what an operator needs before a batch run: column types, empty-cell
//! counts, numeric summaries, and a small sample of rows.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::DocgenError;

/// A single spreadsheet cell, normalized from the raw worksheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn from_data(value: &Data) -> Cell {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(trimmed.to_string())
                }
            }
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => Cell::DateTime(naive),
                None => Cell::Number(dt.as_f64()),
            },
            Data::Error(_) => Cell::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Human-readable form, used both for substitution values and filters.
    /// Integral numbers print without a fractional part.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%d.%m.%Y").to_string()
                } else {
                    dt.format("%d.%m.%Y %H:%M:%S").to_string()
                }
            }
        }
    }
}

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// Pre-generation summary of an uploaded workbook.
#[derive(Debug, Serialize)]
pub struct TableAnalysis {
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub duplicate_rows: usize,
    /// Column name to one of `numeric`, `text`, `boolean`, `datetime`, `empty`.
    pub column_types: HashMap<String, String>,
    pub empty_counts: HashMap<String, usize>,
    pub numeric_stats: HashMap<String, NumericStats>,
    /// Up to five rows rendered as strings, for preview.
    pub sample_rows: Vec<HashMap<String, String>>,
}

/// Outcome of checking a placeholder-to-column mapping against a table.
#[derive(Debug, Serialize)]
pub struct MappingValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub mapped_columns: Vec<String>,
}

/// A row filter: keep rows whose cell in `column` renders to `value`.
/// Filters on the same column are OR-ed, filters across columns AND-ed.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

/// The first worksheet of a workbook, headers plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Parse the first worksheet of an XLSX file.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Table, DocgenError> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DocgenError::EmptyWorkbook)??;

        let mut rows_iter = range.rows();
        let header_row = rows_iter.next().ok_or(DocgenError::EmptyWorkbook)?;
        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = Cell::from_data(cell).display();
                if name.is_empty() {
                    format!("Column {}", i + 1)
                } else {
                    name
                }
            })
            .collect();

        let width = headers.len();
        let mut rows = Vec::new();
        for raw in rows_iter {
            let mut row: Vec<Cell> = raw.iter().take(width).map(Cell::from_data).collect();
            row.resize(width, Cell::Empty);
            if row.iter().all(Cell::is_empty) {
                continue;
            }
            rows.push(row);
        }

        Ok(Table { headers, rows })
    }

    fn column_index(&self, column: &str) -> Result<usize, DocgenError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DocgenError::Validation(format!("unknown column: {column}")))
    }

    /// Summarize the table for the pre-generation preview.
    pub fn analyze(&self) -> TableAnalysis {
        let mut column_types = HashMap::new();
        let mut empty_counts = HashMap::new();
        let mut numeric_stats = HashMap::new();

        for (i, header) in self.headers.iter().enumerate() {
            let cells: Vec<&Cell> = self.rows.iter().map(|r| &r[i]).collect();
            let non_empty: Vec<&&Cell> = cells.iter().filter(|c| !c.is_empty()).collect();
            empty_counts.insert(header.clone(), cells.len() - non_empty.len());

            let type_name = if non_empty.is_empty() {
                "empty"
            } else if non_empty.iter().all(|c| matches!(c, Cell::Number(_))) {
                "numeric"
            } else if non_empty.iter().all(|c| matches!(c, Cell::DateTime(_))) {
                "datetime"
            } else if non_empty.iter().all(|c| matches!(c, Cell::Bool(_))) {
                "boolean"
            } else {
                "text"
            };
            column_types.insert(header.clone(), type_name.to_string());

            if type_name == "numeric" {
                let values: Vec<f64> = non_empty.iter().filter_map(|c| c.as_number()).collect();
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let std = if values.len() > 1 {
                    let var =
                        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
                    var.sqrt()
                } else {
                    0.0
                };
                numeric_stats.insert(header.clone(), NumericStats { mean, min, max, std });
            }
        }

        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::display).collect())
            .collect();
        let mut seen: Vec<&Vec<String>> = Vec::new();
        let mut duplicate_rows = 0;
        for row in &rendered {
            if seen.contains(&row) {
                duplicate_rows += 1;
            } else {
                seen.push(row);
            }
        }

        let sample_rows = rendered
            .iter()
            .take(5)
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect();

        TableAnalysis {
            columns: self.headers.clone(),
            total_rows: self.rows.len(),
            duplicate_rows,
            column_types,
            empty_counts,
            numeric_stats,
            sample_rows,
        }
    }

    /// Distinct non-empty values of a column, sorted, for filter pick lists.
    pub fn column_values(&self, column: &str) -> Result<Vec<String>, DocgenError> {
        let idx = self.column_index(column)?;
        let mut values: Vec<String> = Vec::new();
        for row in &self.rows {
            if row[idx].is_empty() {
                continue;
            }
            let value = row[idx].display();
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values.sort();
        Ok(values)
    }

    /// Check a placeholder-to-column mapping before generation. An empty
    /// mapping or mapping a column that does not exist is an error; leaving a
    /// placeholder unmapped, or mapping a column with empty cells, only
    /// warns, since empty values render as empty text.
    pub fn validate_mapping(
        &self,
        mapping: &HashMap<String, String>,
        placeholders: &[String],
    ) -> MappingValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut mapped_columns = Vec::new();

        if mapping.is_empty() {
            errors.push("mapping is empty".to_string());
        }

        for (placeholder, column) in mapping {
            if self.headers.iter().any(|h| h == column) {
                if !mapped_columns.contains(column) {
                    mapped_columns.push(column.clone());
                }
            } else {
                errors.push(format!(
                    "placeholder '{placeholder}' is mapped to unknown column '{column}'"
                ));
            }
        }

        for placeholder in placeholders {
            if !mapping.contains_key(placeholder) {
                warnings.push(format!(
                    "placeholder '{placeholder}' has no mapping and will be left empty"
                ));
            }
        }

        for column in &mapped_columns {
            if let Ok(idx) = self.column_index(column) {
                let empty = self.rows.iter().filter(|r| r[idx].is_empty()).count();
                if empty > 0 {
                    warnings.push(format!(
                        "column '{column}' has {empty} empty cell(s); those placeholders will render empty"
                    ));
                }
            }
        }

        errors.sort();
        mapped_columns.sort();
        MappingValidation {
            valid: errors.is_empty(),
            errors,
            warnings,
            mapped_columns,
        }
    }

    /// Keep only rows matching the filters. Values are compared against the
    /// rendered cell text.
    pub fn apply_filters(&self, filters: &[RowFilter]) -> Result<Table, DocgenError> {
        if filters.is_empty() {
            return Ok(self.clone());
        }

        // column index -> accepted values
        let mut by_column: Vec<(usize, Vec<&str>)> = Vec::new();
        for filter in filters {
            let idx = self.column_index(&filter.column)?;
            match by_column.iter_mut().find(|(i, _)| *i == idx) {
                Some((_, values)) => values.push(filter.value.as_str()),
                None => by_column.push((idx, vec![filter.value.as_str()])),
            }
        }

        let rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .filter(|row| {
                by_column.iter().all(|(idx, values)| {
                    let cell = row[*idx].display();
                    values.iter().any(|v| v.trim() == cell)
                })
            })
            .cloned()
            .collect();

        Ok(Table {
            headers: self.headers.clone(),
            rows,
        })
    }
}
