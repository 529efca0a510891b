//! Handlers for batch generation from Excel workbooks: analysis of an
//! uploaded table, mapping validation, and the batch run itself.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use contracts_core::audit::{actions, targets};
use contracts_core::naming;
use contracts_core::permissions::PermissionLevel;
use contracts_core::types::DbId;
use contracts_docgen::batch::{generate_batch, GenerateOptions};
use contracts_docgen::docx::DocxTemplate;
use contracts_docgen::workbook::{MappingValidation, RowFilter, Table, TableAnalysis};

use crate::access::{record_action, require_folder_access};
use crate::error::{AppError, AppResult};
use crate::handlers::templates::{content_disposition, ensure_template_exists, read_template_file};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fields accepted by the generation endpoints. Each handler uses the
/// subset it needs; unknown fields are ignored.
#[derive(Default)]
struct GenerationForm {
    file: Option<Vec<u8>>,
    column: Option<String>,
    template_id: Option<DbId>,
    mapping: Option<serde_json::Value>,
    options: Option<GenerateOptions>,
    filters: Option<Vec<RowFilter>>,
    output_filename: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> AppResult<GenerationForm> {
    let mut form = GenerationForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some(data.to_vec());
            }
            Some("column") => {
                form.column = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("template_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.template_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::BadRequest("Invalid template_id".into()))?,
                );
            }
            Some("mapping") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.mapping = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::BadRequest(format!("Invalid mapping JSON: {e}")))?,
                );
            }
            Some("options") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.options = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::BadRequest(format!("Invalid options JSON: {e}")))?,
                );
            }
            Some("filters") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.filters = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::BadRequest(format!("Invalid filters JSON: {e}")))?,
                );
            }
            Some("output_filename") => {
                form.output_filename = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }
    Ok(form)
}

impl GenerationForm {
    fn require_file(&self) -> AppResult<&[u8]> {
        self.file
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Missing file field".into()))
    }

    fn require_template_id(&self) -> AppResult<DbId> {
        self.template_id
            .ok_or_else(|| AppError::BadRequest("Missing template_id field".into()))
    }
}

// ---------------------------------------------------------------------------
// POST /generation/analyze
// ---------------------------------------------------------------------------

/// Summarize an uploaded XLSX table: columns, inferred types, duplicates,
/// numeric statistics and a few sample rows.
pub async fn analyze(
    _user: AuthUser,
    State(_state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<TableAnalysis>>> {
    let form = read_form(multipart).await?;
    let table = Table::from_xlsx_bytes(form.require_file()?)?;
    Ok(Json(DataResponse {
        data: table.analyze(),
    }))
}

// ---------------------------------------------------------------------------
// POST /generation/column-values
// ---------------------------------------------------------------------------

/// Distinct non-empty values of one column, for building row filters.
pub async fn column_values(
    _user: AuthUser,
    State(_state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let form = read_form(multipart).await?;
    let column = form
        .column
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing column field".into()))?;
    let table = Table::from_xlsx_bytes(form.require_file()?)?;
    let values = table.column_values(column)?;
    Ok(Json(DataResponse { data: values }))
}

// ---------------------------------------------------------------------------
// POST /generation/validate-mapping
// ---------------------------------------------------------------------------

/// Check a placeholder-to-column mapping against both the uploaded table
/// and the template's placeholders (`view` level on the template's folder).
pub async fn validate_mapping(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<MappingValidation>>> {
    let form = read_form(multipart).await?;
    let template_id = form.require_template_id()?;
    let mapping: std::collections::HashMap<String, String> = form
        .mapping
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid mapping JSON: {e}")))?
        .ok_or_else(|| AppError::BadRequest("Missing mapping field".into()))?;

    let template = ensure_template_exists(&state.pool, template_id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;

    let docx = read_template_file(&state, &template).await?;
    let placeholders = DocxTemplate::from_bytes(&docx)?.placeholders()?;

    let table = Table::from_xlsx_bytes(form.require_file()?)?;
    let validation = table.validate_mapping(&mapping, &placeholders);
    Ok(Json(DataResponse { data: validation }))
}

// ---------------------------------------------------------------------------
// POST /generation/generate
// ---------------------------------------------------------------------------

/// Run the batch: one document per table row, packed into a ZIP
/// (`view` level on the template's folder).
pub async fn generate(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_form(multipart).await?;
    let template_id = form.require_template_id()?;
    let options = form
        .options
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing options field".into()))?;

    let template = ensure_template_exists(&state.pool, template_id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;

    let docx_bytes = read_template_file(&state, &template).await?;
    let docx = DocxTemplate::from_bytes(&docx_bytes)?;

    let full_table = Table::from_xlsx_bytes(form.require_file()?)?;
    let table = match form.filters.as_deref() {
        Some(filters) => {
            let filtered = full_table.apply_filters(filters)?;
            if filtered.rows.is_empty() {
                // Tell the caller what the first filter column actually
                // contains instead of returning an empty archive.
                let message = match filters.first() {
                    Some(first) => format!(
                        "No rows match the given filters; column '{}' contains: {}",
                        first.column,
                        full_table.column_values(&first.column)?.join(", ")
                    ),
                    None => "No rows match the given filters".to_string(),
                };
                return Err(AppError::BadRequest(message));
            }
            filtered
        }
        None => full_table,
    };

    let outcome = generate_batch(&docx, &table, options).await?;

    let archive_name = form
        .output_filename
        .as_deref()
        .and_then(naming::sanitize_filename)
        .map(|name| naming::ensure_extension(&name, "zip"))
        .unwrap_or_else(|| "documents.zip".to_string());

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::GENERATE,
        Some(targets::TEMPLATE),
        Some(template.id),
        Some(json!({
            "format": options.output_format.extension(),
            "mode": "batch",
            "generated": outcome.generated,
            "skipped": outcome.skipped,
        })),
    )
    .await;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&archive_name),
            ),
            (
                header::HeaderName::from_static("x-generated-count"),
                outcome.generated.to_string(),
            ),
            (
                header::HeaderName::from_static("x-skipped-count"),
                outcome.skipped.to_string(),
            ),
        ],
        outcome.archive,
    ))
}
