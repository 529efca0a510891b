//! Handlers for the `/templates` resource: upload, download, placeholder
//! metadata, and single-document generation.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use contracts_core::audit::{actions, targets};
use contracts_core::error::CoreError;
use contracts_core::naming;
use contracts_core::permissions::PermissionLevel;
use contracts_core::types::DbId;
use contracts_db::models::placeholder::UpsertPlaceholderDescription;
use contracts_db::models::template::{CreateTemplate, Template};
use contracts_db::repositories::{PlaceholderRepo, TemplateRepo};
use contracts_docgen::batch::OutputFormat;
use contracts_docgen::docx::DocxTemplate;
use contracts_docgen::pdf;

use crate::access::{record_action, require_folder_access};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a template exists, returning the full row.
pub(crate) async fn ensure_template_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Template> {
    TemplateRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Template", id }))
}

/// Read the stored DOCX file of a template.
pub(crate) async fn read_template_file(
    state: &AppState,
    template: &Template,
) -> AppResult<Vec<u8>> {
    let path = state.config.storage_dir.join(&template.file_path);
    tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read template file: {e}")))
}

/// Build a `Content-Disposition: attachment` value that survives non-ASCII
/// filenames (RFC 5987 `filename*` with an ASCII fallback).
pub(crate) fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect();
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect();
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

// ---------------------------------------------------------------------------
// POST /templates
// ---------------------------------------------------------------------------

/// Upload a DOCX template into a folder (`upload` level).
///
/// Multipart form with a `folder_id` text field and a `file` field holding
/// the DOCX. The archive is parsed before anything is stored, so a corrupt
/// or non-DOCX upload is rejected outright.
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Template>>)> {
    let mut folder_id: Option<DbId> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("folder_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                folder_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::BadRequest("Invalid folder_id".into()))?,
                );
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("template.docx").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let folder_id =
        folder_id.ok_or_else(|| AppError::BadRequest("Missing folder_id field".into()))?;
    let (original_filename, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;

    if !original_filename.to_lowercase().ends_with(".docx") {
        return Err(AppError::BadRequest(
            "Only .docx templates are accepted".into(),
        ));
    }

    require_folder_access(&state.pool, &user, folder_id, PermissionLevel::Upload).await?;

    // Parse before storing: rejects corrupt archives and non-DOCX content.
    DocxTemplate::from_bytes(&data)?;

    let name = naming::sanitize_filename(
        original_filename
            .strip_suffix(".docx")
            .or_else(|| original_filename.strip_suffix(".DOCX"))
            .unwrap_or(&original_filename),
    )
    .ok_or_else(|| AppError::BadRequest("Template filename is not usable".into()))?;

    let relative_path = format!("templates/{}.docx", Uuid::new_v4());
    let absolute = state.config.storage_dir.join(&relative_path);
    if let Some(parent) = absolute.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create storage dir: {e}")))?;
    }
    tokio::fs::write(&absolute, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store template file: {e}")))?;

    let template = match TemplateRepo::create(
        &state.pool,
        &CreateTemplate {
            folder_id,
            name,
            original_filename,
            file_path: relative_path.clone(),
            size_bytes: data.len() as i64,
            uploaded_by: Some(user.user_id),
        },
    )
    .await
    {
        Ok(template) => template,
        Err(err) => {
            // Do not leave the file behind when the insert fails
            // (duplicate name in folder, usually).
            let _ = tokio::fs::remove_file(&absolute).await;
            return Err(err.into());
        }
    };

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::UPLOAD,
        Some(targets::TEMPLATE),
        Some(template.id),
        Some(json!({ "name": template.name, "folder_id": folder_id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

// ---------------------------------------------------------------------------
// GET /templates
// ---------------------------------------------------------------------------

/// List every template across all folders (admin only).
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Template>>>> {
    let templates = TemplateRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: templates }))
}

// ---------------------------------------------------------------------------
// GET /templates/{id}
// ---------------------------------------------------------------------------

/// Template metadata (`view` level on its folder).
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Template>>> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;
    Ok(Json(DataResponse { data: template }))
}

// ---------------------------------------------------------------------------
// GET /templates/{id}/download
// ---------------------------------------------------------------------------

/// Download the original DOCX file (`view` level).
pub async fn download(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;

    let data = read_template_file(&state, &template).await?;

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::DOWNLOAD,
        Some(targets::TEMPLATE),
        Some(template.id),
        None,
    )
    .await;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&template.original_filename),
            ),
        ],
        data,
    ))
}

// ---------------------------------------------------------------------------
// DELETE /templates/{id}
// ---------------------------------------------------------------------------

/// Delete a template and its stored file. Requires the `delete` level on the
/// folder, except that the user who uploaded the template may always remove
/// their own upload.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let template = ensure_template_exists(&state.pool, id).await?;
    if template.uploaded_by != Some(user.user_id) {
        require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::Delete)
            .await?;
    }

    let deleted = TemplateRepo::delete(&state.pool, id).await?;
    if let Some(deleted) = deleted {
        let absolute = state.config.storage_dir.join(&deleted.file_path);
        if let Err(err) = tokio::fs::remove_file(&absolute).await {
            tracing::warn!(path = deleted.file_path, error = %err, "Failed to remove stored template file");
        }
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::DELETE,
        Some(targets::TEMPLATE),
        Some(id),
        Some(json!({ "name": template.name })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /templates/{id}/fields
// ---------------------------------------------------------------------------

/// One placeholder with its optional human-readable description.
#[derive(Debug, Serialize)]
pub struct TemplateField {
    pub placeholder: String,
    pub description: Option<String>,
}

/// Extract the template's placeholders, in order of first appearance, and
/// pair each with its stored description (`view` level).
pub async fn fields(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TemplateField>>>> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;

    let data = read_template_file(&state, &template).await?;
    let placeholders = DocxTemplate::from_bytes(&data)?.placeholders()?;

    let descriptions: HashMap<String, String> =
        PlaceholderRepo::list_by_template(&state.pool, id)
            .await?
            .into_iter()
            .map(|d| (d.placeholder, d.description))
            .collect();

    let fields = placeholders
        .into_iter()
        .map(|placeholder| {
            let description = descriptions.get(&placeholder).cloned();
            TemplateField {
                placeholder,
                description,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: fields }))
}

// ---------------------------------------------------------------------------
// GET /templates/{id}/placeholders
// ---------------------------------------------------------------------------

/// List the stored placeholder descriptions for a template (`view` level).
///
/// Unlike [`fields`], this does not open the DOCX file; it only returns what
/// has been described so far.
pub async fn list_placeholders(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<contracts_db::models::placeholder::PlaceholderDescription>>>> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;

    let rows = PlaceholderRepo::list_by_template(&state.pool, id).await?;
    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// PUT /templates/{id}/placeholders
// ---------------------------------------------------------------------------

/// Set the description of one placeholder (`upload` level). The placeholder
/// must actually occur in the template.
pub async fn upsert_placeholder(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpsertPlaceholderDescription>,
) -> AppResult<Json<DataResponse<contracts_db::models::placeholder::PlaceholderDescription>>> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::Upload).await?;

    let data = read_template_file(&state, &template).await?;
    let placeholders = DocxTemplate::from_bytes(&data)?.placeholders()?;
    if !placeholders.contains(&input.placeholder) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Template has no placeholder named '{}'",
            input.placeholder
        ))));
    }

    let row =
        PlaceholderRepo::upsert(&state.pool, id, &input.placeholder, &input.description).await?;
    Ok(Json(DataResponse { data: row }))
}

/// DELETE /templates/{id}/placeholders/{name} -- remove a description
/// (`upload` level).
pub async fn delete_placeholder(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, name)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::Upload).await?;

    let deleted = PlaceholderRepo::delete(&state.pool, id, &name).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "PlaceholderDescription",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /templates/{id}/generate
// ---------------------------------------------------------------------------

/// Request body for single-document generation.
#[derive(Debug, Deserialize)]
pub struct GenerateOne {
    /// Placeholder name to substitution value.
    pub values: HashMap<String, String>,
    pub output_format: OutputFormat,
    /// Optional filename template; `{{key}}` occurrences are substituted from
    /// `values` and the extension is appended as needed.
    pub filename: Option<String>,
}

/// Fill one template with explicit values and return the document
/// (`view` level).
pub async fn generate_one(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<GenerateOne>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state.pool, id).await?;
    require_folder_access(&state.pool, &user, template.folder_id, PermissionLevel::View).await?;

    let data = read_template_file(&state, &template).await?;
    let docx = DocxTemplate::from_bytes(&data)?.render(&input.values)?;

    let extension = input.output_format.extension();
    let (bytes, content_type) = match input.output_format {
        OutputFormat::Docx => (
            docx,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        OutputFormat::Pdf => (pdf::docx_to_pdf(&docx).await?, "application/pdf"),
    };

    let filename = match input.filename.as_deref() {
        Some(pattern) => naming::render_filename(Some(pattern), &input.values, extension, 1),
        None => naming::ensure_extension(&template.name, extension),
    };

    record_action(
        &state.pool,
        Some(user.user_id),
        &user.username,
        actions::GENERATE,
        Some(targets::TEMPLATE),
        Some(template.id),
        Some(json!({ "format": extension, "mode": "single" })),
    )
    .await;

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        bytes,
    ))
}
