//! Route definitions for `/generation` (batch document generation).

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/generation`. All endpoints take multipart forms
/// carrying the XLSX file.
///
/// ```text
/// POST /analyze          -> table summary
/// POST /column-values    -> distinct values of one column
/// POST /validate-mapping -> mapping check against a template
/// POST /generate         -> batch run, returns a ZIP
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(generation::analyze))
        .route("/column-values", post(generation::column_values))
        .route("/validate-mapping", post(generation::validate_mapping))
        .route("/generate", post(generation::generate))
}
