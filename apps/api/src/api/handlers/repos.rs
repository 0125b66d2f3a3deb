use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::state::SharedState;

/// Request body for scanning a repository
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(alias = "repoUrl")]
    pub repo_url: String,
}

/// Every readable file of the repository, keyed by file name
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub files: HashMap<String, String>,
}

/// Fetch the contents of a GitHub repository
///
/// POST /scan-repository
pub async fn scan_repository(
    State(state): State<SharedState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::error!(error = %e.body_text(), "Invalid scan request");
        ApiError::reported(e.body_text())
    })?;

    let files = state
        .scanner
        .scan_all_files(&req.repo_url)
        .await
        .map_err(|e| {
            tracing::error!(repo_url = %req.repo_url, error = %e, "Repository scan failed");
            ApiError::from(e)
        })?;

    Ok(Json(ScanResponse { files }))
}
