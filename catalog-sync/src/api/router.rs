// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Management HTTP router

use super::error::{ApiError, ApiResult};
use super::resource::CatalogResource;
use crate::catalog::{CatalogDefinition, CatalogDefinitionRequest};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Creates the catalog management router
pub fn management_router(resource: Arc<CatalogResource>) -> Router {
    Router::new()
        .route("/v1/catalog", get(list_catalogs).post(save_catalog))
        .route("/v1/catalog/:name", get(get_catalog).delete(delete_catalog))
        .fallback(not_found)
        .with_state(resource)
}

/// `GET /v1/catalog`
async fn list_catalogs(
    State(resource): State<Arc<CatalogResource>>,
) -> ApiResult<Json<Vec<CatalogDefinition>>> {
    Ok(Json(resource.list().await?))
}

/// `GET /v1/catalog/{name}`
async fn get_catalog(
    State(resource): State<Arc<CatalogResource>>,
    Path(name): Path<String>,
) -> ApiResult<Json<CatalogDefinition>> {
    Ok(Json(resource.detail(&name).await?))
}

/// `POST /v1/catalog`
async fn save_catalog(
    State(resource): State<Arc<CatalogResource>>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let request: CatalogDefinitionRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest {
            message: format!("invalid catalog definition: {}", e),
        })?;
    resource.save(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/catalog/{name}`
async fn delete_catalog(
    State(resource): State<Arc<CatalogResource>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    resource.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound {
        message: format!("not found: {}", uri.path()),
    }
}
