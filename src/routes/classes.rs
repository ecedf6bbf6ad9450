// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Class catalog.

use crate::error::{AppError, Result};
use crate::extract::{parse_id, ValidJson};
use crate::middleware::require_admin;
use crate::models::FitnessClass;
use crate::routes::{authenticated, ApiResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/classes", post(create_class))
        .route("/classes/{id}", delete(delete_class))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/classes", get(list_classes))
        .merge(authenticated(admin, state))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, message = "Class name and description are required."))]
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, message = "Class name and description are required."))]
    #[serde(default)]
    pub description: String,
}

async fn list_classes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FitnessClass>>>> {
    Ok(ApiResponse::ok(state.db.list_classes().await?))
}

async fn create_class(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateClassRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FitnessClass>>)> {
    let class = FitnessClass {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name,
        description: req.description,
        created_at: now_rfc3339(),
    };

    state.db.create_class(&class).await?;
    tracing::info!(class_id = %class.id, "Class added");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Class added successfully.", class),
    ))
}

async fn delete_class(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let id = parse_id(&id, "ID format")?;
    if !state.db.delete_class(&id).await? {
        return Err(AppError::NotFound("Class not found.".to_string()));
    }

    tracing::info!(class_id = %id, "Class deleted");
    Ok(ApiResponse::message("Class deleted successfully."))
}
