// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts, profile updates and the per-user activity log.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::extract::{ValidJson, EMAIL_REGEX};
use crate::middleware::auth::AuthUser;
use crate::middleware::require_admin;
use crate::middleware::role::require_self;
use crate::models::{ActivityLogEntry, Role, User};
use crate::routes::{authenticated, ApiResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Read window for the activity log.
pub const ACTIVITY_LOG_LIMIT: u32 = 50;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new().route("/users", post(create_user));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/{email}", put(update_role))
        .route_layer(middleware::from_fn(require_admin));

    let signed_in = Router::new()
        .route("/users/{email}", get(get_user))
        .route("/users/profile", put(update_profile))
        .route("/activity-log/{email}", get(get_activity_log));

    public
        .merge(authenticated(admin, state))
        .merge(authenticated(signed_in, state))
}

/// Append an entry to `email`'s activity log.
///
/// The log is advisory, so a failed write is logged and not surfaced.
pub(crate) async fn record_activity(db: &FirestoreDb, email: &str, description: &str) {
    let entry = ActivityLogEntry {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        description: description.to_string(),
        timestamp: now_rfc3339(),
    };

    if let Err(e) = db.append_activity(&entry).await {
        tracing::warn!(email = %email, error = %e, "Failed to record activity");
    }
}

// ─── Accounts ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Create a user on first sign-in. Existing users are left untouched.
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<Response> {
    let user = User {
        email: req.email,
        name: req.name,
        role: Role::Member,
        profile_image: req.profile_image,
        created_at: now_rfc3339(),
    };

    if !state.db.create_user_if_absent(&user).await? {
        return Ok(ApiResponse::message("User already exists").into_response());
    }

    tracing::info!(email = %user.email, "User created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User created", user),
    )
        .into_response())
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<Vec<User>>>> {
    Ok(ApiResponse::ok(state.db.list_users().await?))
}

/// Fetch the caller's own profile.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    require_self(&caller, &email)?;

    let user = state
        .db
        .get_user(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Change a user's role.
///
/// Tokens already issued keep their old role until they expire.
async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(email): Path<String>,
    ValidJson(req): ValidJson<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state
        .db
        .update_user_role(&email, req.role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(
        admin = %caller.email,
        email = %email,
        role = %req.role,
        "User role updated"
    );
    Ok(ApiResponse::with_message("User role updated successfully", user))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Must be the caller's own email when present
    #[serde(default)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    pub profile_image: Option<String>,
}

/// Update the caller's display name and picture.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>> {
    if let Some(email) = &req.email {
        require_self(&caller, email)?;
    }

    let user = state
        .db
        .update_user_profile(&caller.email, req.name, req.profile_image)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    record_activity(&state.db, &caller.email, "Updated profile information.").await;
    Ok(ApiResponse::with_message("Profile updated.", user))
}

// ─── Activity Log ────────────────────────────────────────────

async fn get_activity_log(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<Vec<ActivityLogEntry>>>> {
    require_self(&caller, &email)?;

    let entries = state
        .db
        .get_activity_log(&email, ACTIVITY_LOG_LIMIT)
        .await?;
    Ok(ApiResponse::ok(entries))
}
