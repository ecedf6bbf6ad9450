// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Newsletter signup.

use crate::error::Result;
use crate::extract::{ValidJson, EMAIL_REGEX};
use crate::middleware::require_admin;
use crate::models::NewsletterSubscriber;
use crate::routes::{authenticated, ApiResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/subscribe", get(list_subscribers))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/subscribe", post(subscribe))
        .merge(authenticated(admin, state))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Subscribe an email once. A repeat is answered with `success: false`.
async fn subscribe(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SubscribeRequest>,
) -> Result<Json<ApiResponse<()>>> {
    let subscriber = NewsletterSubscriber {
        email: req.email,
        name: req.name,
        subscribed_at: now_rfc3339(),
    };

    if !state.db.subscribe(&subscriber).await? {
        tracing::debug!(email = %subscriber.email, "Duplicate newsletter signup");
        return Ok(ApiResponse::refused("Email already subscribed"));
    }

    tracing::info!(email = %subscriber.email, "Newsletter subscriber added");
    Ok(ApiResponse::message("Subscribed successfully"))
}

async fn list_subscribers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NewsletterSubscriber>>>> {
    Ok(ApiResponse::ok(state.db.list_subscribers().await?))
}
