// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session credential routes: issue a token for a known user, log out.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::config::TOKEN_TTL_DAYS;
use crate::error::{AppError, Result};
use crate::extract::{ValidJson, EMAIL_REGEX};
use crate::middleware::auth::TOKEN_COOKIE;
use crate::routes::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jwt", post(issue_token))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Build the session cookie. Removal must use the same path and flags.
fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Issue a signed session token for an existing user.
///
/// The role is read from the store, never from the request.
async fn issue_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidJson(req): ValidJson<TokenRequest>,
) -> Result<(CookieJar, Json<ApiResponse<TokenResponse>>)> {
    let user = state
        .db
        .get_user(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let token = state.tokens.issue(&user.email, user.role)?;
    tracing::info!(email = %user.email, role = %user.role, "Issued session token");

    let mut cookie = session_cookie(token.clone(), state.config.secure_cookies());
    cookie.set_max_age(time::Duration::days(TOKEN_TTL_DAYS));

    Ok((jar.add(cookie), ApiResponse::ok(TokenResponse { token })))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let jar = jar.remove(session_cookie(String::new(), state.config.secure_cookies()));
    (jar, ApiResponse::message("Logged out"))
}
