// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-based authorization gate.
//!
//! Roles match exactly; there is no hierarchy, so an admin does not pass a
//! trainer-only gate. These layers must sit inside `require_auth`.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::Role;
use axum::{extract::Request, middleware::Next, response::Response};

/// Check that a verified identity holds exactly `required`.
pub fn authorize(user: Option<&AuthUser>, required: Role) -> Result<(), AppError> {
    let user = user.ok_or(AppError::Unauthorized)?;

    if user.role == required {
        Ok(())
    } else {
        tracing::warn!(
            email = %user.email,
            role = %user.role,
            required = %required,
            "Role gate denied request"
        );
        Err(AppError::Forbidden(format!(
            "Forbidden. {} role required.",
            required_label(required)
        )))
    }
}

fn required_label(role: Role) -> &'static str {
    match role {
        Role::Member => "Member",
        Role::Trainer => "Trainer",
        Role::Admin => "Admin",
    }
}

async fn gate(required: Role, request: Request, next: Next) -> Result<Response, AppError> {
    authorize(request.extensions().get::<AuthUser>(), required)?;
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    gate(Role::Admin, request, next).await
}

pub async fn require_trainer(request: Request, next: Next) -> Result<Response, AppError> {
    gate(Role::Trainer, request, next).await
}

pub async fn require_member(request: Request, next: Next) -> Result<Response, AppError> {
    gate(Role::Member, request, next).await
}

/// Self-only check: the caller must be the owner of `email`.
pub fn require_self(user: &AuthUser, email: &str) -> Result<(), AppError> {
    if user.email == email {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden".to_string()))
    }
}
