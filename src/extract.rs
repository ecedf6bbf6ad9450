// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors and shared input checks.

use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

/// Loose email shape: something, `@`, something, `.`, something.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Reject identifiers that are not UUIDs before touching the store.
pub fn parse_id(id: &str, what: &str) -> Result<String, AppError> {
    uuid::Uuid::parse_str(id)
        .map(|u| u.to_string())
        .map_err(|_| AppError::BadRequest(format!("Invalid {}", what)))
}

/// Validator for major-unit prices and amounts.
///
/// The validator derive hands `Copy` fields over by value.
pub fn positive_amount(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount")
            .with_message("Amount must be a positive number".into()))
    }
}

/// Validator for lists that must have at least one non-blank entry.
pub fn non_empty_list(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| !v.trim().is_empty()) {
        Ok(())
    } else {
        Err(ValidationError::new("non_empty_list")
            .with_message("At least one value is required".into()))
    }
}

/// JSON body that has been deserialized and validated.
///
/// Both malformed JSON and failed validation become `400` envelopes.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}
