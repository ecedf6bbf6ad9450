// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payments, member bookings and the admin balance report.

use crate::error::{AppError, Result};
use crate::extract::{positive_amount, ValidJson, EMAIL_REGEX};
use crate::middleware::auth::AuthUser;
use crate::middleware::role::require_self;
use crate::middleware::{require_admin, require_member};
use crate::models::{BalanceReport, Booking, BookingWithTrainer, Payment};
use crate::routes::users::record_activity;
use crate::routes::{authenticated, ApiResponse};
use crate::services::payments::to_minor_units;
use crate::time_utils::{normalize_rfc3339, now_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const MAX_CONCURRENT_LOOKUPS: usize = 6;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/trainer/booking", post(create_booking));

    let member = Router::new()
        .route("/bookings/member/{email}", get(member_bookings))
        .route_layer(middleware::from_fn(require_member));

    let admin = Router::new()
        .route("/admin/balance", get(balance))
        .route_layer(middleware::from_fn(require_admin));

    public
        .merge(authenticated(member, state))
        .merge(authenticated(admin, state))
}

// ─── Payment Intents ─────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Amount in major currency units
    #[validate(custom(function = "positive_amount"))]
    pub amount: f64,
    #[serde(default)]
    pub booking_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Create a card payment intent with the provider and record it.
async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<PaymentIntentRequest>,
) -> Result<Json<ApiResponse<PaymentIntentResponse>>> {
    let amount_cents = to_minor_units(req.amount)
        .ok_or_else(|| AppError::BadRequest("Amount must be at least one cent".to_string()))?;

    let intent = state.payments.create_payment_intent(amount_cents).await?;
    let client_secret = intent.client_secret.clone().ok_or_else(|| {
        AppError::PaymentProvider(format!("Intent {} has no client secret", intent.id))
    })?;

    let payment = Payment {
        payment_intent_id: intent.id.clone(),
        amount: intent.amount,
        currency: intent.currency,
        status: intent.status,
        booking_id: req.booking_id,
        created_at: now_rfc3339(),
    };
    state.db.create_payment(&payment).await?;

    Ok(ApiResponse::ok(PaymentIntentResponse {
        client_secret,
        payment_intent_id: intent.id,
    }))
}

// ─── Bookings ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "trainerId is required"))]
    #[serde(default)]
    pub trainer_id: String,
    #[validate(length(min = 1, message = "slotId is required"))]
    #[serde(default)]
    pub slot_id: String,
    #[validate(length(min = 1, message = "packageName is required"))]
    #[serde(default)]
    pub package_name: String,
    #[validate(custom(function = "positive_amount", message = "price must be a positive number"))]
    pub price: f64,
    #[validate(regex(path = *EMAIL_REGEX, message = "userEmail must be a valid email"))]
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub inserted_id: String,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreated>>)> {
    let booking_date = match req.booking_date.as_deref() {
        Some(raw) => normalize_rfc3339(raw).ok_or_else(|| {
            AppError::BadRequest("bookingDate must be an RFC3339 timestamp".to_string())
        })?,
        None => now_rfc3339(),
    };

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        trainer_id: req.trainer_id,
        slot_id: req.slot_id,
        package_name: req.package_name,
        price: req.price,
        user_email: req.user_email,
        user_name: req.user_name,
        payment_id: req.payment_id,
        booking_date,
    };

    state.db.create_booking(&booking).await?;
    tracing::info!(
        booking_id = %booking.id,
        trainer_id = %booking.trainer_id,
        email = %booking.user_email,
        "Booking created"
    );

    record_activity(
        &state.db,
        &booking.user_email,
        &format!("Booked the {} package.", booking.package_name),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Booking saved",
            BookingCreated {
                inserted_id: booking.id,
            },
        ),
    ))
}

/// The caller's bookings, each joined with its trainer.
async fn member_bookings(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<Vec<BookingWithTrainer>>>> {
    require_self(&caller, &email)?;

    let bookings = state.db.bookings_for_member(&email).await?;
    let db = &state.db;

    // `buffered` keeps the store's order.
    let joined = stream::iter(bookings)
        .map(|booking| async move {
            let trainer = db.get_trainer(&booking.trainer_id).await?;
            Ok::<_, AppError>(BookingWithTrainer { booking, trainer })
        })
        .buffered(MAX_CONCURRENT_LOOKUPS)
        .collect::<Vec<Result<BookingWithTrainer>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    Ok(ApiResponse::ok(joined))
}

// ─── Admin Balance ───────────────────────────────────────────

async fn balance(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<BalanceReport>>> {
    let (payments, bookings, total_subscribers) = tokio::try_join!(
        state.db.list_payments(),
        state.db.list_bookings(),
        state.db.count_subscribers(),
    )?;

    Ok(ApiResponse::ok(BalanceReport::compute(
        &payments,
        &bookings,
        total_subscribers,
    )))
}
