// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer applications, the trainer directory, slots and trainer-side
//! booking management.

use crate::error::{AppError, Result};
use crate::extract::{non_empty_list, parse_id, ValidJson, EMAIL_REGEX};
use crate::middleware::auth::AuthUser;
use crate::middleware::role::require_self;
use crate::middleware::{require_admin, require_trainer};
use crate::models::{ApplicationStatus, Booking, Slot, Trainer, TrainerApplication};
use crate::routes::{authenticated, ApiResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/applytrainer", post(apply))
        .route("/trainers", get(list_trainers))
        .route("/trainers/{id}", get(get_trainer));

    let admin = Router::new()
        .route("/applytrainer", get(list_applications))
        .route(
            "/applytrainer/{id}",
            get(get_application).delete(delete_application),
        )
        .route("/trainers", post(create_trainer))
        .route("/trainers/{id}", delete(delete_trainer))
        .route_layer(middleware::from_fn(require_admin));

    let trainer = Router::new()
        .route("/trainer/slots", post(create_slot))
        .route("/slots/trainer/{email}", get(list_own_slots))
        .route("/slots/{slot_id}", delete(delete_slot))
        .route("/trainer/booking", get(list_own_bookings))
        .route("/trainer/booking/{id}", delete(cancel_booking))
        .route_layer(middleware::from_fn(require_trainer));

    public
        .merge(authenticated(admin, state))
        .merge(authenticated(trainer, state))
}

fn trainer_not_found() -> AppError {
    AppError::NotFound("Trainer not found".to_string())
}

/// The caller's own trainer record.
async fn own_trainer(state: &AppState, caller: &AuthUser) -> Result<Trainer> {
    state
        .db
        .get_trainer_by_email(&caller.email)
        .await?
        .ok_or_else(trainer_not_found)
}

// ─── Applications ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 16, max = 120, message = "Age is out of range"))]
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub available_days: Vec<String>,
    #[serde(default)]
    pub available_time: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

async fn apply(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<ApplyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TrainerApplication>>)> {
    let application = TrainerApplication {
        id: uuid::Uuid::new_v4().to_string(),
        email: req.email,
        name: req.name,
        age: req.age,
        profile_image: req.profile_image,
        skills: req.skills,
        available_days: req.available_days,
        available_time: req.available_time,
        experience: req.experience,
        status: ApplicationStatus::Pending,
        applied_at: now_rfc3339(),
    };

    state.db.create_application(&application).await?;
    tracing::info!(
        application_id = %application.id,
        email = %application.email,
        "Trainer application submitted"
    );

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Application submitted successfully!", application),
    ))
}

async fn list_applications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TrainerApplication>>>> {
    Ok(ApiResponse::ok(state.db.list_applications().await?))
}

async fn get_application(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TrainerApplication>>> {
    let id = parse_id(&id, "ID format")?;
    let application = state
        .db
        .get_application(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    Ok(ApiResponse::ok(application))
}

async fn delete_application(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let id = parse_id(&id, "ID format")?;
    if !state.db.delete_application(&id).await? {
        return Err(AppError::NotFound("Application not found".to_string()));
    }
    Ok(ApiResponse::message(
        "Trainer application deleted successfully",
    ))
}

// ─── Directory ───────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainerRequest {
    #[validate(regex(path = *EMAIL_REGEX, message = "Trainer email is required"))]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

async fn create_trainer(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateTrainerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Trainer>>)> {
    let trainer = Trainer {
        id: Trainer::id_for_email(&req.email),
        email: req.email,
        name: req.name,
        profile_image: req.profile_image,
        experience: req.experience,
        skills: req.skills,
        available_slots: Vec::new(),
    };

    if !state.db.create_trainer(&trainer).await? {
        return Err(AppError::BadRequest(
            "Trainer with this email already exists".to_string(),
        ));
    }
    tracing::info!(trainer_id = %trainer.id, email = %trainer.email, "Trainer added");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Trainer added successfully", trainer),
    ))
}

async fn list_trainers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Trainer>>>> {
    Ok(ApiResponse::ok(state.db.list_trainers().await?))
}

async fn get_trainer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Trainer>>> {
    let id = parse_id(&id, "ID format")?;
    let trainer = state
        .db
        .get_trainer(&id)
        .await?
        .ok_or_else(trainer_not_found)?;
    Ok(ApiResponse::ok(trainer))
}

async fn delete_trainer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let id = parse_id(&id, "ID format")?;
    if !state.db.delete_trainer(&id).await? {
        return Err(trainer_not_found());
    }
    tracing::info!(trainer_id = %id, "Trainer deleted");
    Ok(ApiResponse::message("Trainer deleted successfully"))
}

// ─── Slots ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    #[validate(length(min = 1, message = "All fields are required"))]
    #[serde(default)]
    pub slot_name: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    #[serde(default)]
    pub slot_time: String,
    #[validate(custom(function = "non_empty_list", message = "All fields are required"))]
    #[serde(default)]
    pub days: Vec<String>,
}

/// Append a new slot to the caller's trainer record.
async fn create_slot(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreateSlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Slot>>)> {
    let slot = Slot {
        slot_id: uuid::Uuid::new_v4().to_string(),
        slot_name: req.slot_name,
        slot_time: req.slot_time,
        days_available: req.days,
        is_booked: false,
    };

    if !state.db.add_slot(&caller.email, &slot).await? {
        return Err(trainer_not_found());
    }

    tracing::info!(email = %caller.email, slot_id = %slot.slot_id, "Slot created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Slot created successfully", slot),
    ))
}

async fn list_own_slots(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<Vec<Slot>>>> {
    require_self(&caller, &email)?;
    let trainer = own_trainer(&state, &caller).await?;
    Ok(ApiResponse::ok(trainer.available_slots))
}

/// Remove one of the caller's slots. Nothing changes if it does not exist.
async fn delete_slot(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(slot_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let slot_id = parse_id(&slot_id, "slotId")?;

    if !state.db.remove_slot(&caller.email, &slot_id).await? {
        return Err(AppError::NotFound("Trainer or Slot not found".to_string()));
    }

    tracing::info!(email = %caller.email, slot_id = %slot_id, "Slot deleted");
    Ok(ApiResponse::message("Slot deleted successfully"))
}

// ─── Bookings on own slots ───────────────────────────────────

async fn list_own_bookings(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<Booking>>>> {
    let trainer = own_trainer(&state, &caller).await?;
    Ok(ApiResponse::ok(
        state.db.bookings_for_trainer(&trainer.id).await?,
    ))
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let id = parse_id(&id, "ID format")?;
    let trainer = own_trainer(&state, &caller).await?;

    let booking = state
        .db
        .get_booking(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.trainer_id != trainer.id {
        return Err(AppError::Forbidden(
            "Booking belongs to another trainer".to_string(),
        ));
    }

    state.db.delete_booking(&id).await?;
    tracing::info!(booking_id = %id, trainer_id = %trainer.id, "Booking cancelled");
    Ok(ApiResponse::message("Booking cancelled successfully"))
}
