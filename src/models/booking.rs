// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bookings, payments and the class catalog.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Trainer;

/// A member's booking of a trainer slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Booking {
    /// Booking ID (also used as document ID)
    pub id: String,
    pub trainer_id: String,
    pub slot_id: String,
    pub package_name: String,
    /// Package price in major currency units
    pub price: f64,
    pub user_email: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub booking_date: String,
}

/// Booking joined with the booked trainer, for the member dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BookingWithTrainer {
    #[serde(flatten)]
    pub booking: Booking,
    pub trainer: Option<Trainer>,
}

/// Payment record created alongside a provider payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Provider payment intent ID (also used as document ID)
    pub payment_intent_id: String,
    /// Amount in minor currency units (cents)
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    pub created_at: String,
}

/// Entry in the class catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FitnessClass {
    /// Class ID (also used as document ID)
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

/// Newsletter subscriber, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewsletterSubscriber {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub subscribed_at: String,
}
