// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness Tracker: backend API for a gym and personal-training site
//!
//! This crate provides user and role management, trainer applications,
//! bookable trainer slots, bookings and payments, a community forum with
//! voting, a newsletter, and an admin balance report.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use middleware::TokenCodec;
use services::StripeClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub tokens: TokenCodec,
    pub payments: StripeClient,
}

impl AppState {
    /// Assemble state from configuration and an opened store handle.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let tokens = TokenCodec::new(
            &config.jwt_signing_key,
            chrono::Duration::days(config::TOKEN_TTL_DAYS),
        );
        let payments = StripeClient::new(&config.stripe_api_base, config.stripe_secret_key.clone());

        Self {
            config,
            db,
            tokens,
            payments,
        }
    }
}
