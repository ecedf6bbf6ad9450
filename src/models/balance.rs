// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin balance report aggregated from payments and bookings.

use serde::Serialize;
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Booking, Payment};

/// Number of bookings listed as recent transactions.
pub const RECENT_TRANSACTIONS: usize = 10;

/// A booking shown in the "recent transactions" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Transaction {
    pub member_name: Option<String>,
    pub member_email: String,
    pub amount: f64,
    pub date: String,
}

/// Financial overview for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BalanceReport {
    /// Sum of all payment amounts, in minor currency units
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_balance: i64,
    pub recent_transactions: Vec<Transaction>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_subscribers: u64,
    /// Distinct members with at least one booking
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_paid_members: u64,
}

impl BalanceReport {
    /// Build the report from every payment and booking on record.
    pub fn compute(payments: &[Payment], bookings: &[Booking], total_subscribers: u64) -> Self {
        let total_balance = payments.iter().map(|p| p.amount).sum();

        let total_paid_members = bookings
            .iter()
            .map(|b| b.user_email.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;

        let mut recent: Vec<&Booking> = bookings.iter().collect();
        // Stored dates are fixed-width RFC3339, so string order is time order.
        recent.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));

        let recent_transactions = recent
            .into_iter()
            .take(RECENT_TRANSACTIONS)
            .map(|b| Transaction {
                member_name: b.user_name.clone(),
                member_email: b.user_email.clone(),
                amount: b.price,
                date: b.booking_date.clone(),
            })
            .collect();

        Self {
            total_balance,
            recent_transactions,
            total_subscribers,
            total_paid_members,
        }
    }
}
