// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - external providers.

pub mod payments;

pub use payments::{PaymentIntent, StripeClient};
