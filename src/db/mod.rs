// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Users keyed by URL-encoded email
    pub const USERS: &str = "users";
    pub const TRAINER_APPLICATIONS: &str = "trainer_applications";
    pub const TRAINERS: &str = "trainers";
    pub const CLASSES: &str = "classes";
    pub const BOOKINGS: &str = "bookings";
    /// Payments keyed by provider payment intent ID
    pub const PAYMENTS: &str = "payments";
    pub const FORUM_POSTS: &str = "forum_posts";
    /// Newsletter subscribers keyed by URL-encoded email
    pub const NEWSLETTER_SUBSCRIBERS: &str = "newsletter_subscribers";
    pub const ACTIVITY_LOG: &str = "activity_log";
}
