// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod balance;
pub mod booking;
pub mod forum;
pub mod trainer;
pub mod user;

pub use balance::BalanceReport;
pub use booking::{Booking, BookingWithTrainer, FitnessClass, NewsletterSubscriber, Payment};
pub use forum::{ForumPost, ForumPostSummary, VoteDirection, Voter};
pub use trainer::{ApplicationStatus, Slot, Trainer, TrainerApplication};
pub use user::{ActivityLogEntry, Role, User};
