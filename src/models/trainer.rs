// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer directory, trainer applications and bookable slots.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Status of a trainer application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ApplicationStatus {
    #[default]
    Pending,
}

/// Application submitted by someone who wants to become a trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrainerApplication {
    /// Application ID (also used as document ID)
    pub id: String,
    pub email: String,
    pub name: String,
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
    #[serde(default)]
    pub status: ApplicationStatus,
    pub applied_at: String,
}

/// A bookable time unit defined by a trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Slot {
    /// Opaque unique identifier (UUID v4)
    pub slot_id: String,
    pub slot_name: String,
    pub slot_time: String,
    #[serde(default)]
    pub days_available: Vec<String>,
    #[serde(default)]
    pub is_booked: bool,
}

/// Trainer profile in the public directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Trainer {
    /// Trainer ID (also used as document ID), derived from the email
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Slots in the order they were created
    #[serde(default)]
    pub available_slots: Vec<Slot>,
}

impl Trainer {
    /// Document ID of the trainer record owned by `email`.
    ///
    /// One trainer record per email: a second insert for the same email
    /// targets the same document and is rejected by the store.
    pub fn id_for_email(email: &str) -> String {
        uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_URL, format!("mailto:{}", email).as_bytes())
            .to_string()
    }

    /// Append a slot to the end of the slot sequence.
    pub fn add_slot(&mut self, slot: Slot) {
        self.available_slots.push(slot);
    }

    /// Remove the slot with `slot_id`. Returns the removed slot, if it existed.
    pub fn remove_slot(&mut self, slot_id: &str) -> Option<Slot> {
        let index = self
            .available_slots
            .iter()
            .position(|s| s.slot_id == slot_id)?;
        Some(self.available_slots.remove(index))
    }

    pub fn has_slot(&self, slot_id: &str) -> bool {
        self.available_slots.iter().any(|s| s.slot_id == slot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str) -> Slot {
        Slot {
            slot_id: id.to_string(),
            slot_name: "Morning".to_string(),
            slot_time: "07:00".to_string(),
            days_available: vec!["Mon".to_string()],
            is_booked: false,
        }
    }

    fn trainer() -> Trainer {
        Trainer {
            id: "t1".to_string(),
            email: "coach@example.com".to_string(),
            name: "Coach".to_string(),
            profile_image: None,
            experience: None,
            skills: vec![],
            available_slots: vec![],
        }
    }

    #[test]
    fn test_slots_keep_insertion_order() {
        let mut t = trainer();
        t.add_slot(slot("a"));
        t.add_slot(slot("b"));
        t.add_slot(slot("c"));

        let removed = t.remove_slot("b");

        assert_eq!(removed.map(|s| s.slot_id), Some("b".to_string()));
        let ids: Vec<&str> = t.available_slots.iter().map(|s| s.slot_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_remove_missing_slot_leaves_sequence_untouched() {
        let mut t = trainer();
        t.add_slot(slot("a"));

        assert!(t.remove_slot("zzz").is_none());
        assert_eq!(t.available_slots, vec![slot("a")]);
        assert!(t.has_slot("a"));
    }

    #[test]
    fn test_trainer_id_is_stable_per_email() {
        let id = Trainer::id_for_email("coach@example.com");

        assert_eq!(id, Trainer::id_for_email("coach@example.com"));
        assert_ne!(id, Trainer::id_for_email("other@example.com"));
        // Trainer ids must pass the same UUID check as path parameters.
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
