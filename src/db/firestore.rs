// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and their activity log
//! - Trainer applications, trainers and their slots
//! - Classes, bookings and payments
//! - Forum posts and votes
//! - Newsletter subscribers

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    ActivityLogEntry, Booking, FitnessClass, ForumPost, NewsletterSubscriber, Payment, Role, Slot,
    Trainer, TrainerApplication, User, VoteDirection,
};
use firestore::errors::FirestoreError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Result row of a server-side count aggregation.
#[derive(Deserialize)]
struct DocCount {
    count: u64,
}

/// Document ID for email-keyed collections.
///
/// Firestore IDs may not contain `/`, so the email is URL-encoded.
pub fn email_doc_id(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic Helpers ─────────────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_doc<T>(&self, collection: &str, id: &str, object: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create a document only if no document with `id` exists.
    ///
    /// Returns `false` if the document already existed.
    async fn insert_doc<T>(&self, collection: &str, id: &str, object: &T) -> Result<bool, AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn list_docs<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count documents with a server-side aggregation query.
    async fn count_docs(&self, collection: &str) -> Result<u64, AppError> {
        let rows: Vec<DocCount> = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .aggregate(|a| a.fields([a.field("count").count()]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.first().map_or(0, |row| row.count))
    }

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete_doc(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let existing: Option<serde_json::Value> = self.get_doc(collection, id).await?;
        if existing.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }

    async fn find_by_field<T>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field(field).eq(value)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by email.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, &email_doc_id(email)).await
    }

    /// Create a user unless one with the same email exists.
    ///
    /// Returns `true` if the user was created.
    pub async fn create_user_if_absent(&self, user: &User) -> Result<bool, AppError> {
        self.insert_doc(collections::USERS, &email_doc_id(&user.email), user)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.list_docs(collections::USERS).await
    }

    /// Set a user's role. Returns the updated user, or `None` if absent.
    pub async fn update_user_role(&self, email: &str, role: Role) -> Result<Option<User>, AppError> {
        self.modify_user(email, &["role"], move |user| user.role = role)
            .await
    }

    /// Update a user's display fields. Returns the updated user, or `None` if absent.
    pub async fn update_user_profile(
        &self,
        email: &str,
        name: Option<String>,
        profile_image: Option<String>,
    ) -> Result<Option<User>, AppError> {
        self.modify_user(email, &["name", "profileImage"], move |user| {
            if let Some(name) = &name {
                user.name = name.clone();
            }
            if profile_image.is_some() {
                user.profile_image = profile_image.clone();
            }
        })
        .await
    }

    /// Read, change and write back a user in one transaction.
    ///
    /// Only `fields` are written, so concurrent updates of other fields
    /// are never overwritten with stale values.
    async fn modify_user<F>(
        &self,
        email: &str,
        fields: &'static [&'static str],
        change: F,
    ) -> Result<Option<User>, AppError>
    where
        F: Fn(&mut User) + Clone + Send + Sync + 'static,
    {
        let doc_id = email_doc_id(email);

        self.get_client()?
            .run_transaction(|db, transaction| {
                let doc_id = doc_id.clone();
                let change = change.clone();
                Box::pin(async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&doc_id)
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(None);
                    };

                    change(&mut user);

                    db.fluent()
                        .update()
                        .fields(fields)
                        .in_col(collections::USERS)
                        .document_id(&doc_id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(Some(user))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("User update transaction failed: {}", e)))
    }

    // ─── Activity Log Operations ─────────────────────────────────

    pub async fn append_activity(&self, entry: &ActivityLogEntry) -> Result<(), AppError> {
        self.set_doc(collections::ACTIVITY_LOG, &entry.id, entry).await
    }

    /// Most recent log entries for a user, newest first.
    pub async fn get_activity_log(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_LOG)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Trainer Application Operations ──────────────────────────

    pub async fn create_application(&self, application: &TrainerApplication) -> Result<(), AppError> {
        self.set_doc(collections::TRAINER_APPLICATIONS, &application.id, application)
            .await
    }

    pub async fn list_applications(&self) -> Result<Vec<TrainerApplication>, AppError> {
        self.list_docs(collections::TRAINER_APPLICATIONS).await
    }

    pub async fn get_application(&self, id: &str) -> Result<Option<TrainerApplication>, AppError> {
        self.get_doc(collections::TRAINER_APPLICATIONS, id).await
    }

    pub async fn delete_application(&self, id: &str) -> Result<bool, AppError> {
        self.delete_doc(collections::TRAINER_APPLICATIONS, id).await
    }

    // ─── Trainer Operations ──────────────────────────────────────

    /// Add a trainer. Returns `false` if the email already has a trainer record.
    pub async fn create_trainer(&self, trainer: &Trainer) -> Result<bool, AppError> {
        self.insert_doc(collections::TRAINERS, &trainer.id, trainer)
            .await
    }

    pub async fn list_trainers(&self) -> Result<Vec<Trainer>, AppError> {
        self.list_docs(collections::TRAINERS).await
    }

    pub async fn get_trainer(&self, id: &str) -> Result<Option<Trainer>, AppError> {
        self.get_doc(collections::TRAINERS, id).await
    }

    /// Look up the trainer record owned by `email`.
    pub async fn get_trainer_by_email(&self, email: &str) -> Result<Option<Trainer>, AppError> {
        self.get_trainer(&Trainer::id_for_email(email)).await
    }

    pub async fn delete_trainer(&self, id: &str) -> Result<bool, AppError> {
        self.delete_doc(collections::TRAINERS, id).await
    }

    /// Atomically append a slot to the trainer owned by `email`.
    ///
    /// Returns `false` if the trainer does not exist.
    pub async fn add_slot(&self, email: &str, slot: &Slot) -> Result<bool, AppError> {
        let Some(trainer) = self.get_trainer_by_email(email).await? else {
            return Ok(false);
        };

        let trainer_id = trainer.id;
        let slot = slot.clone();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let trainer_id = trainer_id.clone();
                let slot = slot.clone();
                Box::pin(async move {
                    let trainer: Option<Trainer> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::TRAINERS)
                        .obj()
                        .one(&trainer_id)
                        .await?;

                    let Some(mut trainer) = trainer else {
                        return Ok(false);
                    };

                    trainer.add_slot(slot);

                    db.fluent()
                        .update()
                        .in_col(collections::TRAINERS)
                        .document_id(&trainer_id)
                        .object(&trainer)
                        .add_to_transaction(transaction)?;

                    Ok(true)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Slot transaction failed: {}", e)))
    }

    /// Atomically remove a slot from the trainer owned by `email`.
    ///
    /// Returns `false` without writing if the trainer or the slot is missing.
    pub async fn remove_slot(&self, email: &str, slot_id: &str) -> Result<bool, AppError> {
        let Some(trainer) = self.get_trainer_by_email(email).await? else {
            return Ok(false);
        };
        if !trainer.has_slot(slot_id) {
            return Ok(false);
        }

        let trainer_id = trainer.id;
        let slot_id = slot_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let trainer_id = trainer_id.clone();
                let slot_id = slot_id.clone();
                Box::pin(async move {
                    let trainer: Option<Trainer> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::TRAINERS)
                        .obj()
                        .one(&trainer_id)
                        .await?;

                    let Some(mut trainer) = trainer else {
                        return Ok(false);
                    };

                    // Another request may have removed it since the pre-check.
                    if trainer.remove_slot(&slot_id).is_none() {
                        return Ok(false);
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::TRAINERS)
                        .document_id(&trainer_id)
                        .object(&trainer)
                        .add_to_transaction(transaction)?;

                    Ok(true)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Slot transaction failed: {}", e)))
    }

    // ─── Class Operations ────────────────────────────────────────

    pub async fn create_class(&self, class: &FitnessClass) -> Result<(), AppError> {
        self.set_doc(collections::CLASSES, &class.id, class).await
    }

    pub async fn list_classes(&self) -> Result<Vec<FitnessClass>, AppError> {
        self.list_docs(collections::CLASSES).await
    }

    pub async fn delete_class(&self, id: &str) -> Result<bool, AppError> {
        self.delete_doc(collections::CLASSES, id).await
    }

    // ─── Booking Operations ──────────────────────────────────────

    pub async fn create_booking(&self, booking: &Booking) -> Result<(), AppError> {
        self.set_doc(collections::BOOKINGS, &booking.id, booking)
            .await
    }

    pub async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AppError> {
        self.get_doc(collections::BOOKINGS, id).await
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>, AppError> {
        self.list_docs(collections::BOOKINGS).await
    }

    pub async fn bookings_for_trainer(&self, trainer_id: &str) -> Result<Vec<Booking>, AppError> {
        self.find_by_field(collections::BOOKINGS, "trainerId", trainer_id)
            .await
    }

    pub async fn bookings_for_member(&self, email: &str) -> Result<Vec<Booking>, AppError> {
        self.find_by_field(collections::BOOKINGS, "userEmail", email)
            .await
    }

    pub async fn delete_booking(&self, id: &str) -> Result<bool, AppError> {
        self.delete_doc(collections::BOOKINGS, id).await
    }

    // ─── Payment Operations ──────────────────────────────────────

    pub async fn create_payment(&self, payment: &Payment) -> Result<(), AppError> {
        self.set_doc(collections::PAYMENTS, &payment.payment_intent_id, payment)
            .await
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, AppError> {
        self.list_docs(collections::PAYMENTS).await
    }

    // ─── Forum Operations ────────────────────────────────────────

    pub async fn create_post(&self, post: &ForumPost) -> Result<(), AppError> {
        self.set_doc(collections::FORUM_POSTS, &post.id, post).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<ForumPost>, AppError> {
        self.get_doc(collections::FORUM_POSTS, id).await
    }

    pub async fn count_posts(&self) -> Result<u64, AppError> {
        self.count_docs(collections::FORUM_POSTS).await
    }

    /// One page of posts, newest first.
    pub async fn list_posts_page(&self, offset: u32, limit: u32) -> Result<Vec<ForumPost>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FORUM_POSTS)
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .offset(offset)
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically replace `email`'s vote on a post.
    ///
    /// The read, reversal of any previous vote and the new vote all happen in
    /// one Firestore transaction, which is retried on contention, so two
    /// concurrent votes cannot lose an update.
    ///
    /// Returns the updated post, or `None` if the post does not exist.
    pub async fn cast_vote(
        &self,
        post_id: &str,
        email: &str,
        direction: VoteDirection,
    ) -> Result<Option<ForumPost>, AppError> {
        let post_id = post_id.to_string();
        let email = email.to_string();

        let updated = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let post_id = post_id.clone();
                let email = email.clone();
                Box::pin(async move {
                    let post: Option<ForumPost> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::FORUM_POSTS)
                        .obj()
                        .one(&post_id)
                        .await?;

                    let Some(mut post) = post else {
                        return Ok(None);
                    };

                    post.cast_vote(&email, direction);

                    db.fluent()
                        .update()
                        .in_col(collections::FORUM_POSTS)
                        .document_id(&post_id)
                        .object(&post)
                        .add_to_transaction(transaction)?;

                    Ok(Some(post))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Vote transaction failed: {}", e)))?;

        if let Some(post) = &updated {
            tracing::info!(
                post_id = %post.id,
                email = %email,
                vote = direction.value(),
                upvotes = post.upvotes,
                downvotes = post.downvotes,
                "Vote recorded"
            );
        }

        Ok(updated)
    }

    // ─── Newsletter Operations ───────────────────────────────────

    /// Add a subscriber. Returns `false` if the email is already subscribed.
    pub async fn subscribe(&self, subscriber: &NewsletterSubscriber) -> Result<bool, AppError> {
        let id = email_doc_id(&subscriber.email);
        let existing: Option<NewsletterSubscriber> =
            self.get_doc(collections::NEWSLETTER_SUBSCRIBERS, &id).await?;
        if existing.is_some() {
            return Ok(false);
        }

        // The insert itself fails on a concurrent duplicate.
        self.insert_doc(collections::NEWSLETTER_SUBSCRIBERS, &id, subscriber)
            .await
    }

    pub async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, AppError> {
        self.list_docs(collections::NEWSLETTER_SUBSCRIBERS).await
    }

    pub async fn count_subscribers(&self) -> Result<u64, AppError> {
        self.count_docs(collections::NEWSLETTER_SUBSCRIBERS).await
    }
}
