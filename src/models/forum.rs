// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Forum post model and its vote ledger.
//!
//! Each post keeps one active vote per voter email together with running
//! up/down counters. The net score is derived from the counters.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Direction of a single vote. Stored and sent as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl From<VoteDirection> for i64 {
    fn from(direction: VoteDirection) -> Self {
        direction.value()
    }
}

impl TryFrom<i64> for VoteDirection {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteDirection::Up),
            -1 => Ok(VoteDirection::Down),
            _ => Err("Invalid vote value. Must be 1 or -1.".to_string()),
        }
    }
}

/// One active vote on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub email: String,
    pub vote: VoteDirection,
}

/// Forum post stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    /// Post ID (also used as document ID)
    pub id: String,
    pub title: String,
    pub content: String,
    /// Email of the author
    pub author_email: String,
    pub created_at: String,
    /// Number of active up votes
    #[serde(default)]
    pub upvotes: i64,
    /// Number of active down votes
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub voters: Vec<Voter>,
}

impl ForumPost {
    pub fn new(id: String, title: String, content: String, author_email: String, now: &str) -> Self {
        Self {
            id,
            title,
            content,
            author_email,
            created_at: now.to_string(),
            upvotes: 0,
            downvotes: 0,
            voters: Vec::new(),
        }
    }

    /// Net score: active up votes minus active down votes.
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }

    /// Record `direction` as the only active vote of `email`.
    ///
    /// Any existing vote by the same voter is reversed first, so re-voting in
    /// the same direction leaves the counters unchanged.
    pub fn cast_vote(&mut self, email: &str, direction: VoteDirection) {
        if let Some(previous) = self.remove_vote(email) {
            tracing::debug!(
                post_id = %self.id,
                email,
                previous = previous.value(),
                "Reversing previous vote"
            );
        }

        self.voters.push(Voter {
            email: email.to_string(),
            vote: direction,
        });
        self.count(direction);
    }

    /// Remove the active vote of `email`, undoing its counter contribution.
    pub fn remove_vote(&mut self, email: &str) -> Option<VoteDirection> {
        let mut removed = None;
        self.voters.retain(|v| {
            if v.email == email {
                // A well-formed post has at most one entry; undo every one found.
                removed.get_or_insert(v.vote);
                false
            } else {
                true
            }
        });

        if removed.is_some() {
            self.recount();
        }
        removed
    }

    fn count(&mut self, direction: VoteDirection) {
        match direction {
            VoteDirection::Up => self.upvotes += 1,
            VoteDirection::Down => self.downvotes += 1,
        }
    }

    /// Recompute counters from the voter list.
    fn recount(&mut self) {
        self.upvotes = 0;
        self.downvotes = 0;
        let votes: Vec<VoteDirection> = self.voters.iter().map(|v| v.vote).collect();
        for vote in votes {
            self.count(vote);
        }
    }
}

/// Forum post as returned by the paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ForumPostSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub author: String,
    pub author_name: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub upvotes: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub downvotes: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub score: i64,
}

impl ForumPostSummary {
    pub fn from_post(post: ForumPost, author_name: Option<String>) -> Self {
        let score = post.score();
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            author: post.author_email,
            author_name,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            score,
        }
    }
}
