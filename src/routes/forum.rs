// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community forum: paginated listing, posting and voting.

use crate::error::{AppError, Result};
use crate::extract::{is_valid_email, parse_id, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::models::{ForumPost, ForumPostSummary, VoteDirection};
use crate::routes::{authenticated, ApiResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use validator::Validate;

/// Posts per listing page.
pub const PAGE_SIZE: u32 = 6;

const MAX_CONCURRENT_LOOKUPS: usize = 6;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let signed_in = Router::new()
        .route("/forum/posts", get(list_posts).post(create_post))
        .route("/forum/posts/{post_id}/vote", post(vote));

    authenticated(signed_in, state)
}

/// Number of pages needed for `total` posts.
pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE as u64)
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<ForumPostSummary>,
    pub total_pages: u64,
}

/// Newest posts first, each joined with its author's display name.
async fn list_posts(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<PostPage>>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("Page must be at least 1".to_string()));
    }

    let total = state.db.count_posts().await?;
    let offset = (page - 1).saturating_mul(PAGE_SIZE);
    let posts = state.db.list_posts_page(offset, PAGE_SIZE).await?;

    let authors: HashSet<String> = posts.iter().map(|p| p.author_email.clone()).collect();
    let db = &state.db;
    let names: HashMap<String, String> = stream::iter(authors)
        .map(|email| async move {
            let user = db.get_user(&email).await?;
            Ok::<_, AppError>(user.map(|u| (email, u.name)))
        })
        .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
        .collect::<Vec<Result<Option<(String, String)>>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let posts = posts
        .into_iter()
        .map(|post| {
            let author_name = names.get(&post.author_email).cloned();
            ForumPostSummary::from_post(post, author_name)
        })
        .collect();

    Ok(ApiResponse::ok(PostPage {
        posts,
        total_pages: total_pages(total),
    }))
}

// ─── Posting ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "All fields are required"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    #[serde(default)]
    pub content: String,
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ForumPost>>)> {
    let post = ForumPost::new(
        uuid::Uuid::new_v4().to_string(),
        req.title,
        req.content,
        caller.email.clone(),
        &now_rfc3339(),
    );

    state.db.create_post(&post).await?;
    tracing::info!(post_id = %post.id, email = %caller.email, "Forum post created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Post created successfully", post),
    ))
}

// ─── Voting ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub email: String,
    pub vote: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
    pub score: i64,
}

/// Cast or change the caller's vote on a post.
///
/// Checks run in a fixed order: post id, email, vote value, then existence.
async fn vote(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(post_id): Path<String>,
    payload: std::result::Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<VoteTally>>> {
    let post_id = parse_id(&post_id, "post ID.")?;
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if !is_valid_email(&req.email) {
        return Err(AppError::BadRequest("Invalid email format.".to_string()));
    }
    let direction = VoteDirection::try_from(req.vote).map_err(AppError::BadRequest)?;

    if req.email != caller.email {
        return Err(AppError::Forbidden(
            "Votes can only be cast as yourself".to_string(),
        ));
    }

    let post = state
        .db
        .cast_vote(&post_id, &req.email, direction)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    Ok(ApiResponse::with_message(
        "Vote updated successfully.",
        VoteTally {
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            score: post.score(),
        },
    ))
}
