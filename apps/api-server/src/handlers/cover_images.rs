//! Cover image removal handler.
//!
//! Mirrors the asynchronous purge model: the attachment reference is
//! detached synchronously, the bytes are deleted later by the purge worker.
//! Removing an absent attachment is a no-op success, so the action is
//! idempotent from the caller's perspective.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::policy;
use quill_core::ports::{BaseRepository, JobQueue};
use quill_shared::ApiResponse;

use crate::jobs;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::posts::to_response;

/// DELETE /api/posts/{id}/cover_image
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let now = Utc::now();

    let mut post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !policy::can_modify(identity.caller(), &post, state.enforce_ownership) {
        return Err(AppError::Forbidden);
    }

    if let Some(cover) = post.cover_image.take() {
        post.touch();
        post = state.posts.save(post).await?;

        state.jobs.enqueue(jobs::purge_job(&cover.key)).await?;
        tracing::info!(post_id = %post.id, "Cover image removal scheduled");
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        to_response(&post, now),
        "Cover image was successfully removed.",
    )))
}
