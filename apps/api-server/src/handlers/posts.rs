//! Post handlers - the authoring surface and the public reading surface.
//!
//! Every request snapshots `now` exactly once; the same instant drives the
//! visibility filter, any lifecycle rendering, and pagination. Two requests
//! may disagree about a post sitting on the publish boundary, but a single
//! request never disagrees with itself.

use actix_web::{HttpResponse, http::header, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::{CoverImage, Lifecycle, Post};
use quill_core::pagination;
use quill_core::policy;
use quill_core::ports::{AttachmentStore, BaseRepository, JobQueue, PostRepository};
use quill_shared::dto::{CoverImageResponse, CoverImageUpload, CreatePostRequest, PageMeta,
    PagedResponse, PostResponse, UpdatePostRequest};
use quill_shared::response::RedirectNotice;

use crate::jobs;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult, DEFAULT_VIEW};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
}

pub(crate) fn to_response(post: &Post, now: DateTime<Utc>) -> PostResponse {
    let lifecycle = match post.lifecycle(now) {
        Lifecycle::Draft => "draft",
        Lifecycle::Published => "published",
        Lifecycle::Scheduled => "scheduled",
    };

    PostResponse {
        id: post.id,
        title: post.title.clone(),
        body: post.body.clone(),
        published_at: post.published_at,
        lifecycle: lifecycle.to_string(),
        author_id: post.author_id,
        cover_image: post.cover_image.as_ref().map(|image| CoverImageResponse {
            filename: image.filename.clone(),
            content_type: image.content_type.clone(),
        }),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

/// Decode and persist an uploaded cover image, returning the attachment
/// metadata to hang off the post.
async fn store_cover_image(
    state: &AppState,
    upload: CoverImageUpload,
) -> Result<CoverImage, AppError> {
    let bytes = BASE64
        .decode(upload.data.as_bytes())
        .map_err(|_| AppError::BadRequest("cover_image.data is not valid base64".to_string()))?;

    let key = state.attachments.put(bytes).await?;

    Ok(CoverImage {
        key,
        filename: upload.filename,
        content_type: upload.content_type,
    })
}

/// Schedule deletion of a detached attachment's bytes. Fire-and-forget:
/// the reference is already gone, so a failed enqueue only leaks a blob.
async fn schedule_purge(state: &AppState, key: &str) {
    if let Err(e) = state.jobs.enqueue(jobs::purge_job(key)).await {
        tracing::warn!(error = %e, %key, "Failed to schedule cover image purge");
    }
}

/// GET /api/posts?page=N
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let now = Utc::now();
    let filter = policy::visibility_filter(identity.caller());

    let posts = state.posts.list_sorted(filter, now).await?;
    let page = pagination::paginate(posts, query.page.unwrap_or(1), state.page_size)?;

    let items: Vec<PostResponse> = page.items.iter().map(|p| to_response(p, now)).collect();
    Ok(HttpResponse::Ok().json(PagedResponse {
        items,
        meta: PageMeta {
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        },
    }))
}

/// GET /api/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let now = Utc::now();
    let filter = policy::visibility_filter(identity.caller());

    let post = state
        .posts
        .find_filtered(*path, filter, now)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(HttpResponse::Ok().json(to_response(&post, now)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let now = Utc::now();
    let req = body.into_inner();

    let mut post = Post::new(req.title, req.body, req.published_at, Some(identity.user_id));

    if let Err(e) = post.validate() {
        let submitted = serde_json::json!({
            "title": post.title,
            "body": post.body,
            "published_at": post.published_at,
        });
        return Err(AppError::validation(e, submitted));
    }

    if let Some(upload) = req.cover_image {
        post.cover_image = Some(store_cover_image(&state, upload).await?);
    }

    let saved = state.posts.save(post).await?;
    tracing::info!(post_id = %saved.id, "Post created");

    Ok(HttpResponse::Created().json(to_response(&saved, now)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let now = Utc::now();
    let req = body.into_inner();

    let mut post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(post_not_found)?;

    if !policy::can_modify(identity.caller(), &post, state.enforce_ownership) {
        return Err(AppError::Forbidden);
    }

    if let Some(title) = req.title {
        post.title = title;
    }
    if let Some(body) = req.body {
        post.body = body;
    }
    if let Some(published_at) = req.published_at {
        // May move the post between draft/scheduled/published in either
        // direction, including retroactively.
        post.published_at = published_at;
    }

    if let Err(e) = post.validate() {
        let submitted = serde_json::json!({
            "title": post.title,
            "body": post.body,
            "published_at": post.published_at,
        });
        return Err(AppError::validation(e, submitted));
    }

    if let Some(upload) = req.cover_image {
        if let Some(old) = post.cover_image.take() {
            schedule_purge(&state, &old.key).await;
        }
        post.cover_image = Some(store_cover_image(&state, upload).await?);
    }

    post.touch();
    let saved = state.posts.save(post).await?;

    Ok(HttpResponse::Ok().json(to_response(&saved, now)))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(post_not_found)?;

    if !policy::can_modify(identity.caller(), &post, state.enforce_ownership) {
        return Err(AppError::Forbidden);
    }

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    if let Some(cover) = post.cover_image {
        schedule_purge(&state, &cover.key).await;
    }

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, DEFAULT_VIEW))
        .json(RedirectNotice::new(
            "Post was successfully deleted",
            DEFAULT_VIEW,
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::TimeDelta;
    use std::sync::Arc;

    use quill_core::ports::TokenService;
    use quill_infra::{JwtConfig, JwtTokenService};

    fn token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }))
    }

    fn bearer(tokens: &Arc<dyn TokenService>) -> String {
        let token = tokens
            .generate_token(Uuid::new_v4(), "author@example.com")
            .unwrap();
        format!("Bearer {token}")
    }

    async fn seed(state: &AppState, published_at: Option<DateTime<Utc>>) -> Post {
        let post = Post::new("Seeded".into(), "Body".into(), published_at, None);
        state.posts.save(post).await.unwrap()
    }

    macro_rules! init_app {
        ($state:expr, $tokens:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .app_data(web::Data::new($tokens.clone()))
                    .configure(crate::handlers::configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn anonymous_index_hides_unpublished_posts() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let now = Utc::now();

        seed(&state, None).await;
        seed(&state, Some(now + TimeDelta::hours(1))).await;
        let published = seed(&state, Some(now - TimeDelta::hours(1))).await;

        let app = init_app!(state, tokens);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PagedResponse<PostResponse> = test::read_body_json(resp).await;
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].id, published.id);
    }

    #[actix_web::test]
    async fn authenticated_index_lists_everything_drafts_first() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let now = Utc::now();

        let published = seed(&state, Some(now - TimeDelta::hours(1))).await;
        let draft = seed(&state, None).await;
        let scheduled = seed(&state, Some(now + TimeDelta::hours(1))).await;

        let app = init_app!(state, tokens);

        let req = test::TestRequest::get()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, bearer(&tokens)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PagedResponse<PostResponse> = test::read_body_json(resp).await;
        let ids: Vec<Uuid> = body.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![draft.id, scheduled.id, published.id]);
    }

    #[actix_web::test]
    async fn pagination_slices_and_signals_overflow() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let now = Utc::now();

        for i in 0..12 {
            seed(&state, Some(now - TimeDelta::minutes(i + 1))).await;
        }

        let app = init_app!(state, tokens);

        let first: PagedResponse<PostResponse> = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get().uri("/api/posts?page=1").to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.meta.total_pages, 3);
        assert_eq!(first.meta.total_items, 12);

        let last: PagedResponse<PostResponse> = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get().uri("/api/posts?page=3").to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(last.items.len(), 2);

        let overflow = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/posts?page=4").to_request(),
        )
        .await;
        assert_eq!(overflow.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            overflow.headers().get(header::LOCATION).unwrap(),
            DEFAULT_VIEW
        );
        let notice: RedirectNotice = test::read_body_json(overflow).await;
        assert_eq!(notice.notice, "No more posts available");
    }

    #[actix_web::test]
    async fn anonymous_show_of_draft_is_indistinguishable_from_missing_id() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();

        let draft = seed(&state, None).await;

        let app = init_app!(state, tokens);

        let draft_resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/posts/{}", draft.id))
                .to_request(),
        )
        .await;
        let missing_resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/posts/{}", Uuid::new_v4()))
                .to_request(),
        )
        .await;

        assert_eq!(draft_resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(missing_resp.status(), StatusCode::SEE_OTHER);

        let draft_location = draft_resp.headers().get(header::LOCATION).cloned();
        let missing_location = missing_resp.headers().get(header::LOCATION).cloned();
        assert_eq!(draft_location, missing_location);

        let draft_body: RedirectNotice = test::read_body_json(draft_resp).await;
        let missing_body: RedirectNotice = test::read_body_json(missing_resp).await;
        assert_eq!(draft_body.notice, missing_body.notice);
        assert_eq!(draft_body.location, missing_body.location);
    }

    #[actix_web::test]
    async fn authenticated_show_ignores_visibility() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let now = Utc::now();

        let draft = seed(&state, None).await;
        let scheduled = seed(&state, Some(now + TimeDelta::hours(1))).await;

        let app = init_app!(state, tokens);

        for id in [draft.id, scheduled.id] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/posts/{id}"))
                .insert_header((header::AUTHORIZATION, bearer(&tokens)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        // A genuinely missing id is still not found.
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", Uuid::new_v4()))
            .insert_header((header::AUTHORIZATION, bearer(&tokens)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn create_requires_authentication() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let app = init_app!(state, tokens);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(serde_json::json!({"title": "A", "body": "B"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_with_blank_fields_persists_nothing() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let app = init_app!(state, tokens);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, bearer(&tokens)))
            .set_json(serde_json::json!({"title": "", "body": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["title", "body"]);
        // Submitted values are echoed back for the client to re-present.
        assert_eq!(body["submitted"]["title"], "");

        let stored = state.posts.list_sorted(None, Utc::now()).await.unwrap();
        assert!(stored.is_empty());
    }

    #[actix_web::test]
    async fn draft_then_publish_flow() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let app = init_app!(state, tokens);
        let auth = bearer(&tokens);

        // Create a draft.
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .set_json(serde_json::json!({"title": "A", "body": "B"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: PostResponse = test::read_body_json(resp).await;
        assert_eq!(created.lifecycle, "draft");

        // Visible to the authenticated list, absent from the anonymous one.
        let authed: PagedResponse<PostResponse> = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/api/posts")
                    .insert_header((header::AUTHORIZATION, auth.clone()))
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(authed.items.len(), 1);

        let anon: PagedResponse<PostResponse> = test::read_body_json(
            test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request())
                .await,
        )
        .await;
        assert!(anon.items.is_empty());

        // Publish retroactively.
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header((header::AUTHORIZATION, auth))
            .set_json(serde_json::json!({"published_at": Utc::now() - TimeDelta::hours(1)}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: PostResponse = test::read_body_json(resp).await;
        assert_eq!(updated.lifecycle, "published");

        // Now on the anonymous list and readable anonymously.
        let anon: PagedResponse<PostResponse> = test::read_body_json(
            test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request())
                .await,
        )
        .await;
        assert_eq!(anon.items.len(), 1);
        assert_eq!(anon.items[0].id, created.id);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/posts/{}", created.id))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn clearing_published_at_returns_post_to_draft() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();
        let now = Utc::now();

        let published = seed(&state, Some(now - TimeDelta::hours(1))).await;

        let app = init_app!(state, tokens);

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", published.id))
            .insert_header((header::AUTHORIZATION, bearer(&tokens)))
            .set_json(serde_json::json!({"published_at": null}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let updated: PostResponse = test::read_body_json(resp).await;
        assert_eq!(updated.lifecycle, "draft");
        assert!(updated.published_at.is_none());
    }

    #[actix_web::test]
    async fn destroy_redirects_to_the_listing() {
        let state = AppState::in_memory(5, false);
        let tokens = token_service();

        let post = seed(&state, None).await;

        let app = init_app!(state, tokens);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header((header::AUTHORIZATION, bearer(&tokens)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        assert!(state.posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn ownership_enforcement_rejects_other_authors() {
        let state = AppState::in_memory(5, true);
        let tokens = token_service();

        let author = Uuid::new_v4();
        let post = state
            .posts
            .save(Post::new("Mine".into(), "Body".into(), None, Some(author)))
            .await
            .unwrap();

        let app = init_app!(state, tokens);

        // A different authenticated user.
        let token = tokens
            .generate_token(Uuid::new_v4(), "stranger@example.com")
            .unwrap();
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // The author still may.
        let token = tokens.generate_token(author, "author@example.com").unwrap();
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
}
