//! Legacy blog post handlers.
//!
//! The older resource has no lifecycle and no visibility rules: everyone
//! sees every blog post, and only the mutations require authentication.

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use quill_core::domain::BlogPost;
use quill_core::ports::{BaseRepository, BlogPostRepository};
use quill_shared::dto::{BlogPostResponse, CreateBlogPostRequest, UpdateBlogPostRequest};
use quill_shared::response::RedirectNotice;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult, DEFAULT_VIEW};
use crate::state::AppState;

fn to_response(post: &BlogPost) -> BlogPostResponse {
    BlogPostResponse {
        id: post.id,
        title: post.title.clone(),
        body: post.body.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn blog_post_not_found() -> AppError {
    AppError::NotFound("Blog post not found".to_string())
}

/// GET /api/blog_posts
pub async fn index(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.blog_posts.list_all().await?;
    let items: Vec<BlogPostResponse> = posts.iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/blog_posts/{id}
pub async fn show(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state
        .blog_posts
        .find_by_id(*path)
        .await?
        .ok_or_else(blog_post_not_found)?;

    Ok(HttpResponse::Ok().json(to_response(&post)))
}

/// POST /api/blog_posts
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateBlogPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = BlogPost::new(req.title, req.body);

    if let Err(e) = post.validate() {
        let submitted = serde_json::json!({ "title": post.title, "body": post.body });
        return Err(AppError::validation(e, submitted));
    }

    let saved = state.blog_posts.save(post).await?;
    tracing::info!(blog_post_id = %saved.id, "Blog post created");

    Ok(HttpResponse::Created().json(to_response(&saved)))
}

/// PUT /api/blog_posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBlogPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut post = state
        .blog_posts
        .find_by_id(*path)
        .await?
        .ok_or_else(blog_post_not_found)?;

    if let Some(title) = req.title {
        post.title = title;
    }
    if let Some(body) = req.body {
        post.body = body;
    }

    if let Err(e) = post.validate() {
        let submitted = serde_json::json!({ "title": post.title, "body": post.body });
        return Err(AppError::validation(e, submitted));
    }

    post.touch();
    let saved = state.blog_posts.save(post).await?;

    Ok(HttpResponse::Ok().json(to_response(&saved)))
}

/// DELETE /api/blog_posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog_posts
        .find_by_id(*path)
        .await?
        .ok_or_else(blog_post_not_found)?;

    state.blog_posts.delete(post.id).await?;
    tracing::info!(blog_post_id = %post.id, "Blog post deleted");

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, DEFAULT_VIEW))
        .json(RedirectNotice::new(
            "Blog post was successfully deleted",
            DEFAULT_VIEW,
        )))
}
