//! HTTP handlers and route configuration.

mod auth;
mod blog_posts;
mod cover_images;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes - reads are open (visibility-filtered), writes
            // require a bearer token
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::index))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::show))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::destroy))
                    .route("/{id}/cover_image", web::delete().to(cover_images::destroy)),
            )
            // Legacy blog post routes
            .service(
                web::scope("/blog_posts")
                    .route("", web::get().to(blog_posts::index))
                    .route("", web::post().to(blog_posts::create))
                    .route("/{id}", web::get().to(blog_posts::show))
                    .route("/{id}", web::put().to(blog_posts::update))
                    .route("/{id}", web::delete().to(blog_posts::destroy)),
            ),
    );
}
