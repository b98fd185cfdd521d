/// HTTP handlers for blog-service
///
/// Routes live under `/v1/api` and pass through [`JwtAuthMiddleware`], which
/// attaches the caller's identity when a bearer token is sent.
pub mod accounts;
pub mod categories;
pub mod comments;
pub mod posts;
pub mod ratings;
pub mod tagging;

use crate::middleware::JwtAuthMiddleware;
use actix_web::{web, HttpRequest};
use tagging::PostResource;

/// `scheme://host` of the incoming request, used to build absolute media URLs
pub fn request_base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// Register the `/v1/api` route table
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/api")
            .wrap(JwtAuthMiddleware)
            .route("/categories/", web::get().to(categories::list_categories))
            .service(
                web::resource("/posts/")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .route("/posts/own/", web::get().to(posts::own_posts))
            .route("/posts/search/", web::get().to(posts::search_posts))
            .service(
                web::resource("/posts/{post_id}/")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::update_post))
                    .route(web::patch().to(posts::partial_update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route("/posts/{post_id}/like/", web::post().to(tagging::like::<PostResource>))
            .route("/posts/{post_id}/unlike/", web::post().to(tagging::unlike::<PostResource>))
            .route("/posts/{post_id}/mark/", web::post().to(tagging::mark::<PostResource>))
            .route("/posts/{post_id}/unmark/", web::post().to(tagging::unmark::<PostResource>))
            .service(
                web::resource("/comments/")
                    .route(web::get().to(comments::list_comments))
                    .route(web::post().to(comments::create_comment)),
            )
            .service(
                web::resource("/comments/{comment_id}/")
                    .route(web::get().to(comments::get_comment))
                    .route(web::put().to(comments::update_comment))
                    .route(web::patch().to(comments::partial_update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            )
            .service(
                web::resource("/ratings/")
                    .route(web::get().to(ratings::list_ratings))
                    .route(web::post().to(ratings::rate_post)),
            )
            .service(
                web::scope("/account")
                    .route("/register/", web::post().to(accounts::register))
                    .route("/activate/{code}/", web::get().to(accounts::activate))
                    .route("/login/", web::post().to(accounts::login))
                    .route("/refresh/", web::post().to(accounts::refresh)),
            ),
    );
}
