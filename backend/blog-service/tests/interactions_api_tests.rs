mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use blog_service::handlers;
use common::{bearer, context, insert_post, signup};
use serde_json::{json, Value};

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.state.clone())
                .configure(handlers::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_rating_bounds() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let (author, token) = signup(&ctx, "rater@blog.dev").await;
    let post = insert_post(&ctx, author, "Cats", "meow", 0).await;

    let req = test::TestRequest::post()
        .uri("/v1/api/ratings/")
        .insert_header(bearer(&token))
        .set_json(json!({"post": post.id, "rating": 6}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("The value must not exceed 5"));

    for value in [5, 0] {
        let req = test::TestRequest::post()
            .uri("/v1/api/ratings/")
            .insert_header(bearer(&token))
            .set_json(json!({"post": post.id, "rating": value}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"post": post.id, "rating": value}));
    }
}

#[actix_web::test]
async fn test_rerating_keeps_one_rating_with_latest_value() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let (author, author_token) = signup(&ctx, "author@blog.dev").await;
    let (reader, reader_token) = signup(&ctx, "reader@blog.dev").await;
    let post = insert_post(&ctx, author, "Cats", "meow", 0).await;

    let req = test::TestRequest::get()
        .uri(&format!("/v1/api/posts/{}/", post.id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["ratings"], Value::Null);

    for (token, value) in [(&reader_token, 2), (&reader_token, 4), (&author_token, 5)] {
        let req = test::TestRequest::post()
            .uri("/v1/api/ratings/")
            .insert_header(bearer(token))
            .set_json(json!({"post": post.id, "rating": value}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/v1/api/ratings/")
        .insert_header(bearer(&reader_token))
        .to_request();
    let ratings: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ratings.len(), 2);
    assert!(ratings.contains(&json!({"post": post.id, "author": reader, "rating": 4})));

    let req = test::TestRequest::get()
        .uri(&format!("/v1/api/posts/{}/", post.id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["ratings"], 4.5);
}

#[actix_web::test]
async fn test_ratings_require_authentication() {
    let ctx = context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/v1/api/ratings/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_comments_lifecycle() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let (author, author_token) = signup(&ctx, "author@blog.dev").await;
    let (_, other_token) = signup(&ctx, "other@blog.dev").await;
    let post = insert_post(&ctx, author, "Cats", "meow", 0).await;

    let req = test::TestRequest::post()
        .uri("/v1/api/comments/")
        .set_json(json!({"post": post.id, "text": "anonymous"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/v1/api/comments/")
        .insert_header(bearer(&author_token))
        .set_json(json!({"post": post.id, "text": "first!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(resp).await;
    let comment_id = comment["id"].as_i64().unwrap();
    assert_eq!(comment["text"], "first!");
    assert_eq!(comment["post"], post.id);

    let req = test::TestRequest::patch()
        .uri(&format!("/v1/api/comments/{}/", comment_id))
        .insert_header(bearer(&other_token))
        .set_json(json!({"text": "defaced"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/api/comments/{}/", comment_id))
        .insert_header(bearer(&other_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/v1/api/comments/{}/", comment_id))
        .to_request();
    let unchanged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged["text"], "first!");

    let req = test::TestRequest::patch()
        .uri(&format!("/v1/api/comments/{}/", comment_id))
        .insert_header(bearer(&author_token))
        .set_json(json!({"text": "edited"}))
        .to_request();
    let edited: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(edited["text"], "edited");

    let req = test::TestRequest::get()
        .uri(&format!("/v1/api/posts/{}/", post.id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["comments"], json!([{"text": "edited", "post": post.id}]));

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/api/comments/{}/", comment_id))
        .insert_header(bearer(&author_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/v1/api/comments/").to_request();
    let comments: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(comments.is_empty());
}
