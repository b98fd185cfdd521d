mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use blog_service::handlers;
use blog_service::repository::UserRepository;
use common::{bearer, context, PASSWORD};
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
async fn test_register_activate_login_refresh() {
    let ctx = context().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/v1/api/account/register/")
        .set_json(json!({
            "email": "new@blog.dev",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let login = json!({"email": "new@blog.dev", "password": PASSWORD});

    let req = test::TestRequest::post()
        .uri("/v1/api/account/login/")
        .set_json(login.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let user = ctx
        .repo
        .find_user_by_email("new@blog.dev")
        .await
        .unwrap()
        .unwrap();
    let code = user.activation_code.unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/v1/api/account/activate/{}/", code))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/v1/api/account/activate/{}/", code))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/v1/api/account/login/")
        .set_json(login)
        .to_request();
    let tokens: Value = test::call_and_read_body_json(&app, req).await;
    let access = tokens["access"].as_str().unwrap();
    let refresh = tokens["refresh"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/v1/api/posts/own/")
        .insert_header(bearer(access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/v1/api/account/refresh/")
        .set_json(json!({ "refresh": refresh }))
        .to_request();
    let refreshed: Value = test::call_and_read_body_json(&app, req).await;
    assert!(refreshed["access"].as_str().is_some());
}

#[actix_web::test]
async fn test_register_rejects_bad_input() {
    let ctx = context().await;
    let app = init_app!(ctx);

    let cases = [
        json!({"email": "not-an-email", "password": PASSWORD, "password_confirm": PASSWORD}),
        json!({"email": "a@blog.dev", "password": "123", "password_confirm": "123"}),
        json!({"email": "a@blog.dev", "password": PASSWORD, "password_confirm": "different"}),
    ];
    for body in cases {
        let req = test::TestRequest::post()
            .uri("/v1/api/account/register/")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let body = json!({
        "email": "dup@blog.dev",
        "password": PASSWORD,
        "password_confirm": PASSWORD,
    });

    let req = test::TestRequest::post()
        .uri("/v1/api/account/register/")
        .set_json(body.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/v1/api/account/register/")
        .set_json(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_wrong_password_is_unauthorized() {
    let ctx = context().await;
    let app = init_app!(ctx);
    common::signup(&ctx, "user@blog.dev").await;

    let req = test::TestRequest::post()
        .uri("/v1/api/account/login/")
        .set_json(json!({"email": "user@blog.dev", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
