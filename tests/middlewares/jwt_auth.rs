use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use cinelog::auth::encode_jwt;
use uuid::Uuid;

use crate::{AppStateTest, create_fake_user};

#[tokio::test]
async fn should_throw_error_when_request_does_not_contain_header_authorization() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .uri("/movies")
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_auth_header_does_not_contain_bearer() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .uri("/movies")
        .header(header::AUTHORIZATION, "not-bearer random-string")
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_jwt_token_is_invalid() {
    let test_state = AppStateTest::new();

    let request = Request::builder()
        .uri("/movies")
        .header(header::AUTHORIZATION, "bearer random-string")
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_throw_error_when_user_is_missing() {
    let test_state = AppStateTest::new();

    let token = encode_jwt(Uuid::new_v4(), &test_state.app_state.config.jwt).unwrap();

    let request = Request::builder()
        .uri("/movies")
        .header(header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_be_ok_when_user_is_exist() {
    let test_state = AppStateTest::new();

    let user = create_fake_user();
    test_state.store.insert_user(user.clone());

    let response = test_state.get("/movies", &user).await;

    assert_eq!(response.status(), StatusCode::OK);
}
