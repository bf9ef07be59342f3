//! 認証フローE2Eテスト
//!
//! 匿名アクセス → 登録 → ログイン（未確認） → 確認 → ログアウト

use axum::http::StatusCode;
use regex::Regex;

use crate::support::{app::create_test_app, client::TestClient};

#[tokio::test]
async fn test_complete_auth_flow() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    // Step 1: 匿名でトップページ
    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Stranger"));

    // Step 2: 登録
    let response = client
        .post_form(
            "/auth/register",
            &[
                ("email", "john@example.com"),
                ("username", "john"),
                ("password", "cat"),
                ("password2", "cat"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);

    // Step 3: ログイン（未確認）
    let response = client
        .post_form_follow(
            "/auth/login",
            &[("email", "john@example.com"), ("password", "cat")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(Regex::new(r"Hello,\s+john!").unwrap().is_match(&response.body));
    assert!(response
        .body
        .contains("You have not confirmed your account yet"));

    // Step 4: 確認トークン
    let token = app.confirmation_token_for("john@example.com").await;
    let response = client
        .get_follow(&format!("/auth/confirm/{}", token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("You have confirmed your account"));

    // Step 5: ログアウト
    let response = client.get_follow("/auth/logout").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("You have been logged out"));
    assert!(response.body.contains("Stranger"));
}

#[tokio::test]
async fn test_confirmed_user_sees_home_page() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    crate::support::flows::register(&mut client, "john@example.com", "john").await;
    crate::support::flows::login(&mut client, "john@example.com").await;
    let token = app.confirmation_token_for("john@example.com").await;
    client.get_follow(&format!("/auth/confirm/{}", token)).await;

    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Hello, john!"));
    assert!(response.body.contains("Log Out"));
    assert!(!response.body.contains("You have confirmed your account"));
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    crate::support::flows::register(&mut client, "john@example.com", "john").await;
    crate::support::flows::login(&mut client, "john@example.com").await;
    assert!(client.cookie("authflow_session").is_some());

    let response = client.get("/auth/logout").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
    assert!(client.cookie("authflow_session").is_none());

    let response = client.get("/").await;
    assert!(response.body.contains("Hello, Stranger!"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    let response = client.get("/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Page Not Found"));
}
