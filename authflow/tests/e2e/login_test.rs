//! ログインとアクセス制御のE2Eテスト

use authflow::config::AppConfig;
use axum::http::StatusCode;
use std::time::Duration;

use crate::support::{
    app::{create_test_app, create_test_app_with},
    client::TestClient,
    flows::{login, register},
};

#[tokio::test]
async fn test_wrong_password_rerenders_form() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;

    let response = client
        .post_form(
            "/auth/login",
            &[("email", "john@example.com"), ("password", "dog")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid email or password."));
    assert!(client.cookie("authflow_session").is_none());
}

#[tokio::test]
async fn test_unknown_email_rerenders_form() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    let response = login(&mut client, "nobody@example.com").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;

    let response = login(&mut client, "JOHN@Example.COM").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
    assert!(client.cookie("authflow_session").is_some());
}

#[tokio::test]
async fn test_login_redirects_to_local_next_only() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;

    let fields = [("email", "john@example.com"), ("password", "cat")];
    let response = client
        .post_form("/auth/login?next=%2Fauth%2Funconfirmed", &fields)
        .await;
    assert_eq!(response.location(), Some("/auth/unconfirmed"));

    let response = client
        .post_form("/auth/login?next=%2F%2Fevil.example.com", &fields)
        .await;
    assert_eq!(response.location(), Some("/"));

    let response = client
        .post_form("/auth/login?next=https%3A%2F%2Fevil.example.com", &fields)
        .await;
    assert_eq!(response.location(), Some("/"));

    let response = client
        .post_form("/auth/login?next=%2F%09%2Fevil.example.com", &fields)
        .await;
    assert_eq!(response.location(), Some("/"));
}

#[tokio::test]
async fn test_remember_me_sets_persistent_cookie() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;

    let response = login(&mut client, "john@example.com").await;
    let session = response
        .set_cookies()
        .into_iter()
        .find(|cookie| cookie.starts_with("authflow_session="))
        .expect("session cookie should be set");
    assert!(session.contains("HttpOnly"));
    assert!(!session.contains("Max-Age"));

    let response = client
        .post_form(
            "/auth/login",
            &[
                ("email", "john@example.com"),
                ("password", "cat"),
                ("remember_me", "y"),
            ],
        )
        .await;
    let session = response
        .set_cookies()
        .into_iter()
        .find(|cookie| cookie.starts_with("authflow_session="))
        .expect("session cookie should be set");
    assert!(session.contains(&format!(
        "Max-Age={}",
        app.config.remember_ttl.as_secs()
    )));
}

#[tokio::test]
async fn test_out_of_range_remember_lifetime_fails_without_panicking() {
    let mut config = AppConfig::testing();
    config.remember_ttl = Duration::from_secs(10_000_000_000_000_000);
    let app = create_test_app_with(config).await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;

    let response = client
        .post_form(
            "/auth/login",
            &[
                ("email", "john@example.com"),
                ("password", "cat"),
                ("remember_me", "y"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(client.cookie("authflow_session").is_none());
}

#[tokio::test]
async fn test_logout_requires_login() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    let response = client.get("/auth/logout").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.location(),
        Some("/auth/login?next=%2Fauth%2Flogout")
    );
}

#[tokio::test]
async fn test_unconfirmed_user_is_gated_from_site() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;
    login(&mut client, "john@example.com").await;

    for path in ["/", "/does-not-exist"] {
        let response = client.get(path).await;
        assert_eq!(response.status, StatusCode::FOUND, "path {}", path);
        assert_eq!(response.location(), Some("/auth/unconfirmed"));
    }

    // /auth/ 配下はゲートの対象外
    let response = client.get("/auth/login").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forged_session_cookie_is_anonymous() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    client.set_cookie("authflow_session", "forged.session.token");

    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Hello, Stranger!"));
}

#[tokio::test]
async fn test_login_updates_last_seen() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());
    register(&mut client, "john@example.com", "john").await;
    let before = app.user("john@example.com").await.last_seen;

    login(&mut client, "john@example.com").await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    client.get("/auth/unconfirmed").await;

    let after = app.user("john@example.com").await.last_seen;
    assert!(after > before);
}
