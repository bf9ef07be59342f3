//! 確認トークンのE2Eテスト

use axum::http::StatusCode;
use regex::Regex;

use crate::support::{
    app::create_test_app,
    client::TestClient,
    flows::{login, register},
};

const INVALID_LINK: &str = "The confirmation link is invalid or has expired.";

#[tokio::test]
async fn test_confirmation_link_from_email() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    register(&mut client, "john@example.com", "john").await;
    let email = app
        .mailer
        .last_to("john@example.com")
        .expect("confirmation email should be sent");
    assert_eq!(email.subject, "[Authflow] Confirm Your Account");

    let link = Regex::new(r"https?://[^/\s]+(/auth/confirm/\S+)").unwrap();
    let path = link
        .captures(&email.body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .expect("email should contain a confirmation link");

    login(&mut client, "john@example.com").await;
    let response = client.get_follow(&path).await;
    assert!(response
        .body
        .contains("You have confirmed your account. Thanks!"));
    assert!(app.user("john@example.com").await.confirmed);
}

#[tokio::test]
async fn test_token_of_another_user_is_rejected() {
    let app = create_test_app().await;
    let mut john = TestClient::new(app.router.clone());
    let mut susan = TestClient::new(app.router.clone());

    register(&mut john, "john@example.com", "john").await;
    register(&mut susan, "susan@example.com", "susan").await;
    login(&mut susan, "susan@example.com").await;

    let johns_token = app.confirmation_token_for("john@example.com").await;
    let response = susan
        .get_follow(&format!("/auth/confirm/{}", johns_token))
        .await;
    assert!(response.body.contains(INVALID_LINK));
    assert!(!app.user("susan@example.com").await.confirmed);
    assert!(!app.user("john@example.com").await.confirmed);
}

#[tokio::test]
async fn test_token_is_noop_after_confirmation() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    register(&mut client, "john@example.com", "john").await;
    login(&mut client, "john@example.com").await;
    let token = app.confirmation_token_for("john@example.com").await;
    let uri = format!("/auth/confirm/{}", token);

    client.get_follow(&uri).await;
    assert!(app.user("john@example.com").await.confirmed);

    let response = client.get(&uri).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
    assert!(response
        .set_cookies()
        .iter()
        .all(|cookie| !cookie.starts_with("authflow_flash=")));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    register(&mut client, "john@example.com", "john").await;
    login(&mut client, "john@example.com").await;
    let user = app.user("john@example.com").await;
    let token = authflow::auth::confirmation::generate_confirmation_token(
        user.id,
        &app.config.secret_key,
        -3600,
    )
    .unwrap();

    let response = client.get_follow(&format!("/auth/confirm/{}", token)).await;
    assert!(response.body.contains(INVALID_LINK));
    assert!(!app.user("john@example.com").await.confirmed);
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    register(&mut client, "john@example.com", "john").await;
    login(&mut client, "john@example.com").await;
    let token = app.confirmation_token_for("john@example.com").await;

    let response = client
        .get_follow(&format!("/auth/confirm/{}x", token))
        .await;
    assert!(response.body.contains(INVALID_LINK));
    assert!(!app.user("john@example.com").await.confirmed);
}

#[tokio::test]
async fn test_confirm_requires_login() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    let response = client.get("/auth/confirm/some-token").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.location(),
        Some("/auth/login?next=%2Fauth%2Fconfirm%2Fsome-token")
    );

    let response = client.get_follow("/auth/confirm/some-token").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Please log in to access this page."));
}

#[tokio::test]
async fn test_resend_confirmation_email() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    register(&mut client, "john@example.com", "john").await;
    login(&mut client, "john@example.com").await;
    assert_eq!(app.mailer.sent().len(), 1);

    let response = client.get_follow("/auth/confirm").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .body
        .contains("A new confirmation email has been sent to you by email."));
    assert_eq!(app.mailer.sent().len(), 2);

    // 再送されたトークンでも確認できる
    let token = app.confirmation_token_for("john@example.com").await;
    client.get_follow(&format!("/auth/confirm/{}", token)).await;
    assert!(app.user("john@example.com").await.confirmed);
}

#[tokio::test]
async fn test_unconfirmed_page_redirects_anonymous_and_confirmed_users() {
    let app = create_test_app().await;
    let mut client = TestClient::new(app.router.clone());

    let response = client.get("/auth/unconfirmed").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));

    register(&mut client, "john@example.com", "john").await;
    login(&mut client, "john@example.com").await;
    let response = client.get("/auth/unconfirmed").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .body
        .contains("You have not confirmed your account yet."));

    let token = app.confirmation_token_for("john@example.com").await;
    client.get_follow(&format!("/auth/confirm/{}", token)).await;
    let response = client.get("/auth/unconfirmed").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
}
