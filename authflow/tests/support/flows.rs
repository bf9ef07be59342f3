//! よく使う操作（登録・ログイン）

use super::client::{TestClient, TestResponse};

/// パスワード"cat"でアカウントを登録する（リダイレクトは辿らない）
#[allow(dead_code)]
pub async fn register(client: &mut TestClient, email: &str, username: &str) -> TestResponse {
    client
        .post_form(
            "/auth/register",
            &[
                ("email", email),
                ("username", username),
                ("password", "cat"),
                ("password2", "cat"),
            ],
        )
        .await
}

/// パスワード"cat"でログインする（リダイレクトは辿らない）
#[allow(dead_code)]
pub async fn login(client: &mut TestClient, email: &str) -> TestResponse {
    client
        .post_form("/auth/login", &[("email", email), ("password", "cat")])
        .await
}
