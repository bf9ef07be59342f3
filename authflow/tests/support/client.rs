//! Cookieを保持するインプロセスHTTPクライアント
//!
//! `tower::ServiceExt::oneshot`でルーターを直接呼び出す。

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use std::collections::BTreeMap;
use tower::ServiceExt;

const MAX_REDIRECTS: usize = 10;

/// レスポンス（本文は文字列化済み）
#[allow(dead_code)]
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

#[allow(dead_code)]
impl TestResponse {
    /// Locationヘッダー
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Set-Cookieヘッダーの一覧
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect()
    }
}

/// ブラウザのようにCookieを引き継ぐテストクライアント
pub struct TestClient {
    app: Router,
    cookies: BTreeMap<String, String>,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    /// 保持しているCookieの値
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Cookieを直接設定する
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self
            .request("GET", uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).expect("Failed to encode form");
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// GETしてリダイレクトを最後まで辿る
    pub async fn get_follow(&mut self, uri: &str) -> TestResponse {
        let response = self.get(uri).await;
        self.follow(response).await
    }

    /// POSTしてリダイレクトを最後まで辿る
    pub async fn post_form_follow(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let response = self.post_form(uri, fields).await;
        self.follow(response).await
    }

    async fn follow(&mut self, mut response: TestResponse) -> TestResponse {
        for _ in 0..MAX_REDIRECTS {
            if !response.status.is_redirection() {
                return response;
            }
            let location = response
                .location()
                .expect("redirect without Location header")
                .to_string();
            response = self.get(&location).await;
        }
        panic!("too many redirects");
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie_header);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };
        for set_cookie in response.set_cookies() {
            self.store_cookie(&set_cookie);
        }
        response
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.trim().split_once('=')) else {
            return;
        };
        let expired = parts.any(|attr| attr.trim().eq_ignore_ascii_case("Max-Age=0"));
        if expired || value.is_empty() {
            self.cookies.remove(name);
        } else {
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }
}
