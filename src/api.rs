// API client module: a small blocking HTTP client for the library API.
// Every endpoint method returns the status and the decoded body; deciding
// what a non-2xx status means is left to the caller.

use crate::models::{BookQuery, BorrowRequest, LoginRequest, NewBook, RegisterRequest, ReturnRequest};
use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Base URL used when neither a flag nor `LIBRARY_API_URL` is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Environment variable consulted by [`ApiClient::from_env`].
pub const BASE_URL_ENV: &str = "LIBRARY_API_URL";

/// Blocking client bound to one server. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Status code and best-effort decoded body of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Bearer token in the body's `token` field, if non-empty.
    pub fn token(&self) -> Option<String> {
        self.body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

/// JSON if the body parses, the raw text as a JSON string if it doesn't,
/// `null` if there is no body at all.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// The configured base URL, or the default when unset or blank.
fn base_url_or_default(configured: Option<String>) -> String {
    configured
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.into())
}

impl ApiClient {
    /// Create an ApiClient configured from `LIBRARY_API_URL` or fall back
    /// to `http://localhost:3000`.
    pub fn from_env() -> Result<Self> {
        Self::new(&base_url_or_default(std::env::var(BASE_URL_ENV).ok()))
    }

    pub fn new(base_url: &str) -> Result<Self> {
        // reqwest's blocking client times out after 30s by default; calls
        // here wait for as long as the server takes.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authorization header map; empty when there is no token.
    fn auth_headers(token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(t) = token {
            let mut val = HeaderValue::from_str(&format!("Bearer {}", t))
                .context("Token is not a valid header value")?;
            val.set_sensitive(true);
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder> {
        let url = self.url(path);
        debug!("{} {} (bearer: {})", method, url, token.is_some());
        Ok(self.client.request(method, &url).headers(Self::auth_headers(token)?))
    }

    fn send(req: RequestBuilder, what: &str) -> Result<ApiResponse> {
        let res = req
            .send()
            .with_context(|| format!("Failed to send {} request", what))?;
        let status = res.status();
        info!("{} -> {}", what, status);
        let text = res
            .text()
            .with_context(|| format!("Failed to read {} response body", what))?;
        Ok(ApiResponse {
            status,
            body: decode_body(&text),
        })
    }

    fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &T,
        what: &str,
    ) -> Result<ApiResponse> {
        let req = self.request(method, path, token)?.json(body);
        Self::send(req, what)
    }

    /// `POST /api/register`.
    pub fn register(&self, req: &RegisterRequest) -> Result<ApiResponse> {
        self.send_json(Method::POST, "/api/register", None, req, "register")
    }

    /// `POST /api/login`. The token, if any, is in the response body.
    pub fn login(&self, req: &LoginRequest) -> Result<ApiResponse> {
        self.send_json(Method::POST, "/api/login", None, req, "login")
    }

    /// `GET /api/books`, with the query's filters as URL parameters.
    pub fn list_books(&self, query: &BookQuery, token: Option<&str>) -> Result<ApiResponse> {
        let mut req = self.request(Method::GET, "/api/books", token)?;
        if !query.is_empty() {
            req = req.query(query);
        }
        Self::send(req, "list books")
    }

    pub fn get_book(&self, id: i64, token: Option<&str>) -> Result<ApiResponse> {
        let req = self.request(Method::GET, &format!("/api/books/{}", id), token)?;
        Self::send(req, "get book")
    }

    /// `POST /api/books`. The server requires an admin token.
    pub fn add_book(&self, book: &NewBook, token: Option<&str>) -> Result<ApiResponse> {
        self.send_json(Method::POST, "/api/books", token, book, "add book")
    }

    pub fn update_book(&self, id: i64, book: &NewBook, token: Option<&str>) -> Result<ApiResponse> {
        self.send_json(Method::PUT, &format!("/api/books/{}", id), token, book, "update book")
    }

    pub fn delete_book(&self, id: i64, token: Option<&str>) -> Result<ApiResponse> {
        let req = self.request(Method::DELETE, &format!("/api/books/{}", id), token)?;
        Self::send(req, "delete book")
    }

    pub fn borrow_book(&self, book_id: i64, token: Option<&str>) -> Result<ApiResponse> {
        self.send_json(Method::POST, "/api/borrow", token, &BorrowRequest { book_id }, "borrow")
    }

    pub fn return_book(&self, borrow_id: i64, token: Option<&str>) -> Result<ApiResponse> {
        self.send_json(Method::POST, "/api/return", token, &ReturnRequest { borrow_id }, "return")
    }

    /// Borrows of the user the token belongs to.
    pub fn borrow_history(&self, token: Option<&str>) -> Result<ApiResponse> {
        let req = self.request(Method::GET, "/api/borrow/history", token)?;
        Self::send(req, "borrow history")
    }

    /// Books currently out on loan. Admin only.
    pub fn borrowed_report(&self, token: Option<&str>) -> Result<ApiResponse> {
        let req = self.request(Method::GET, "/api/reports/borrowed", token)?;
        Self::send(req, "borrowed report")
    }

    /// Ten most borrowed books. Admin only.
    pub fn popular_report(&self, token: Option<&str>) -> Result<ApiResponse> {
        let req = self.request(Method::GET, "/api/reports/popular", token)?;
        Self::send(req, "popular report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_body_prefers_json() {
        assert_eq!(decode_body(r#"{"token":"abc"}"#), json!({"token": "abc"}));
        assert_eq!(decode_body("[]"), json!([]));
    }

    #[test]
    fn decode_body_keeps_plain_text() {
        assert_eq!(decode_body("Unauthorized"), json!("Unauthorized"));
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
    }

    #[test]
    fn token_requires_a_non_empty_string() {
        let ok = ApiResponse { status: StatusCode::OK, body: json!({"user": {}, "token": "t0k"}) };
        assert_eq!(ok.token().as_deref(), Some("t0k"));

        for body in [json!({"token": ""}), json!({"token": 12}), json!({"error": "Invalid credentials"}), json!("Forbidden")] {
            let res = ApiResponse { status: StatusCode::UNAUTHORIZED, body };
            assert_eq!(res.token(), None);
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = ApiClient::new("http://localhost:3000//").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.url("/api/books"), "http://localhost:3000/api/books");
    }

    #[test]
    fn base_url_falls_back_to_localhost() {
        assert_eq!(base_url_or_default(None), "http://localhost:3000");
        assert_eq!(base_url_or_default(Some("  ".into())), DEFAULT_BASE_URL);
        assert_eq!(base_url_or_default(Some("http://library:8080".into())), "http://library:8080");
    }

    #[test]
    fn from_env_reads_library_api_url() {
        // Only this test touches the variable.
        std::env::set_var(BASE_URL_ENV, "http://library.test:4000/");
        let configured = ApiClient::from_env().unwrap();
        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(configured.base_url(), "http://library.test:4000");

        assert_eq!(ApiClient::from_env().unwrap().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn auth_header_only_with_token() {
        assert!(ApiClient::auth_headers(None).unwrap().is_empty());
        let headers = ApiClient::auth_headers(Some("abc")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(ApiClient::auth_headers(Some("bad\ntoken")).is_err());
    }
}
