// Request payloads sent to the library API, plus a read-only view of the
// bearer token claims. Field names mirror the server's JSON keys.

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// ISBN used by the smoke script for every book it adds.
pub const FIXTURE_ISBN: &str = "123456789012";
/// Timestamp used for both `createdAt` and `updatedAt` of fixture books.
pub const FIXTURE_TIMESTAMP: &str = "2021-01-01T00:00:00.000Z";

/// Payload for `POST /api/register`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Payload for `POST /api/login`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Book payload for create and update calls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub quantity: i64,
    pub created_at: String,
    pub updated_at: String,
    /// The server validates this one under its snake_case name.
    #[serde(rename = "published_year", default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i64>,
}

impl NewBook {
    /// A book with the fixed ISBN, a quantity of one and the fixed
    /// timestamps. Only title and author vary.
    pub fn fixture(title: &str, author: &str) -> Self {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: FIXTURE_ISBN.to_string(),
            quantity: 1,
            created_at: FIXTURE_TIMESTAMP.to_string(),
            updated_at: FIXTURE_TIMESTAMP.to_string(),
            published_year: None,
        }
    }
}

/// Filters for `GET /api/books`. Unset filters are left out of the URL.
#[derive(Serialize, Debug, Default, Clone)]
pub struct BookQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl BookQuery {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.available.is_none()
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: i64,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub borrow_id: i64,
}

/// Claims carried in the payload segment of the login token. The signature
/// is not checked; this is only used for display.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub id: serde_json::Value,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the middle segment of a JWT.
    pub fn decode(token: &str) -> Result<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .context("Token is not a JWT: missing payload segment")?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .context("Token payload is not base64url")?;
        serde_json::from_slice(&bytes).context("Parsing token claims json")
    }
}
