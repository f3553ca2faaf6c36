// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client-facing error types.
//!
//! Every variant renders as a single-line `{"error": ...}` body. Detailed
//! causes are logged where the error is raised and never sent to clients.

use axum::{
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Application error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// First offending field reason
    #[error("{0}")]
    Validation(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited {
        limit: u32,
        /// Window reset as Unix epoch seconds
        reset_unix: i64,
        retry_after_secs: u64,
    },

    /// Deliberately silent about which heuristic fired
    #[error("Comment appears to be spam")]
    Spam,

    #[error("{0}")]
    Persistence(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Internal(&'static str),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Spam => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut headers = HeaderMap::new();

        if let Self::RateLimited {
            limit,
            reset_unix,
            retry_after_secs,
        } = &self
        {
            headers = rate_limit_headers(*limit, 0, *reset_unix);
            headers.insert(RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, headers, body).into_response()
    }
}

/// `X-RateLimit-*` headers for a response.
pub fn rate_limit_headers(limit: u32, remaining: u32, reset_unix: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_unix));
    headers
}
