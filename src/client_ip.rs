// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-effort client identification from proxy headers.
//!
//! The service is expected to sit behind a trusted reverse proxy that sets
//! these headers. Nothing here guards against a client forging them.

use axum::http::HeaderMap;

/// Identifier used when no proxy header is present.
pub const FALLBACK_IDENTIFIER: &str = "127.0.0.1";

/// Headers consulted, in order of preference.
const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Resolve the identifier the rate limiter keys on.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = header_str(headers, FORWARDED_FOR)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    forwarded
        .or_else(|| header_str(headers, REAL_IP))
        .or_else(|| header_str(headers, CF_CONNECTING_IP))
        .unwrap_or(FALLBACK_IDENTIFIER)
        .to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
