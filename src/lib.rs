// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment Intake
//!
//! This crate accepts anonymous blog comments into a moderation queue and
//! serves the approved ones back to readers:
//!
//! - Per-client fixed-window rate limiting (5 per minute default)
//! - Field validation (required fields, length limits, email syntax)
//! - Honeypot detection that fakes success for bots
//! - Pattern, capitalization and repetition spam heuristics
//! - Storage of every accepted comment as unapproved

pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod posts;
pub mod spam;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::ApiError;
pub use handlers::{router, AppState, StateError};
pub use limiter::{RateLimitResult, RateLimiter, SweepTask};
pub use spam::{SpamFilter, SpamVerdict};
pub use store::{Comment, CommentStore, MemoryStore, NewComment, SurrealStore};
pub use validator::{CommentDraft, CommentValidator, ValidationError};
