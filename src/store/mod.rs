// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment storage.
//!
//! The service only ever creates unapproved comments and reads approved
//! ones. Approval is flipped by a moderator outside the HTTP surface via
//! [`CommentStore::set_approved`].

use crate::config::StorageConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod surreal;

pub use memory::MemoryStore;
pub use surreal::SurrealStore;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),

    #[error("Comment not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: String,
    /// Slug of the post the comment belongs to
    pub post_slug: String,
    /// Author display name
    pub name: String,
    /// Author email, never shown publicly
    pub email: Option<String>,
    /// Comment body
    pub comment: String,
    /// Visible to readers only when true
    pub is_approved: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Fields for a new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_slug: String,
    pub name: String,
    pub email: Option<String>,
    pub comment: String,
}

impl Comment {
    /// Build an unapproved comment stamped with a fresh id and the current time.
    pub fn pending(new: NewComment) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            post_slug: new.post_slug,
            name: new.name,
            email: new.email,
            comment: new.comment,
            is_approved: false,
            created_at: Utc::now(),
        }
    }
}

/// Persistence for comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Store a comment awaiting moderation.
    async fn create(&self, new: NewComment) -> Result<Comment, StoreError>;

    /// Approved comments for a post, newest first.
    async fn find_approved(&self, post_slug: &str) -> Result<Vec<Comment>, StoreError>;

    /// Moderation hook: set the approval flag on a comment.
    async fn set_approved(&self, id: &str, approved: bool) -> Result<Comment, StoreError>;
}

/// Open the store named by the storage config.
///
/// - `memory`: process-local [`MemoryStore`]
/// - `surreal:memory`: embedded in-memory SurrealDB
/// - anything else: on-disk SurrealDB at that path (needs the `rocksdb` feature)
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn CommentStore>, StoreError> {
    match config.path.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "surreal:memory" => Ok(Arc::new(SurrealStore::connect("memory").await?)),
        path => Ok(Arc::new(SurrealStore::connect(path).await?)),
    }
}

/// Sort newest first. The sort is stable, so callers pre-order ties.
pub(crate) fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
