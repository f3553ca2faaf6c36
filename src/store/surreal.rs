// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SurrealDB-backed comment store.

use super::{sort_newest_first, Comment, CommentStore, NewComment, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    engine::local::{Db, Mem},
    Surreal,
};
use tracing::debug;

const TABLE: &str = "comments";

/// Stored shape. The SurrealDB record id is not read back; the comment id
/// lives in its own field.
#[derive(Debug, Serialize, Deserialize)]
struct CommentRow {
    comment_id: String,
    post_slug: String,
    name: String,
    email: Option<String>,
    comment: String,
    is_approved: bool,
    created_at: DateTime<Utc>,
}

impl From<Comment> for CommentRow {
    fn from(c: Comment) -> Self {
        Self {
            comment_id: c.id,
            post_slug: c.post_slug,
            name: c.name,
            email: c.email,
            comment: c.comment,
            is_approved: c.is_approved,
            created_at: c.created_at,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.comment_id,
            post_slug: row.post_slug,
            name: row.name,
            email: row.email,
            comment: row.comment,
            is_approved: row.is_approved,
            created_at: row.created_at,
        }
    }
}

/// Database connection wrapper
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Db>,
}

impl SurrealStore {
    /// Connect to SurrealDB. `memory` opens an in-memory engine; any other
    /// value is a RocksDB directory.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        let db = if path == "memory" {
            Surreal::new::<Mem>(()).await?
        } else {
            Self::open_rocksdb(path).await?
        };

        db.use_ns("blog").use_db("comments").await?;
        Self::init_schema(&db).await?;

        debug!(path, "Comment store connected");
        Ok(Self { db })
    }

    #[cfg(feature = "rocksdb")]
    async fn open_rocksdb(path: &str) -> Result<Surreal<Db>, StoreError> {
        Ok(Surreal::new::<surrealdb::engine::local::RocksDb>(path).await?)
    }

    #[cfg(not(feature = "rocksdb"))]
    async fn open_rocksdb(path: &str) -> Result<Surreal<Db>, StoreError> {
        Err(StoreError::Internal(format!(
            "storage path {path} needs the rocksdb feature"
        )))
    }

    /// Initialize database schema
    async fn init_schema(db: &Surreal<Db>) -> Result<(), StoreError> {
        db.query(
            r#"
            DEFINE TABLE IF NOT EXISTS comments SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS comment_id_idx ON comments COLUMNS comment_id UNIQUE;
            DEFINE INDEX IF NOT EXISTS post_approved_idx ON comments COLUMNS post_slug, is_approved;
        "#,
        )
        .await?
        .check()?;

        Ok(())
    }
}

#[async_trait]
impl CommentStore for SurrealStore {
    async fn create(&self, new: NewComment) -> Result<Comment, StoreError> {
        let row = CommentRow::from(Comment::pending(new));
        let id = row.comment_id.clone();

        let created: Option<CommentRow> = self.db.create((TABLE, id.as_str())).content(row).await?;

        created
            .map(Comment::from)
            .ok_or_else(|| StoreError::Internal(format!("Failed to create comment {id}")))
    }

    async fn find_approved(&self, post_slug: &str) -> Result<Vec<Comment>, StoreError> {
        let mut result = self
            .db
            .query("SELECT * FROM comments WHERE post_slug = $post_slug AND is_approved = true")
            .bind(("post_slug", post_slug.to_string()))
            .await?;

        let rows: Vec<CommentRow> = result.take(0)?;
        let mut comments: Vec<Comment> = rows.into_iter().map(Comment::from).collect();
        sort_newest_first(&mut comments);
        Ok(comments)
    }

    async fn set_approved(&self, id: &str, approved: bool) -> Result<Comment, StoreError> {
        // UPDATE on a missing record id would create it.
        let existing: Option<CommentRow> = self.db.select((TABLE, id)).await?;
        if existing.is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let updated: Option<CommentRow> = self
            .db
            .update((TABLE, id))
            .merge(serde_json::json!({ "is_approved": approved }))
            .await?;

        updated
            .map(Comment::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
