// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Process-local comment store.

use super::{sort_newest_first, Comment, CommentStore, NewComment, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Comments held in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    comments: RwLock<Vec<Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored comment, approved or not.
    pub async fn all(&self) -> Vec<Comment> {
        self.comments.read().await.clone()
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create(&self, new: NewComment) -> Result<Comment, StoreError> {
        let comment = Comment::pending(new);
        self.comments.write().await.push(comment.clone());
        Ok(comment)
    }

    async fn find_approved(&self, post_slug: &str) -> Result<Vec<Comment>, StoreError> {
        // Reverse insertion order first so equal timestamps list newest first.
        let mut approved: Vec<Comment> = self
            .comments
            .read()
            .await
            .iter()
            .rev()
            .filter(|c| c.is_approved && c.post_slug == post_slug)
            .cloned()
            .collect();
        sort_newest_first(&mut approved);
        Ok(approved)
    }

    async fn set_approved(&self, id: &str, approved: bool) -> Result<Comment, StoreError> {
        let mut comments = self.comments.write().await;
        let comment = comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        comment.is_approved = approved;
        Ok(comment.clone())
    }
}
