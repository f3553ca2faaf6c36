// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the comment API.
//!
//! A submission moves through a fixed pipeline and stops at the first
//! failing step: client identification, rate limit, validation, honeypot,
//! pattern spam, capitalization, repetition, and finally storage as an
//! unapproved comment.

use crate::client_ip::client_identifier;
use crate::config::{Config, ConfigError};
use crate::error::{
    rate_limit_headers, ApiError, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::{Metrics, Outcome};
use crate::posts::{Post, PostError, PostMeta, PostSource};
use crate::spam::{SpamFilter, SpamVerdict};
use crate::store::{Comment, CommentStore, NewComment};
use crate::validator::CommentValidator;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info};

/// Message returned for accepted submissions, including honeypot hits.
pub const SUBMITTED_MESSAGE: &str =
    "Comment submitted successfully! It will appear after approval.";

pub const HEALTH_PATH: &str = "/health";
pub const HEALTHZ_PATH: &str = "/healthz";
pub const COMMENTS_PATH: &str = "/api/comments";
pub const POSTS_PATH: &str = "/api/posts";
pub const POST_PATH: &str = "/api/posts/{slug}";

/// Every fixed route; the configurable metrics path must not collide with these.
pub const BUILTIN_ROUTES: [&str; 5] =
    [HEALTH_PATH, HEALTHZ_PATH, COMMENTS_PATH, POSTS_PATH, POST_PATH];

/// Failures while assembling [`AppState`].
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Shared application state.
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub validator: CommentValidator,
    pub spam: SpamFilter,
    pub store: Arc<dyn CommentStore>,
    pub posts: PostSource,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Build the state, rejecting configs that would break the pipeline.
    pub fn new(config: Config, store: Arc<dyn CommentStore>) -> Result<Self, StateError> {
        config.validate()?;

        Ok(Self {
            limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            validator: CommentValidator::new(config.validation.clone()),
            spam: SpamFilter::new(config.spam.clone()),
            store,
            posts: PostSource::new(config.content.posts_dir.clone()),
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([
            X_RATELIMIT_LIMIT,
            X_RATELIMIT_REMAINING,
            X_RATELIMIT_RESET,
            header::RETRY_AFTER,
        ]);

    let mut router = Router::new()
        .route(HEALTH_PATH, get(health))
        .route(HEALTHZ_PATH, get(health))
        .route(COMMENTS_PATH, get(list_comments).post(submit_comment))
        .route(POSTS_PATH, get(list_posts))
        .route(POST_PATH, get(get_post));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Public projection of an approved comment. Email is never included.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicComment {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for PublicComment {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            name: c.name,
            comment: c.comment,
            created_at: c.created_at,
        }
    }
}

/// Query string for listing comments.
#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(rename = "postSlug")]
    pub post_slug: Option<String>,
}

/// Body returned for accepted submissions.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    #[serde(rename = "commentId", skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "comment-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// List approved comments for a post, newest first.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListCommentsQuery>, QueryRejection>,
) -> Result<Json<Vec<PublicComment>>, ApiError> {
    let slug_required = || ApiError::Validation("Post slug is required".to_string());

    let Query(query) = query.map_err(|rejection| {
        debug!(error = %rejection, "Unreadable comments query");
        slug_required()
    })?;
    let post_slug = query
        .post_slug
        .filter(|slug| !slug.is_empty())
        .ok_or_else(slug_required)?;

    let comments = state.store.find_approved(&post_slug).await.map_err(|e| {
        error!(error = %e, post_slug = %post_slug, "Error fetching comments");
        ApiError::Persistence("Failed to fetch comments")
    })?;

    debug!(post_slug = %post_slug, count = comments.len(), "Listed comments");
    Ok(Json(comments.into_iter().map(PublicComment::from).collect()))
}

/// Submit a comment for moderation.
pub async fn submit_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let result = process_submission(&state, &headers, body).await;
    let outcome = match &result {
        Ok((_, None)) => Outcome::Honeypot,
        Ok((_, Some(_))) => Outcome::Accepted,
        Err(ApiError::RateLimited { .. }) => Outcome::RateLimited,
        Err(ApiError::Validation(_)) => Outcome::Invalid,
        Err(ApiError::Spam) => Outcome::Spam,
        Err(_) => Outcome::Error,
    };
    state.metrics.record(outcome);

    let (rate, comment_id) = result?;
    let headers = rate_limit_headers(
        state.limiter.limit(),
        rate.remaining(),
        reset_unix(&rate),
    );
    let body = Json(SubmitResponse {
        message: SUBMITTED_MESSAGE.to_string(),
        comment_id,
    });

    Ok((StatusCode::CREATED, headers, body).into_response())
}

/// Run the pipeline. `Ok` carries the rate limit state for the response
/// headers and the stored comment id (`None` on a honeypot hit).
async fn process_submission(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(RateLimitResult, Option<String>), ApiError> {
    let identifier = client_identifier(headers);

    let rate = state.limiter.check(&identifier).await;
    if !rate.is_allowed() {
        info!(identifier = %identifier, "Comment submission rate limited");
        return Err(ApiError::RateLimited {
            limit: state.limiter.limit(),
            reset_unix: reset_unix(&rate),
            retry_after_secs: rate.retry_after_secs(),
        });
    }

    let Json(body) = body.map_err(|rejection| {
        debug!(identifier = %identifier, error = %rejection, "Unreadable submission body");
        ApiError::Validation("Invalid request body".to_string())
    })?;

    let draft = state.validator.validate(&body).map_err(|errors| {
        info!(identifier = %identifier, error = %errors, "Submission failed validation");
        ApiError::Validation(errors.first().to_string())
    })?;

    match state.spam.check(&draft) {
        SpamVerdict::Clean => {}
        SpamVerdict::Honeypot => {
            info!(identifier = %identifier, post_slug = %draft.post_slug, "Honeypot triggered");
            return Ok((rate, None));
        }
        SpamVerdict::Rejected(rule) => {
            info!(identifier = %identifier, rule = %rule, "Submission rejected as spam");
            return Err(ApiError::Spam);
        }
    }

    let comment = state
        .store
        .create(NewComment {
            post_slug: draft.post_slug,
            name: draft.name,
            email: draft.email,
            comment: draft.comment,
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Error creating comment");
            ApiError::Persistence("Failed to submit comment")
        })?;

    info!(
        identifier = %identifier,
        post_slug = %comment.post_slug,
        comment_id = %comment.id,
        "Comment queued for moderation"
    );
    Ok((rate, Some(comment.id)))
}

/// Wall-clock reset time of a rate limit window as Unix seconds.
fn reset_unix(rate: &RateLimitResult) -> i64 {
    let reset_in =
        chrono::Duration::from_std(rate.reset_in()).unwrap_or_else(|_| chrono::Duration::zero());
    (Utc::now() + reset_in).timestamp()
}

/// Published posts, newest first, without bodies.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostMeta>>, ApiError> {
    let posts = state.posts.all_posts().await.map_err(|e| {
        error!(error = %e, "Error listing posts");
        ApiError::Internal("Failed to list posts")
    })?;
    Ok(Json(posts.into_iter().map(|p| p.meta).collect()))
}

/// One published post with its body.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    match state.posts.post_by_slug(&slug).await {
        Ok(post) if post.meta.published => Ok(Json(post)),
        Ok(_) | Err(PostError::NotFound(_)) => Err(ApiError::NotFound("Post not found")),
        Err(e) => {
            error!(error = %e, slug = %slug, "Error loading post");
            Err(ApiError::Internal("Failed to load post"))
        }
    }
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state.metrics.set_limiter_entries(state.limiter.len().await);
    state.metrics.render().map_err(|e| {
        error!(error = %e, "Error rendering metrics");
        ApiError::Internal("Failed to render metrics")
    })
}
