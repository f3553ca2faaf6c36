// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment submission validator.
//!
//! Turns a raw JSON submission into a [`CommentDraft`]:
//! - Required post slug, author name and body
//! - Length limits on name and body
//! - Optional email, checked for address syntax
//! - Optional honeypot, carried through untouched for the spam filter

use crate::config::ValidationConfig;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$").unwrap()
});

/// Submitted fields, by their JSON key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PostSlug,
    Name,
    Email,
    Comment,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Self::PostSlug => "postSlug",
            Self::Name => "name",
            Self::Email => "email",
            Self::Comment => "comment",
        }
    }
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", required_message(.0))]
    Required(Field),

    #[error("{}", too_long_message(.field))]
    TooLong { field: Field, max: usize },

    #[error("Invalid email")]
    InvalidEmail,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::Required(field) | Self::TooLong { field, .. } => *field,
            Self::InvalidEmail => Field::Email,
        }
    }
}

fn required_message(field: &Field) -> &'static str {
    match field {
        Field::PostSlug => "Post slug is required",
        Field::Name => "Name is required",
        Field::Email => "Email is required",
        Field::Comment => "Comment is required",
    }
}

fn too_long_message(field: &Field) -> &'static str {
    match field {
        Field::PostSlug => "Post slug is too long",
        Field::Name => "Name is too long",
        Field::Email => "Email is too long",
        Field::Comment => "Comment is too long",
    }
}

/// Every issue found in a submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// The issue surfaced to the submitter.
    pub fn first(&self) -> &ValidationError {
        // Only constructed with at least one issue.
        &self.0[0]
    }

    pub fn issues(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first())
    }
}

impl std::error::Error for ValidationErrors {}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub post_slug: String,
    pub name: String,
    pub email: Option<String>,
    pub comment: String,
    /// Raw honeypot content; `None` when absent or null.
    pub honeypot: Option<String>,
}

/// Comment submission validator.
pub struct CommentValidator {
    config: ValidationConfig,
}

impl CommentValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a raw submission body.
    ///
    /// A body that is not a JSON object is reported as missing every
    /// required field.
    pub fn validate(&self, body: &Value) -> Result<CommentDraft, ValidationErrors> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);
        let mut issues = Vec::new();

        let post_slug = required_string(fields, Field::PostSlug, None, &mut issues);
        let name = required_string(
            fields,
            Field::Name,
            Some(self.config.max_name_len),
            &mut issues,
        );
        let email = optional_email(fields, &mut issues);
        let comment = required_string(
            fields,
            Field::Comment,
            Some(self.config.max_comment_len),
            &mut issues,
        );
        let honeypot = honeypot_value(fields);

        match (post_slug, name, email, comment) {
            (Some(post_slug), Some(name), Some(email), Some(comment)) if issues.is_empty() => {
                Ok(CommentDraft {
                    post_slug,
                    name,
                    email,
                    comment,
                    honeypot,
                })
            }
            _ => {
                debug!(?issues, "Submission failed validation");
                Err(ValidationErrors(issues))
            }
        }
    }
}

fn required_string(
    fields: &Map<String, Value>,
    field: Field,
    max_len: Option<usize>,
    issues: &mut Vec<ValidationError>,
) -> Option<String> {
    let value = match fields.get(field.key()) {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => {
            issues.push(ValidationError::Required(field));
            return None;
        }
    };

    if let Some(max) = max_len {
        if value.chars().count() > max {
            issues.push(ValidationError::TooLong { field, max });
            return None;
        }
    }

    Some(value.clone())
}

/// `Some(None)` for an absent or empty email, `None` when invalid.
fn optional_email(
    fields: &Map<String, Value>,
    issues: &mut Vec<ValidationError>,
) -> Option<Option<String>> {
    match fields.get(Field::Email.key()) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) if s.is_empty() => Some(None),
        Some(Value::String(s)) if is_valid_email(s) => Some(Some(s.clone())),
        Some(_) => {
            issues.push(ValidationError::InvalidEmail);
            None
        }
    }
}

fn honeypot_value(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("honeypot") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        // Anything a human-facing form would never send still counts as filled.
        Some(other) => Some(other.to_string()),
    }
}

/// Check address syntax. No DNS or mailbox verification.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    !local.starts_with('.') && !email.contains("..") && EMAIL_SHAPE.is_match(email)
}
