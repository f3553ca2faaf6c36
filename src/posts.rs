// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Read-only access to the blog's post files.
//!
//! Posts are `.mdx` or `.md` files whose slug is the file stem. Each file
//! opens with a front-matter block, either YAML between `---` lines (the
//! gray-matter convention the blog's authoring tools write) or TOML between
//! `+++` lines:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-05-01
//! description: First post
//! tags: [intro]
//! ---
//! Body text...
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const EXTENSIONS: [&str; 2] = ["mdx", "md"];

/// Post source errors.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },
}

/// Post metadata from the front matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMeta {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub published: bool,
}

/// A post with its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    #[serde(deserialize_with = "date_as_string")]
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_published")]
    published: bool,
}

fn default_published() -> bool {
    true
}

/// Accept a quoted date, a bare YAML date (a plain string to serde_yaml),
/// and a bare TOML date.
fn date_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match toml::Value::deserialize(deserializer)? {
        toml::Value::String(s) => Ok(s),
        toml::Value::Datetime(dt) => Ok(dt.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a date, found {}",
            other.type_str()
        ))),
    }
}

/// Front-matter syntax, told apart by the opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrontMatterFormat {
    Yaml,
    Toml,
}

impl FrontMatterFormat {
    fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    fn parse(self, front: &str) -> Result<FrontMatter, String> {
        match self {
            Self::Yaml => serde_yaml::from_str(front).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(front).map_err(|e| e.to_string()),
        }
    }
}

/// Split a file into front matter and body.
fn split_front_matter(source: &str) -> Option<(FrontMatterFormat, &str, &str)> {
    let rest = source.trim_start_matches('\u{feff}');
    let format = [FrontMatterFormat::Yaml, FrontMatterFormat::Toml]
        .into_iter()
        .find(|format| rest.starts_with(format.delimiter()))?;
    let delimiter = format.delimiter();

    let rest = &rest[delimiter.len()..];
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let body = &rest[offset + line.len()..];
            return Some((format, &rest[..offset], body));
        }
        offset += line.len();
    }
    None
}

/// Parse one post file.
pub fn parse_post(slug: &str, path: &Path, source: &str) -> Result<Post, PostError> {
    let invalid = |message: String| PostError::FrontMatter {
        path: path.to_path_buf(),
        message,
    };

    let (format, front, body) = split_front_matter(source)
        .ok_or_else(|| invalid("missing front matter block".to_string()))?;
    let front = format.parse(front).map_err(invalid)?;

    Ok(Post {
        meta: PostMeta {
            slug: slug.to_string(),
            title: front.title,
            date: front.date,
            description: front.description,
            tags: front.tags,
            published: front.published,
        },
        content: body.to_string(),
    })
}

/// Slugs are file stems; anything that could leave the content directory
/// cannot name a post.
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.contains("..")
        && !slug.contains(['/', '\\'])
        && !slug.starts_with('.')
}

/// Post files on disk.
#[derive(Debug, Clone)]
pub struct PostSource {
    dir: PathBuf,
}

impl PostSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load a post by slug, published or not.
    pub async fn post_by_slug(&self, slug: &str) -> Result<Post, PostError> {
        let slug = slug
            .strip_suffix(".mdx")
            .or_else(|| slug.strip_suffix(".md"))
            .unwrap_or(slug);
        if !is_safe_slug(slug) {
            return Err(PostError::NotFound(slug.to_string()));
        }

        for ext in EXTENSIONS {
            let path = self.dir.join(format!("{slug}.{ext}"));
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => return parse_post(slug, &path, &source),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(PostError::Io { path, source }),
            }
        }

        Err(PostError::NotFound(slug.to_string()))
    }

    /// Published posts, newest first. Files with broken front matter are
    /// skipped with a warning.
    pub async fn all_posts(&self) -> Result<Vec<Post>, PostError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Content directory missing");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(PostError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut posts = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(PostError::Io {
                        path: self.dir.clone(),
                        source,
                    })
                }
            };

            let path = entry.path();
            let is_post = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| EXTENSIONS.contains(&e));
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_post {
                continue;
            }

            let source = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| PostError::Io {
                    path: path.clone(),
                    source,
                })?;
            match parse_post(slug, &path, &source) {
                Ok(post) if post.meta.published => posts.push(post),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping post"),
            }
        }

        posts.sort_by(|a, b| b.meta.date.cmp(&a.meta.date));
        Ok(posts)
    }
}
