// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Text heuristics run on validated submissions.
//!
//! Checks run in a fixed order and the first hit wins:
//! 1. Honeypot filled in
//! 2. Known spam or markup-injection patterns in the body or name
//! 3. Excessive capitalization in the body
//! 4. A long run of one repeated character in the body
//!
//! Every check is a pure function of the submitted text.

use crate::config::SpamConfig;
use crate::validator::CommentDraft;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Which heuristic fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamRule {
    SpamKeyword,
    MultipleUrls,
    ScriptTag,
    IframeTag,
    JavascriptUri,
    LinkMarkup,
    ExcessiveCaps,
    RepeatedCharacters,
}

impl SpamRule {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpamKeyword => "spam_keyword",
            Self::MultipleUrls => "multiple_urls",
            Self::ScriptTag => "script_tag",
            Self::IframeTag => "iframe_tag",
            Self::JavascriptUri => "javascript_uri",
            Self::LinkMarkup => "link_markup",
            Self::ExcessiveCaps => "excessive_caps",
            Self::RepeatedCharacters => "repeated_characters",
        }
    }
}

impl std::fmt::Display for SpamRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running the heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    /// Nothing fired; the comment may be stored
    Clean,
    /// Honeypot was filled in; pretend success and store nothing
    Honeypot,
    /// Reject with the generic spam message
    Rejected(SpamRule),
}

/// Ordered pattern rules, applied to both the body and the author name.
static PATTERN_RULES: LazyLock<Vec<(SpamRule, Regex)>> = LazyLock::new(|| {
    [
        (SpamRule::SpamKeyword, r"(?i)\b(viagra|cialis|casino|poker)\b"),
        (SpamRule::MultipleUrls, r"(?i)https?://.*https?://"),
        (SpamRule::ScriptTag, r"(?i)<script"),
        (SpamRule::IframeTag, r"(?i)<iframe"),
        (SpamRule::JavascriptUri, r"(?i)javascript:"),
        (SpamRule::LinkMarkup, r"(?i)<a\s[^>]*href|\[(url|link)[=\]]"),
    ]
    .into_iter()
    .map(|(rule, pattern)| (rule, Regex::new(pattern).unwrap()))
    .collect()
});

/// Spam filter for comment drafts.
pub struct SpamFilter {
    config: SpamConfig,
}

impl SpamFilter {
    /// Create a new filter with the given thresholds.
    pub fn new(config: SpamConfig) -> Self {
        Self { config }
    }

    /// Run every heuristic in order and report the first that fires.
    pub fn check(&self, draft: &CommentDraft) -> SpamVerdict {
        if is_honeypot_filled(draft.honeypot.as_deref()) {
            return SpamVerdict::Honeypot;
        }

        let rule = matching_pattern(&draft.comment)
            .or_else(|| matching_pattern(&draft.name))
            .or_else(|| {
                self.has_excessive_caps(&draft.comment)
                    .then_some(SpamRule::ExcessiveCaps)
            })
            .or_else(|| {
                self.has_repeated_run(&draft.comment)
                    .then_some(SpamRule::RepeatedCharacters)
            });

        match rule {
            Some(rule) => {
                debug!(%rule, post_slug = %draft.post_slug, "Spam heuristic fired");
                SpamVerdict::Rejected(rule)
            }
            None => SpamVerdict::Clean,
        }
    }

    /// Uppercase share of the body, only for bodies longer than the minimum.
    pub fn has_excessive_caps(&self, text: &str) -> bool {
        let total = text.chars().count();
        if total <= self.config.caps_min_length {
            return false;
        }
        let upper = text.chars().filter(|c| c.is_uppercase()).count();
        upper as f64 / total as f64 > self.config.max_uppercase_ratio
    }

    /// Whether any character repeats more than the allowed run length.
    pub fn has_repeated_run(&self, text: &str) -> bool {
        longest_run(text) > self.config.max_char_run
    }
}

/// First pattern rule matching `text`.
pub fn matching_pattern(text: &str) -> Option<SpamRule> {
    PATTERN_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(rule, _)| *rule)
}

fn is_honeypot_filled(honeypot: Option<&str>) -> bool {
    honeypot.is_some_and(|value| !value.trim().is_empty())
}

/// Length of the longest run of one repeated character.
fn longest_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for c in text.chars() {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}
