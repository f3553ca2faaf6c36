// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the submission pipeline.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Honeypot,
    RateLimited,
    Invalid,
    Spam,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Honeypot => "honeypot",
            Self::RateLimited => "rate_limited",
            Self::Invalid => "invalid",
            Self::Spam => "spam",
            Self::Error => "error",
        }
    }
}

/// Metrics owned by one service instance.
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    limiter_entries: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "comment_submissions_total",
                "Comment submissions by outcome",
            ),
            &["outcome"],
        )?;
        let limiter_entries = IntGauge::new(
            "comment_rate_limiter_entries",
            "Client identifiers tracked by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(limiter_entries.clone()))?;

        Ok(Self {
            registry,
            submissions,
            limiter_entries,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Current count for one outcome.
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.submissions.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn set_limiter_entries(&self, entries: usize) {
        self.limiter_entries
            .set(i64::try_from(entries).unwrap_or(i64::MAX));
    }

    /// Render in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
