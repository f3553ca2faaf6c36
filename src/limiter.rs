// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for comment submissions.
//!
//! Each client identifier gets a counter and a reset instant. The first
//! request opens a window; requests beyond the configured maximum are
//! refused until the window expires, at which point the entry is replaced
//! wholesale. Expired entries are swept by a background task owned through
//! [`SweepTask`].

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// When the current window ends
        reset_at: Instant,
    },
    /// Request is rate limited
    Limited {
        /// When the current window ends
        reset_at: Instant,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Requests left in the window; zero when limited.
    pub fn remaining(&self) -> u32 {
        match self {
            Self::Allowed { remaining, .. } => *remaining,
            Self::Limited { .. } => 0,
        }
    }

    pub fn reset_at(&self) -> Instant {
        match self {
            Self::Allowed { reset_at, .. } | Self::Limited { reset_at } => *reset_at,
        }
    }

    /// Time until the window resets, measured from now.
    pub fn reset_in(&self) -> Duration {
        self.reset_at().saturating_duration_since(Instant::now())
    }

    /// Whole seconds a client should wait before retrying (at least 1).
    pub fn retry_after_secs(&self) -> u64 {
        let reset_in = self.reset_in();
        let secs = reset_in.as_secs() + u64::from(reset_in.subsec_nanos() > 0);
        secs.max(1)
    }
}

/// Counter state for one client identifier.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

impl WindowEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-identifier windows
    entries: RwLock<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Maximum requests per window.
    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Count a request from `identifier` against its window.
    ///
    /// The write lock is held across the read-modify-write so concurrent
    /// requests from one identifier never lose an increment.
    pub async fn check(&self, identifier: &str) -> RateLimitResult {
        let now = Instant::now();
        let max = self.config.max_requests;
        if max == 0 {
            return RateLimitResult::Limited {
                reset_at: now + self.config.window_duration(),
            };
        }
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries
            .get_mut(identifier)
            .filter(|entry| !entry.is_expired(now))
        {
            if entry.count >= max {
                debug!(identifier, reset_at = ?entry.reset_at, "Rate limit exceeded");
                return RateLimitResult::Limited {
                    reset_at: entry.reset_at,
                };
            }
            entry.count += 1;
            return RateLimitResult::Allowed {
                remaining: max - entry.count,
                reset_at: entry.reset_at,
            };
        }

        // First request, or the previous window has expired.
        let reset_at = now + self.config.window_duration();
        entries.insert(identifier.to_string(), WindowEntry { count: 1, reset_at });
        RateLimitResult::Allowed {
            remaining: max - 1,
            reset_at,
        }
    }

    /// Remove expired windows. Returns how many were dropped.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of identifiers currently tracked.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Start the periodic sweep of expired windows.
    ///
    /// The task only holds a weak reference, so it ends on its own once the
    /// limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweepTask {
        let limiter = Arc::downgrade(self);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(sweep_loop(limiter, interval, shutdown_rx));

        SweepTask {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

async fn sweep_loop(
    limiter: Weak<RateLimiter>,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let removed = limiter.cleanup().await;
                if removed > 0 {
                    debug!(removed, "Swept expired rate limit windows");
                }
            }
        }
    }
    debug!("Rate limit sweeper stopped");
}

/// Handle to the background sweep. Dropping it also stops the task.
pub struct SweepTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SweepTask {
    /// Stop the sweep and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}
