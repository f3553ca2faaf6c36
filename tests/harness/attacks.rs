// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for security testing.

use std::time::Duration;

/// What each request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Clean,
    Spam,
    Honeypot,
    Malformed,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client IPs to simulate
    pub unique_ips: usize,
    /// Body sent with every request
    pub payload: Payload,
    /// Virtual time between requests
    pub interval: Duration,
    /// Append a rotating proxy chain after the client address
    pub rotate_proxy_chain: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            payload: Payload::Clean,
            interval: Duration::ZERO,
            rotate_proxy_chain: false,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flooding the endpoint.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Many clients, each sending a little more than its allowance.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 600,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Spam bodies spread thin enough to dodge the limiter.
    pub fn spam_campaign() -> Self {
        Self {
            total_requests: 130,
            unique_ips: 26,
            payload: Payload::Spam,
            ..Default::default()
        }
    }

    /// Form-filling bots that populate the hidden field.
    pub fn honeypot_bots() -> Self {
        Self {
            total_requests: 70,
            unique_ips: 14,
            payload: Payload::Honeypot,
            ..Default::default()
        }
    }

    /// Garbage bodies from a fuzzer.
    pub fn malformed_flood() -> Self {
        Self {
            total_requests: 60,
            unique_ips: 12,
            payload: Payload::Malformed,
            ..Default::default()
        }
    }

    /// One client hiding behind a rotating proxy chain.
    pub fn proxy_chain_rotation() -> Self {
        Self {
            total_requests: 50,
            rotate_proxy_chain: true,
            ..Default::default()
        }
    }

    /// Stay just under the limit: 5 per window of 60s.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 30,
            interval: Duration::from_secs(13),
            ..Default::default()
        }
    }

    /// Virtual time the attack spans.
    pub fn expected_duration(&self) -> Duration {
        self.interval * self.total_requests as u32
    }
}
