// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for comment intake abuse simulation.
//!
//! This module provides utilities for driving the HTTP router with
//! hostile traffic patterns and tallying how each request ended.

pub mod attacks;
pub mod generators;
pub mod metrics;
