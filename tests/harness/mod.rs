// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for form relay abuse simulation.
//!
//! Drives the submission pipeline with flood, spray and hostile-payload
//! patterns and tallies how each submission ended.

pub mod attacks;
pub mod generators;
pub mod metrics;
