// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for contact endpoint attack simulation.
//!
//! Payload corpora, flood patterns and an outcome collector used by the
//! security tests.

pub mod attacks;
pub mod generators;
pub mod metrics;
