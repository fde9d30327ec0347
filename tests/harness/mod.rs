// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for fetch gate abuse simulation.
//!
//! Provides hostile inputs and outcome bookkeeping for exercising the gate
//! the way a misbehaving crawl frontier or a hostile page would.

#![allow(dead_code)]

pub mod generators;
pub mod metrics;
pub mod scenarios;
