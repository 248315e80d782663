// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier access and verdict interpretation for the Veriflow pipeline.
//!
//! Three pieces: an HTTP client for the external vision classifier, a
//! never-throw wrapper that bounds every call and degrades to `REVIEW`, and
//! the interpreter that applies the declared-intent override policy.

pub mod client;
pub mod guard;
pub mod interpreter;

pub use client::HttpClassifier;
pub use guard::{classify_or_review, CLASSIFIER_UNAVAILABLE};
pub use interpreter::{
    interpret, is_confident_pass, Interpreted, CONFIDENT_PASS_THRESHOLD, SLIP_DOWNGRADE_CAP,
};
