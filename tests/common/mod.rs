//! Shared helpers for the integration tests.
//!
//! - `fixtures`: catalog files and a preconfigured `mcat` command
//! - `log_capture`: records tracing events emitted by library calls

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;
