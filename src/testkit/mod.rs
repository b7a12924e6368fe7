//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`operator`] - `ScriptedOperator`: queued answers, recorded notices.
//! - [`engine`] - `FakeEngine`: in-memory container engine.
//! - [`scripts`] - `FakeScripts`: scripted exit codes, recorded calls.
//! - [`fixture`] - Build sources, model trees and settings on disk.
//!
//! Every fake is a cheap handle around shared state: keep a clone, hand a
//! boxed clone to the orchestrator, inspect the clone afterwards.

pub mod engine;
pub mod fixture;
pub mod operator;
pub mod scripts;
