//! Inbound (driving) ports.
//!
//! The operator is the desktop or terminal surface that drives the
//! orchestrator and answers its questions.

mod operator;

pub use operator::{Notice, NoticeLevel, Operator};
