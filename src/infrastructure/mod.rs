//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic.
//!
//! - [`config`] - Configuration loading, validation and logging setup

pub mod config;
