//! remoting-ctl - control plane for a GPU-accelerated llama.cpp inference
//! server running in a Podman machine with API remoting.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Machine status, actions, launch specs and model entries
//! - [`port`] - Traits for the operator, the container engine and scripts
//! - [`application`] - Provisioning, probing, catalog, gateway and the
//!   orchestrator state machine
//! - [`adapter`] - Podman CLI, shell scripts and the terminal front end
//! - [`infrastructure`] - Configuration and logging
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Fakes for every port, for integration tests
//!
//! # Example
//!
//! ```no_run
//! use remoting_ctl::adapter::inbound::cli::run::build_orchestrator;
//! use remoting_ctl::infrastructure::config::Config;
//!
//! # async fn demo() -> remoting_ctl::error::Result<()> {
//! let config = Config::load_or_default("config.toml")?;
//! let mut orchestrator = build_orchestrator(&config)?;
//! let status = orchestrator.attach().await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
