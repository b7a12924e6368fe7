//! Outbound adapters (driven side).

pub mod podman;
pub mod shell;
