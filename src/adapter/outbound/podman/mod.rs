//! Podman CLI adapter for the container engine port.
//!
//! Every call shells out to the `podman` binary and decodes its JSON output.
//! Podman forwards the calls to whichever machine is the default connection.

mod args;
pub mod dto;
mod engine;

pub use args::run_args;
pub use engine::PodmanEngine;
