//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │Operator │            │  Container  │              │  Script   │
//! │ (CLI)   │            │   Engine    │              │  Runner   │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Operator`] - Choice, prompt, file pick, notification and status display
//! - [`ContainerEngine`] - Image and container operations on the active engine
//! - [`ScriptRunner`] - External shell scripts shipped with the installed build
//! - [`PullProgress`] - Optional observer of image pull output

pub mod inbound;
pub mod outbound;

pub use inbound::{Notice, NoticeLevel, Operator};
pub use outbound::{ContainerEngine, NoProgress, PullProgress, ScriptOutput, ScriptRunner};
