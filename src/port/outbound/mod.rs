//! Outbound (driven) ports implemented by infrastructure adapters.

mod engine;
mod script;

pub use engine::{ContainerEngine, NoProgress, PullProgress};
pub use script::{ScriptOutput, ScriptRunner};
