//! Application services (use cases).
//!
//! These services drive the ports to implement the flows offered to the
//! operator. The [`orchestrator`] owns the shared state; the other modules
//! are the building blocks it calls.

pub mod catalog;
pub mod context;
pub mod gateway;
pub mod orchestrator;
pub mod prober;
pub mod provision;

pub use catalog::ModelCatalog;
pub use context::{LaunchContext, LaunchSettings};
pub use gateway::ContainerGateway;
pub use orchestrator::{FlowOutcome, LaunchChoices, Orchestrator};
pub use prober::{MachineProber, ProbeReport};
