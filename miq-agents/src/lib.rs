//! Concrete, demo-mode-first implementations of every MIQ agent key.

mod agents;
mod registry;

pub use agents::*;
pub use registry::build_agent_runtimes;
