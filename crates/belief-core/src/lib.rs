//! Core belief dynamics: agents, the social graph, the update engine, metrics.

pub mod agent;
pub mod engine;
pub mod graph;
pub mod metrics;
pub mod network;

pub use agent::{Agent, AgentId, Stance};
pub use engine::{run, run_with_observer, step, Anchor, EdgeEvent, EngineError, RunConfig};
pub use metrics::NetworkSummary;
pub use network::{BeliefNetwork, Edge, NetworkError};
