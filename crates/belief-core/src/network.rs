//! Belief network: agent arena + graph + homophily + step counter.
//!
//! Construction is the one place structural defects can enter, so it
//! validates and fails fast: ids must be dense and in positional order,
//! every edge endpoint must name a known agent, weights must be finite and
//! positive, homophily must sit in [0, 1]. After construction the only
//! mutations are belief commits (driven by the engine) and edge addition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId};
use crate::graph::{GraphStore, DEFAULT_EDGE_WEIGHT};

/// An edge for network construction or mid-run addition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// One endpoint.
    pub a: AgentId,
    /// The other endpoint.
    pub b: AgentId,
    /// Positive edge weight.
    pub weight: f64,
}

impl Edge {
    /// An edge with the default weight of 1.0.
    pub fn new(a: u32, b: u32) -> Self {
        Self::weighted(a, b, DEFAULT_EDGE_WEIGHT)
    }

    /// An edge with an explicit weight.
    pub fn weighted(a: u32, b: u32, weight: f64) -> Self {
        Self {
            a: AgentId(a),
            b: AgentId(b),
            weight,
        }
    }
}

impl From<(u32, u32)> for Edge {
    fn from((a, b): (u32, u32)) -> Self {
        Edge::new(a, b)
    }
}

impl From<(u32, u32, f64)> for Edge {
    fn from((a, b, weight): (u32, u32, f64)) -> Self {
        Edge::weighted(a, b, weight)
    }
}

/// Structural defects caught at construction or edge addition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetworkError {
    /// Agent ids must be dense: the agent at each position must carry that
    /// position as its id.
    IdMismatch { position: usize, found: AgentId },
    /// An edge endpoint references no known agent.
    UnknownEndpoint { edge: (AgentId, AgentId), endpoint: AgentId },
    /// An edge connects an agent to itself.
    SelfLoop(AgentId),
    /// An edge weight is not finite and positive.
    InvalidWeight { edge: (AgentId, AgentId), weight: f64 },
    /// Homophily is outside [0, 1].
    InvalidHomophily(f64),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::IdMismatch { position, found } => write!(
                f,
                "agent at position {} has id {}; ids must be dense and in order",
                position, found
            ),
            NetworkError::UnknownEndpoint { edge, endpoint } => write!(
                f,
                "edge ({}, {}) references unknown agent id {}",
                edge.0, edge.1, endpoint
            ),
            NetworkError::SelfLoop(id) => {
                write!(f, "edge connects agent {} to itself", id)
            }
            NetworkError::InvalidWeight { edge, weight } => write!(
                f,
                "edge ({}, {}) has weight {}; weights must be finite and positive",
                edge.0, edge.1, weight
            ),
            NetworkError::InvalidHomophily(h) => {
                write!(f, "homophily {} is outside [0, 1]", h)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

/// A population of agents over a weighted undirected social graph.
///
/// The network owns the agent arena (indexed by [`AgentId`]) and the graph
/// over the same id space, one homophily scalar fixed at construction, and
/// a step counter that the engine advances once per committed sweep.
#[derive(Debug, Clone)]
pub struct BeliefNetwork {
    agents: Vec<Agent>,
    graph: GraphStore,
    homophily: f64,
    step_count: u64,
}

impl BeliefNetwork {
    /// Builds a network from agents, edges, and a homophily scalar.
    ///
    /// Fails fast with a descriptive [`NetworkError`] on any structural
    /// defect; a two-element edge weight is supplied via [`Edge::new`]'s
    /// 1.0 default.
    pub fn new(
        agents: Vec<Agent>,
        edges: &[Edge],
        homophily: f64,
    ) -> Result<Self, NetworkError> {
        if !homophily.is_finite() || !(0.0..=1.0).contains(&homophily) {
            return Err(NetworkError::InvalidHomophily(homophily));
        }
        for (position, agent) in agents.iter().enumerate() {
            if agent.id().index() != position {
                return Err(NetworkError::IdMismatch {
                    position,
                    found: agent.id(),
                });
            }
        }

        let mut graph = GraphStore::new(agents.len());
        for edge in edges {
            validate_edge(agents.len(), edge)?;
            graph.add_edge(edge.a, edge.b, edge.weight);
        }

        Ok(Self {
            agents,
            graph,
            homophily,
            step_count: 0,
        })
    }

    /// Adds an edge after construction. This is the engine's schedule path
    /// and revalidates exactly like construction does.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), NetworkError> {
        validate_edge(self.agents.len(), &edge)?;
        self.graph.add_edge(edge.a, edge.b, edge.weight);
        Ok(())
    }

    /// Number of agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The homophily scalar, in [0, 1].
    pub fn homophily(&self) -> f64 {
        self.homophily
    }

    /// Number of committed synchronous sweeps.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// All agents, ordered by id.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The agent with the given id, if it exists.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    /// Current belief of the given agent, if it exists.
    pub fn belief(&self, id: AgentId) -> Option<f64> {
        self.agent(id).map(Agent::belief)
    }

    /// The underlying graph store.
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Commits one synchronous sweep: writes every agent's new belief via
    /// its update path, then advances the step counter by exactly one.
    pub(crate) fn commit(&mut self, new_beliefs: &[f64]) {
        debug_assert_eq!(new_beliefs.len(), self.agents.len());
        for (agent, &belief) in self.agents.iter_mut().zip(new_beliefs) {
            agent.update(belief);
        }
        self.step_count += 1;
    }
}

fn validate_edge(agent_count: usize, edge: &Edge) -> Result<(), NetworkError> {
    let Edge { a, b, weight } = *edge;
    if a.index() >= agent_count {
        return Err(NetworkError::UnknownEndpoint {
            edge: (a, b),
            endpoint: a,
        });
    }
    if b.index() >= agent_count {
        return Err(NetworkError::UnknownEndpoint {
            edge: (a, b),
            endpoint: b,
        });
    }
    if a == b {
        return Err(NetworkError::SelfLoop(a));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(NetworkError::InvalidWeight {
            edge: (a, b),
            weight,
        });
    }
    Ok(())
}
