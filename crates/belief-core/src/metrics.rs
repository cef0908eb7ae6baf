//! Population metrics over live and historical belief state.
//!
//! Everything here is a read-only view of the network. Historical queries
//! use the hold-last-value rule: an agent whose history is shorter than the
//! queried step contributes its most recent recorded belief.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::agent::Agent;
use crate::network::BeliefNetwork;

/// Point-in-time aggregate of the network.
///
/// This is the read surface handed to reporting and presentation layers;
/// key names are stable in serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    /// Committed sweeps so far.
    pub steps: u64,
    /// Number of agents.
    pub agents: usize,
    /// Number of distinct undirected edges.
    pub edges: usize,
    /// Mean belief across the whole population.
    pub overall_mean: f64,
    /// `4 * mean((b - 0.5)^2)` over all beliefs.
    pub polarization: f64,
    /// `1 - mean(|b_u - b_v|)` over all edges.
    pub echo_chamber_score: f64,
    /// Mean belief per community, sorted by community label.
    pub community_means: BTreeMap<String, f64>,
}

impl BeliefNetwork {
    /// Current belief of every agent, ordered by id.
    pub fn all_beliefs(&self) -> Vec<f64> {
        self.agents().iter().map(Agent::belief).collect()
    }

    /// Current beliefs grouped by community label.
    pub fn community_beliefs(&self) -> BTreeMap<String, Vec<f64>> {
        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for agent in self.agents() {
            grouped
                .entry(agent.community().to_string())
                .or_default()
                .push(agent.belief());
        }
        grouped
    }

    /// Mean belief per community.
    pub fn community_means(&self) -> BTreeMap<String, f64> {
        self.community_beliefs()
            .into_iter()
            .map(|(community, beliefs)| (community, mean(&beliefs)))
            .collect()
    }

    /// Population standard deviation of belief per community.
    pub fn community_stds(&self) -> BTreeMap<String, f64> {
        self.community_beliefs()
            .into_iter()
            .map(|(community, beliefs)| (community, population_std(&beliefs)))
            .collect()
    }

    /// How far beliefs cluster toward the extremes versus the 0.5 midpoint.
    ///
    /// `4 * mean((b - 0.5)^2)`: 0 for a population concentrated at 0.5,
    /// approaching 1 as beliefs concentrate at 0 and 1. Returns 0.0 for
    /// fewer than two agents.
    pub fn polarization(&self) -> f64 {
        let beliefs = self.all_beliefs();
        if beliefs.len() < 2 {
            return 0.0;
        }
        let mean_sq_deviation = beliefs
            .iter()
            .map(|b| (b - 0.5) * (b - 0.5))
            .sum::<f64>()
            / beliefs.len() as f64;
        mean_sq_deviation * 4.0
    }

    /// Belief homogeneity among directly connected agents.
    ///
    /// `1 - mean(|b_u - b_v|)` over all edges; 1 means every edge joins
    /// agents in perfect agreement. Returns 0.0 when there are no edges.
    pub fn echo_chamber_score(&self) -> f64 {
        if self.edge_count() == 0 {
            return 0.0;
        }
        let agents = self.agents();
        let total_difference: f64 = self
            .graph()
            .edges()
            .map(|(u, v, _)| (agents[u.index()].belief() - agents[v.index()].belief()).abs())
            .sum();
        1.0 - total_difference / self.edge_count() as f64
    }

    /// Every agent's belief at a historical step, ordered by id, holding
    /// each agent's last recorded value past the end of its history.
    pub fn belief_at_step(&self, step: usize) -> Vec<f64> {
        self.agents()
            .iter()
            .map(|agent| agent.belief_at_step(step))
            .collect()
    }

    /// Length of the longest individual history: the network's full
    /// recorded run length.
    pub fn max_history_len(&self) -> usize {
        self.agents()
            .iter()
            .map(|agent| agent.history().len())
            .max()
            .unwrap_or(0)
    }

    /// Per-community mean belief at every recorded step, using the
    /// hold-last-value rule for agents with shorter histories.
    pub fn community_history(&self) -> BTreeMap<String, Vec<f64>> {
        let mut history: BTreeMap<String, Vec<f64>> = self
            .communities()
            .into_iter()
            .map(|community| (community, Vec::new()))
            .collect();

        for step in 0..self.max_history_len() {
            let mut by_community: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
            for agent in self.agents() {
                by_community
                    .entry(agent.community())
                    .or_default()
                    .push(agent.belief_at_step(step));
            }
            for (community, beliefs) in by_community {
                if let Some(series) = history.get_mut(community) {
                    series.push(mean(&beliefs));
                }
            }
        }
        history
    }

    /// Sorted list of distinct community labels.
    pub fn communities(&self) -> Vec<String> {
        self.agents()
            .iter()
            .map(|agent| agent.community().to_string())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Agents belonging to the given community, ordered by id.
    pub fn agents_in_community(&self, community: &str) -> Vec<&Agent> {
        self.agents()
            .iter()
            .filter(|agent| agent.community() == community)
            .collect()
    }

    /// Agents carrying a human-readable label, ordered by id.
    pub fn labeled_agents(&self) -> Vec<&Agent> {
        self.agents()
            .iter()
            .filter(|agent| agent.label().is_some())
            .collect()
    }

    /// Bundles the aggregate read surface for external reporting.
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            steps: self.step_count(),
            agents: self.agent_count(),
            edges: self.edge_count(),
            overall_mean: mean(&self.all_beliefs()),
            polarization: self.polarization(),
            echo_chamber_score: self.echo_chamber_score(),
            community_means: self.community_means(),
        }
    }
}

/// Arithmetic mean, defined as 0.0 for an empty slice so aggregates of an
/// empty network never produce NaN.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (no Bessel correction).
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
