//! The five built-in scenarios.
//!
//! Each builder draws topology first, then beliefs, then resistances from
//! the one caller-provided generator, so a single seed reproduces the
//! whole population. Parameters are fixed; the seed is the only knob.

use std::cmp::Reverse;

use belief_core::{
    Agent, AgentId, Anchor, BeliefNetwork, Edge, EdgeEvent, NetworkError, RunConfig,
};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::topology;

/// A moderate community polarizes slowly through homophily alone.
///
/// 80 agents on a small-world graph, beliefs near 0.5, nobody extreme,
/// nobody manipulative. High homophily is the only force at work.
pub fn long_slide(rng: &mut impl Rng) -> Result<(BeliefNetwork, RunConfig), NetworkError> {
    let n = 80u32;
    let edges = topology::watts_strogatz(n, 6, 0.15, rng);

    let beliefs = clipped_normal(rng, n as usize, 0.5, 0.12, 0.1, 0.9);
    let resistances = uniform(rng, n as usize, 0.05, 0.2);

    let agents = (0..n)
        .map(|i| {
            Agent::new(
                AgentId(i),
                beliefs[i as usize],
                resistances[i as usize],
                "community",
            )
        })
        .collect();

    let network = BeliefNetwork::new(agents, &edges, 0.7)?;
    let config = RunConfig::new(150).with_noise_scale(0.008);
    Ok((network, config))
}

/// Two polarized communities share one connecting agent.
///
/// 30 believers, 30 skeptics, each side a small world of its own, and one
/// open-minded agent holding five links into each camp.
pub fn bridger(rng: &mut impl Rng) -> Result<(BeliefNetwork, RunConfig), NetworkError> {
    let n_per = 30u32;
    let bridger_id = n_per * 2;

    let side_a = topology::watts_strogatz(n_per, 4, 0.2, rng);
    let side_b = topology::watts_strogatz(n_per, 4, 0.2, rng);

    let beliefs_a = clipped_normal(rng, n_per as usize, 0.82, 0.06, 0.65, 0.99);
    let beliefs_b = clipped_normal(rng, n_per as usize, 0.18, 0.06, 0.01, 0.35);
    let resist_a = uniform(rng, n_per as usize, 0.1, 0.25);
    let resist_b = uniform(rng, n_per as usize, 0.1, 0.25);

    let mut agents = Vec::with_capacity(bridger_id as usize + 1);
    for i in 0..n_per {
        agents.push(Agent::new(
            AgentId(i),
            beliefs_a[i as usize],
            resist_a[i as usize],
            "believers",
        ));
    }
    for i in 0..n_per {
        agents.push(Agent::new(
            AgentId(n_per + i),
            beliefs_b[i as usize],
            resist_b[i as usize],
            "skeptics",
        ));
    }
    agents.push(Agent::new(AgentId(bridger_id), 0.5, 0.05, "bridge").with_label("The Bridger"));

    let mut edges = side_a;
    edges.extend(offset(&side_b, n_per));
    // The bridger reaches the first five agents of each camp at reduced
    // weight.
    for i in 0..5 {
        edges.push(Edge::weighted(bridger_id, i, 0.8));
        edges.push(Edge::weighted(bridger_id, n_per + i, 0.8));
    }

    let network = BeliefNetwork::new(agents, &edges, 0.65)?;
    let config = RunConfig::new(120).with_noise_scale(0.004);
    Ok((network, config))
}

/// Ground truth enters an echo chamber through peripheral agents.
///
/// 60 strongly convinced agents on a scale-free graph. Contradicting
/// evidence (anchor 0.15) arrives after 20 steps, but only at the five
/// lowest-degree nodes.
pub fn evidence(rng: &mut impl Rng) -> Result<(BeliefNetwork, RunConfig), NetworkError> {
    let n = 60u32;
    let edges = topology::barabasi_albert(n, 3, rng);

    let beliefs = clipped_normal(rng, n as usize, 0.85, 0.05, 0.7, 0.99);
    let resistances = uniform(rng, n as usize, 0.15, 0.35);

    // Evidence enters at the periphery: lowest degree first, ties by id.
    let degrees = degree_counts(n, &edges);
    let mut by_degree: Vec<u32> = (0..n).collect();
    by_degree.sort_by_key(|&i| (degrees[i as usize], i));
    let entry_points: Vec<AgentId> = by_degree[..5].iter().map(|&i| AgentId(i)).collect();

    let agents = (0..n)
        .map(|i| {
            let agent = Agent::new(
                AgentId(i),
                beliefs[i as usize],
                resistances[i as usize],
                "echo_chamber",
            );
            match entry_points.iter().position(|&id| id == AgentId(i)) {
                Some(k) => agent.with_label(format!("evidence_entry_{}", k)),
                None => agent,
            }
        })
        .collect();

    let network = BeliefNetwork::new(agents, &edges, 0.6)?;
    let config = RunConfig::new(200).with_noise_scale(0.003).with_anchor(
        Anchor::new(0.15)
            .with_strength(0.04)
            .starting_at(20)
            .for_agents(entry_points),
    );
    Ok((network, config))
}

/// A high-degree influencer changes their belief mid-simulation.
///
/// 100 agents on a scale-free graph. The biggest hub starts a true
/// believer, then meets strong contradicting evidence alone after step 30.
pub fn cascade(rng: &mut impl Rng) -> Result<(BeliefNetwork, RunConfig), NetworkError> {
    let n = 100u32;
    let edges = topology::barabasi_albert(n, 3, rng);

    let degrees = degree_counts(n, &edges);
    let influencer = (0..n)
        .max_by_key(|&i| (degrees[i as usize], Reverse(i)))
        .expect("population is non-empty");

    let beliefs = clipped_normal(rng, n as usize, 0.75, 0.1, 0.5, 0.99);
    let resistances = uniform(rng, n as usize, 0.05, 0.2);

    let agents = (0..n)
        .map(|i| {
            if i == influencer {
                // Starts convinced, but responsive to new information.
                Agent::new(AgentId(i), 0.88, 0.05, "network").with_label("The Influencer")
            } else {
                Agent::new(
                    AgentId(i),
                    beliefs[i as usize],
                    resistances[i as usize],
                    "network",
                )
            }
        })
        .collect();

    let network = BeliefNetwork::new(agents, &edges, 0.4)?;
    let config = RunConfig::new(150).with_noise_scale(0.004).with_anchor(
        Anchor::new(0.1)
            .with_strength(0.25)
            .starting_at(30)
            .for_agents([AgentId(influencer)]),
    );
    Ok((network, config))
}

/// An embedded agent begins questioning, then forms new connections.
///
/// A tight 45-agent belief community and a separate 20-agent outside
/// community, no links between them. Agent 0 feels a quiet questioning
/// signal from the start; at step 40 they reach out and form five
/// cross-community connections.
pub fn reconstruction(rng: &mut impl Rng) -> Result<(BeliefNetwork, RunConfig), NetworkError> {
    let n_community = 45u32;
    let n_outside = 20u32;
    let questioner = AgentId(0);

    let community_edges = topology::watts_strogatz(n_community, 5, 0.1, rng);
    let outside_edges = topology::watts_strogatz(n_outside, 4, 0.2, rng);

    let beliefs_comm = clipped_normal(rng, n_community as usize, 0.85, 0.04, 0.72, 0.97);
    let resist_comm = uniform(rng, n_community as usize, 0.2, 0.35);
    let beliefs_out = clipped_normal(rng, n_outside as usize, 0.25, 0.07, 0.1, 0.45);
    let resist_out = uniform(rng, n_outside as usize, 0.1, 0.25);

    let mut agents = Vec::with_capacity((n_community + n_outside) as usize);
    // The questioner starts indistinguishable from their community, just
    // far more open-minded.
    agents.push(
        Agent::new(questioner, 0.83, 0.08, "tight_community").with_label("The Questioner"),
    );
    for i in 1..n_community {
        agents.push(Agent::new(
            AgentId(i),
            beliefs_comm[i as usize],
            resist_comm[i as usize],
            "tight_community",
        ));
    }
    for i in 0..n_outside {
        agents.push(Agent::new(
            AgentId(n_community + i),
            beliefs_out[i as usize],
            resist_out[i as usize],
            "outside",
        ));
    }

    // No initial cross-community links; those arrive mid-run.
    let mut edges = community_edges;
    edges.extend(offset(&outside_edges, n_community));

    let new_connections: Vec<Edge> = (0..5)
        .map(|i| Edge::weighted(questioner.0, n_community + i, 0.6))
        .collect();

    let network = BeliefNetwork::new(agents, &edges, 0.55)?;
    let config = RunConfig::new(150)
        .with_noise_scale(0.004)
        .with_anchor(Anchor::new(0.2).with_strength(0.03).for_agents([questioner]))
        .with_edge_event(EdgeEvent {
            step: 40,
            edges: new_connections,
        });
    Ok((network, config))
}

fn clipped_normal(
    rng: &mut impl Rng,
    count: usize,
    mean: f64,
    std_dev: f64,
    lo: f64,
    hi: f64,
) -> Vec<f64> {
    let dist = Normal::new(mean, std_dev).expect("preset standard deviations are positive");
    (0..count).map(|_| dist.sample(rng).clamp(lo, hi)).collect()
}

fn uniform(rng: &mut impl Rng, count: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..count).map(|_| rng.gen_range(lo..hi)).collect()
}

fn offset(edges: &[Edge], by: u32) -> Vec<Edge> {
    edges
        .iter()
        .map(|e| Edge::weighted(e.a.0 + by, e.b.0 + by, e.weight))
        .collect()
}

fn degree_counts(n: u32, edges: &[Edge]) -> Vec<u32> {
    let mut degrees = vec![0u32; n as usize];
    for edge in edges {
        degrees[edge.a.index()] += 1;
        degrees[edge.b.index()] += 1;
    }
    degrees
}
