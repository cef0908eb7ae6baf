//! Dynamics engine: synchronous sweeps over a belief network.
//!
//! `step` advances the network by exactly one synchronous update: every
//! agent's next belief is computed from the pre-step snapshot, then all
//! are committed at once and the step counter advances. `run` iterates
//! `step`, gates the anchor by its start step, and applies the declarative
//! edge schedule at the start of the matching iteration.
//!
//! All randomness flows through the caller-provided generator, one noise
//! draw per agent per step in ascending id order, so a seed pins the whole
//! trajectory bit for bit.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::agent::AgentId;
use crate::network::{BeliefNetwork, Edge, NetworkError};

/// Default standard deviation of the per-step Gaussian noise. Small noise
/// keeps the system from freezing at unstable equilibria.
pub const DEFAULT_NOISE_SCALE: f64 = 0.005;

/// Default fraction of the anchor gap applied per step.
pub const DEFAULT_ANCHOR_STRENGTH: f64 = 0.05;

/// Scales a base edge weight by belief similarity.
///
/// `w * (1 - h + h * (1 - |b_i - b_j|))`. At `h = 0` the base weight
/// passes through untouched; at `h = 1` the edge is weighted purely by
/// similarity, muting neighbors who fully disagree. Pure, no memory
/// across calls.
pub fn effective_weight(base: f64, belief_a: f64, belief_b: f64, homophily: f64) -> f64 {
    let similarity = 1.0 - (belief_a - belief_b).abs();
    base * (1.0 - homophily + homophily * similarity)
}

/// External evidence pulling exposed agents toward a fixed target belief.
#[derive(Debug, Clone, Serialize)]
pub struct Anchor {
    /// Target belief the anchor pulls toward.
    pub value: f64,
    /// Fraction of the remaining gap applied per step.
    pub strength: f64,
    /// First iteration (zero-based, relative to the run invocation) at
    /// which the anchor acts. Interpreted by [`run`]; a direct [`step`]
    /// call applies a supplied anchor unconditionally.
    pub start_step: u64,
    /// Exposed agents; `None` exposes the whole population.
    pub agents: Option<BTreeSet<AgentId>>,
}

impl Anchor {
    /// An anchor at the given target with default strength, active from
    /// step 0 for all agents.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            strength: DEFAULT_ANCHOR_STRENGTH,
            start_step: 0,
            agents: None,
        }
    }

    /// Sets the per-step pull strength.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Delays the anchor until the given run iteration.
    pub fn starting_at(mut self, step: u64) -> Self {
        self.start_step = step;
        self
    }

    /// Restricts the anchor to the given agents.
    pub fn for_agents(mut self, agents: impl IntoIterator<Item = AgentId>) -> Self {
        self.agents = Some(agents.into_iter().collect());
        self
    }

    fn applies_to(&self, id: AgentId) -> bool {
        match &self.agents {
            None => true,
            Some(exposed) => exposed.contains(&id),
        }
    }
}

/// Edges the engine adds at the start of a matching run iteration.
///
/// This is the one sanctioned mid-run topology mutation: declarative,
/// applied by the engine itself, so replay order is well defined.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeEvent {
    /// Zero-based iteration index, relative to the run invocation.
    pub step: u64,
    /// Edges to add; an existing pair gets its weight overwritten.
    pub edges: Vec<Edge>,
}

/// Configuration consumed by [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    /// Number of synchronous sweeps to execute.
    pub steps: u64,
    /// Standard deviation of the per-agent Gaussian noise.
    pub noise_scale: f64,
    /// Optional evidence force.
    pub anchor: Option<Anchor>,
    /// Declarative topology schedule.
    pub schedule: Vec<EdgeEvent>,
}

impl RunConfig {
    /// A run of `steps` sweeps with default noise, no anchor, and an
    /// empty schedule.
    pub fn new(steps: u64) -> Self {
        Self {
            steps,
            noise_scale: DEFAULT_NOISE_SCALE,
            anchor: None,
            schedule: Vec::new(),
        }
    }

    /// Sets the noise standard deviation.
    pub fn with_noise_scale(mut self, noise_scale: f64) -> Self {
        self.noise_scale = noise_scale;
        self
    }

    /// Sets the anchor.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Appends an edge event to the schedule.
    pub fn with_edge_event(mut self, event: EdgeEvent) -> Self {
        self.schedule.push(event);
        self
    }
}

/// Run-time failures. Every failure is terminal to the run and left
/// surfaced to the caller; completed sweeps remain committed and valid.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Noise scale must be finite and non-negative.
    InvalidNoiseScale(f64),
    /// A scheduled edge failed structural validation.
    Network(NetworkError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidNoiseScale(scale) => {
                write!(f, "noise scale {} must be finite and non-negative", scale)
            }
            EngineError::Network(e) => write!(f, "scheduled edge rejected: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NetworkError> for EngineError {
    fn from(e: NetworkError) -> Self {
        EngineError::Network(e)
    }
}

/// Advances the network by one synchronous sweep.
///
/// For each agent: the social target is the homophily-weighted mean of its
/// neighbors' pre-step beliefs (its own belief when it has no neighbors or
/// the total effective weight is zero); the delta is the resistance-scaled
/// pull toward that target, plus one Gaussian noise draw, plus the anchor
/// pull `strength * (anchor - belief)` when the agent is exposed. The new
/// belief is clamped into [0, 1]. Nothing is visible to other agents until
/// the single commit at the end, after which the step counter has advanced
/// by exactly one.
pub fn step(
    network: &mut BeliefNetwork,
    noise_scale: f64,
    anchor: Option<&Anchor>,
    rng: &mut impl Rng,
) -> Result<(), EngineError> {
    if !noise_scale.is_finite() || noise_scale < 0.0 {
        return Err(EngineError::InvalidNoiseScale(noise_scale));
    }
    let noise = Normal::new(0.0, noise_scale)
        .map_err(|_| EngineError::InvalidNoiseScale(noise_scale))?;

    let agents = network.agents();
    let graph = network.graph();
    let homophily = network.homophily();

    let mut next_beliefs = Vec::with_capacity(agents.len());
    for agent in agents {
        let belief = agent.belief();

        let neighbors = graph.neighbors(agent.id());
        let social_target = if neighbors.is_empty() {
            belief
        } else {
            let mut total_weight = 0.0;
            let mut weighted_sum = 0.0;
            for nb in neighbors {
                let other = agents[nb.id.index()].belief();
                let weight = effective_weight(nb.weight, belief, other, homophily);
                weighted_sum += weight * other;
                total_weight += weight;
            }
            if total_weight > 0.0 {
                weighted_sum / total_weight
            } else {
                // Zero total effective weight never moves the agent.
                belief
            }
        };

        let mut delta = (1.0 - agent.resistance()) * (social_target - belief);
        delta += noise.sample(rng);

        if let Some(anchor) = anchor {
            if anchor.applies_to(agent.id()) {
                delta += anchor.strength * (anchor.value - belief);
            }
        }

        next_beliefs.push((belief + delta).clamp(0.0, 1.0));
    }

    network.commit(&next_beliefs);
    Ok(())
}

/// Executes `config.steps` sweeps against the network.
///
/// Scheduled edges land at the start of the matching iteration; the anchor
/// stays inactive, terms omitted entirely, until its `start_step`.
pub fn run(
    network: &mut BeliefNetwork,
    config: &RunConfig,
    rng: &mut impl Rng,
) -> Result<(), EngineError> {
    run_with_observer(network, config, rng, |_, _| {})
}

/// Like [`run`], invoking `observer` after each iteration's commit with
/// the network and the zero-based iteration index.
///
/// The shared borrow keeps observers to observation; topology changes go
/// through the schedule.
pub fn run_with_observer(
    network: &mut BeliefNetwork,
    config: &RunConfig,
    rng: &mut impl Rng,
    mut observer: impl FnMut(&BeliefNetwork, u64),
) -> Result<(), EngineError> {
    // Group the schedule by step up front; in-step order is preserved.
    let mut scheduled: BTreeMap<u64, Vec<Edge>> = BTreeMap::new();
    for event in &config.schedule {
        scheduled
            .entry(event.step)
            .or_default()
            .extend(event.edges.iter().copied());
    }

    for step_index in 0..config.steps {
        if let Some(edges) = scheduled.get(&step_index) {
            for edge in edges {
                network.add_edge(*edge)?;
            }
            tracing::debug!(
                "applied {} scheduled edge(s) at step {}",
                edges.len(),
                step_index
            );
        }

        let active_anchor = config
            .anchor
            .as_ref()
            .filter(|anchor| step_index >= anchor.start_step);
        step(network, config.noise_scale, active_anchor, rng)?;

        observer(network, step_index);
    }

    tracing::debug!(
        "run complete: {} steps, {} agents, {} edges",
        config.steps,
        network.agent_count(),
        network.edge_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-12;

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    fn pair(belief_a: f64, belief_b: f64, resistance: f64, homophily: f64) -> BeliefNetwork {
        let agents = vec![
            Agent::new(AgentId(0), belief_a, resistance, "pair"),
            Agent::new(AgentId(1), belief_b, resistance, "pair"),
        ];
        BeliefNetwork::new(agents, &[Edge::new(0, 1)], homophily).unwrap()
    }

    fn isolated(beliefs: &[f64], resistance: f64) -> BeliefNetwork {
        let agents = beliefs
            .iter()
            .enumerate()
            .map(|(i, &b)| Agent::new(AgentId(i as u32), b, resistance, "solo"))
            .collect();
        BeliefNetwork::new(agents, &[], 0.5).unwrap()
    }

    #[test]
    fn test_effective_weight_zero_homophily_is_structural() {
        assert_eq!(effective_weight(2.0, 0.1, 0.9, 0.0), 2.0);
        assert_eq!(effective_weight(0.5, 0.0, 1.0, 0.0), 0.5);
    }

    #[test]
    fn test_effective_weight_full_homophily_is_similarity() {
        // Perfect agreement keeps the base weight.
        assert_eq!(effective_weight(1.0, 0.3, 0.3, 1.0), 1.0);
        // Maximal disagreement mutes the edge entirely.
        assert_eq!(effective_weight(1.0, 0.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_effective_weight_interpolates() {
        // similarity 0.6, factor 0.5 + 0.5 * 0.6 = 0.8
        let w = effective_weight(2.0, 0.1, 0.5, 0.5);
        assert!((w - 1.6).abs() < EPS);
    }

    #[test]
    fn test_deterministic_pair_swaps_in_one_step() {
        let mut network = pair(0.2, 0.8, 0.0, 0.0);
        step(&mut network, 0.0, None, &mut rng(1)).unwrap();

        let beliefs = network.all_beliefs();
        assert!((beliefs[0] - 0.8).abs() < EPS);
        assert!((beliefs[1] - 0.2).abs() < EPS);
        assert_eq!(network.step_count(), 1);
    }

    #[test]
    fn test_isolated_agent_is_a_fixpoint() {
        let mut network = isolated(&[0.37], 0.1);
        let config = RunConfig::new(25).with_noise_scale(0.0);
        run(&mut network, &config, &mut rng(2)).unwrap();

        // No neighbors, no noise, no anchor: bit-for-bit unchanged.
        for entry in network.agents()[0].history() {
            assert_eq!(*entry, 0.37);
        }
        assert_eq!(network.step_count(), 25);
    }

    #[test]
    fn test_full_resistance_is_immovable() {
        let mut network = pair(0.2, 0.8, 1.0, 0.0);
        step(&mut network, 0.0, None, &mut rng(3)).unwrap();

        assert_eq!(network.all_beliefs(), vec![0.2, 0.8]);
    }

    #[test]
    fn test_zero_total_effective_weight_freezes_the_social_term() {
        // Full homophily and maximal disagreement mute the only edge.
        let mut network = pair(0.0, 1.0, 0.0, 1.0);
        step(&mut network, 0.0, None, &mut rng(4)).unwrap();

        assert_eq!(network.all_beliefs(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_beliefs_stay_bounded_under_extreme_noise() {
        let agents = (0..5)
            .map(|i| Agent::new(AgentId(i), 0.5, 0.0, "ring"))
            .collect();
        let edges: Vec<Edge> = (0..5).map(|i| Edge::new(i, (i + 1) % 5)).collect();
        let mut network = BeliefNetwork::new(agents, &edges, 0.5).unwrap();

        let config = RunConfig::new(50)
            .with_noise_scale(5.0)
            .with_anchor(Anchor::new(1.0).with_strength(2.0));
        run(&mut network, &config, &mut rng(5)).unwrap();

        for agent in network.agents() {
            for &belief in agent.history() {
                assert!((0.0..=1.0).contains(&belief), "belief {} escaped", belief);
            }
        }
    }

    #[test]
    fn test_anchor_pulls_toward_value() {
        let mut network = isolated(&[0.5], 0.0);
        let anchor = Anchor::new(1.0).with_strength(0.1);
        step(&mut network, 0.0, Some(&anchor), &mut rng(6)).unwrap();

        let belief = network.belief(AgentId(0)).unwrap();
        assert!((belief - 0.55).abs() < EPS);

        // Repeated exposure keeps closing the gap.
        step(&mut network, 0.0, Some(&anchor), &mut rng(6)).unwrap();
        assert!(network.belief(AgentId(0)).unwrap() > belief);
    }

    #[test]
    fn test_anchor_scoping_leaves_outsiders_bit_identical() {
        let seed = 7;
        let config_plain = RunConfig::new(20).with_noise_scale(0.01);
        let config_anchored = RunConfig::new(20).with_noise_scale(0.01).with_anchor(
            Anchor::new(1.0)
                .with_strength(0.5)
                .for_agents([AgentId(0)]),
        );

        let mut plain = isolated(&[0.4, 0.6], 0.2);
        run(&mut plain, &config_plain, &mut rng(seed)).unwrap();

        let mut anchored = isolated(&[0.4, 0.6], 0.2);
        run(&mut anchored, &config_anchored, &mut rng(seed)).unwrap();

        // Agent 1 is outside the anchor set: identical trajectory.
        assert_eq!(
            plain.agents()[1].history(),
            anchored.agents()[1].history()
        );
        // Agent 0 is inside: the anchor moved it.
        assert_ne!(
            plain.agents()[0].history(),
            anchored.agents()[0].history()
        );
    }

    #[test]
    fn test_delayed_anchor_matches_no_anchor_before_start() {
        let seed = 9;
        let steps = 10;
        let start = 5;

        let config_plain = RunConfig::new(steps).with_noise_scale(0.01);
        let config_delayed = RunConfig::new(steps).with_noise_scale(0.01).with_anchor(
            Anchor::new(1.0).with_strength(0.3).starting_at(start),
        );

        let mut plain = pair(0.3, 0.7, 0.1, 0.5);
        run(&mut plain, &config_plain, &mut rng(seed)).unwrap();

        let mut delayed = pair(0.3, 0.7, 0.1, 0.5);
        run(&mut delayed, &config_delayed, &mut rng(seed)).unwrap();

        // History entry s is the commit of iteration s - 1: entries up to
        // and including `start` predate any anchor term.
        for s in 0..=start as usize {
            assert_eq!(plain.belief_at_step(s), delayed.belief_at_step(s));
        }
        assert_ne!(
            plain.agents()[0].history(),
            delayed.agents()[0].history()
        );
    }

    #[test]
    fn test_history_grows_by_run_length() {
        let mut network = pair(0.3, 0.7, 0.1, 0.5);
        let before: Vec<usize> = network
            .agents()
            .iter()
            .map(|a| a.history().len())
            .collect();

        run(&mut network, &RunConfig::new(10), &mut rng(10)).unwrap();

        for (agent, before_len) in network.agents().iter().zip(before) {
            assert_eq!(agent.history().len(), before_len + 10);
        }
        assert_eq!(network.step_count(), 10);
    }

    #[test]
    fn test_schedule_applies_at_start_of_matching_iteration() {
        let mut network = isolated(&[0.0, 1.0], 0.0);
        let config = RunConfig::new(3)
            .with_noise_scale(0.0)
            .with_edge_event(EdgeEvent {
                step: 2,
                edges: vec![Edge::new(0, 1)],
            });
        run(&mut network, &config, &mut rng(11)).unwrap();

        assert_eq!(network.edge_count(), 1);
        // Isolated through iterations 0 and 1; the edge lands at the start
        // of iteration 2, so that sweep already sees it and the zero-
        // resistance endpoints adopt each other's belief.
        assert_eq!(network.agents()[0].history(), &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(network.agents()[1].history(), &[1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_schedule_at_step_zero_precedes_first_sweep() {
        let mut network = isolated(&[0.0, 1.0], 0.0);
        let config = RunConfig::new(1)
            .with_noise_scale(0.0)
            .with_edge_event(EdgeEvent {
                step: 0,
                edges: vec![Edge::new(0, 1)],
            });
        run(&mut network, &config, &mut rng(12)).unwrap();

        assert_eq!(network.all_beliefs(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_schedule_rejecting_bad_edge_is_terminal() {
        let mut network = isolated(&[0.5, 0.5], 0.0);
        let config = RunConfig::new(5)
            .with_noise_scale(0.0)
            .with_edge_event(EdgeEvent {
                step: 1,
                edges: vec![Edge::new(0, 9)],
            });

        let err = run(&mut network, &config, &mut rng(13)).unwrap_err();
        assert!(matches!(err, EngineError::Network(_)));
        // Iteration 0 committed; iteration 1 failed before its sweep.
        assert_eq!(network.step_count(), 1);
    }

    #[test]
    fn test_invalid_noise_scale_is_rejected() {
        let mut network = isolated(&[0.5], 0.0);
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let err = step(&mut network, bad, None, &mut rng(14)).unwrap_err();
            assert!(matches!(err, EngineError::InvalidNoiseScale(_)));
        }
        assert_eq!(network.step_count(), 0);
    }

    #[test]
    fn test_observer_runs_after_each_commit() {
        let mut network = pair(0.3, 0.7, 0.1, 0.5);
        let mut seen = Vec::new();
        run_with_observer(
            &mut network,
            &RunConfig::new(4),
            &mut rng(15),
            |net, index| {
                seen.push((index, net.step_count()));
            },
        )
        .unwrap();

        assert_eq!(seen, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_same_seed_reproduces_bit_for_bit() {
        let config = RunConfig::new(30).with_noise_scale(0.02);

        let mut first = pair(0.3, 0.7, 0.1, 0.6);
        run(&mut first, &config, &mut rng(42)).unwrap();

        let mut second = pair(0.3, 0.7, 0.1, 0.6);
        run(&mut second, &config, &mut rng(42)).unwrap();

        assert_eq!(
            first.agents()[0].history(),
            second.agents()[0].history()
        );
        assert_eq!(
            first.agents()[1].history(),
            second.agents()[1].history()
        );

        let mut other_seed = pair(0.3, 0.7, 0.1, 0.6);
        run(&mut other_seed, &config, &mut rng(43)).unwrap();
        assert_ne!(first.all_beliefs(), other_seed.all_beliefs());
    }

    #[test]
    fn test_zero_step_run_is_a_noop() {
        let mut network = pair(0.3, 0.7, 0.1, 0.5);
        run(&mut network, &RunConfig::new(0), &mut rng(16)).unwrap();

        assert_eq!(network.step_count(), 0);
        assert_eq!(network.agents()[0].history().len(), 1);
    }

    #[test]
    fn test_anchor_builder() {
        let anchor = Anchor::new(0.15)
            .with_strength(0.04)
            .starting_at(20)
            .for_agents([AgentId(3), AgentId(5)]);

        assert_eq!(anchor.value, 0.15);
        assert_eq!(anchor.strength, 0.04);
        assert_eq!(anchor.start_step, 20);
        assert!(anchor.applies_to(AgentId(3)));
        assert!(!anchor.applies_to(AgentId(4)));

        let open = Anchor::new(0.5);
        assert!(open.applies_to(AgentId(99)));
        assert_eq!(open.strength, DEFAULT_ANCHOR_STRENGTH);
    }
}
