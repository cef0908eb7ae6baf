//! Determinism verification tests
//!
//! A seed must pin an entire run: every agent history, every metric,
//! bit for bit. These tests drive full runs through the public API.

use belief_core::{run, Agent, AgentId, Anchor, BeliefNetwork, Edge, EdgeEvent, RunConfig};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Builds a small mixed-community network with varied beliefs and
/// resistances, itself seeded so every test starts from the same state.
fn build_network(build_seed: u64) -> BeliefNetwork {
    let mut rng = SmallRng::seed_from_u64(build_seed);

    let agents = (0..12)
        .map(|i| {
            let community = if i < 6 { "north" } else { "south" };
            Agent::new(
                AgentId(i),
                rng.gen_range(0.1..0.9),
                rng.gen_range(0.05..0.2),
                community,
            )
        })
        .collect();

    // Ring plus a couple of cross-community chords.
    let mut edges: Vec<Edge> = (0..12).map(|i| Edge::new(i, (i + 1) % 12)).collect();
    edges.push(Edge::weighted(0, 6, 0.5));
    edges.push(Edge::weighted(3, 9, 0.5));

    BeliefNetwork::new(agents, &edges, 0.6).unwrap()
}

fn histories(network: &BeliefNetwork) -> Vec<Vec<f64>> {
    network
        .agents()
        .iter()
        .map(|a| a.history().to_vec())
        .collect()
}

/// Test that the same seed reproduces every agent history exactly
#[test]
fn test_run_determinism() {
    let seed = 42u64;
    let config = RunConfig::new(80).with_noise_scale(0.01);

    // First run
    let mut first = build_network(7);
    run(&mut first, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    // Second run with same seed
    let mut second = build_network(7);
    run(&mut second, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    assert_eq!(
        histories(&first),
        histories(&second),
        "Same seed should reproduce identical histories"
    );
}

/// Test that different seeds diverge
#[test]
fn test_run_different_seeds() {
    let config = RunConfig::new(80).with_noise_scale(0.01);

    let mut first = build_network(7);
    run(&mut first, &config, &mut SmallRng::seed_from_u64(42)).unwrap();

    let mut second = build_network(7);
    run(&mut second, &config, &mut SmallRng::seed_from_u64(43)).unwrap();

    assert_ne!(
        first.all_beliefs(),
        second.all_beliefs(),
        "Different seeds should produce different trajectories"
    );
}

/// Test determinism with a delayed, scoped anchor in play
#[test]
fn test_anchored_run_determinism() {
    let seed = 1234u64;
    let config = RunConfig::new(60).with_noise_scale(0.005).with_anchor(
        Anchor::new(0.15)
            .with_strength(0.04)
            .starting_at(20)
            .for_agents([AgentId(2), AgentId(5), AgentId(8)]),
    );

    let mut first = build_network(11);
    run(&mut first, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    let mut second = build_network(11);
    run(&mut second, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    assert_eq!(
        histories(&first),
        histories(&second),
        "Anchored runs should be deterministic"
    );
}

/// Test determinism with a mid-run edge schedule in play
#[test]
fn test_scheduled_run_determinism() {
    let seed = 555u64;
    let config = RunConfig::new(60)
        .with_noise_scale(0.005)
        .with_edge_event(EdgeEvent {
            step: 15,
            edges: vec![Edge::weighted(1, 7, 0.8), Edge::weighted(2, 8, 0.8)],
        });

    let mut first = build_network(3);
    run(&mut first, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    let mut second = build_network(3);
    run(&mut second, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    assert_eq!(first.edge_count(), second.edge_count());
    assert_eq!(
        histories(&first),
        histories(&second),
        "Scheduled runs should be deterministic"
    );
}

/// Test that derived metrics and the serialized summary agree across runs
#[test]
fn test_summary_determinism() {
    let seed = 99u64;
    let config = RunConfig::new(40).with_noise_scale(0.01);

    let mut first = build_network(5);
    run(&mut first, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    let mut second = build_network(5);
    run(&mut second, &config, &mut SmallRng::seed_from_u64(seed)).unwrap();

    assert_eq!(first.polarization(), second.polarization());
    assert_eq!(first.echo_chamber_score(), second.echo_chamber_score());
    assert_eq!(first.community_means(), second.community_means());

    let summary1 = serde_json::to_string(&first.summary()).unwrap();
    let summary2 = serde_json::to_string(&second.summary()).unwrap();
    assert_eq!(summary1, summary2, "Serialized summaries should be identical");
}
