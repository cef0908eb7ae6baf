//! Built-in scenarios: preset populations with ready run configurations.
//!
//! The registry maps stable keys to menu metadata; `build` constructs the
//! named scenario from a single seed, threading one generator through
//! topology and population draws so identical seeds reproduce identical
//! networks.

pub mod presets;
pub mod topology;

use std::fmt;

use belief_core::{BeliefNetwork, NetworkError, RunConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Registry entry describing one scenario for menus and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioInfo {
    /// Stable lookup key.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// The question the scenario explores.
    pub question: &'static str,
}

/// Every built-in scenario, in menu order.
pub static SCENARIOS: [ScenarioInfo; 5] = [
    ScenarioInfo {
        key: "long_slide",
        name: "The Long Slide",
        description: "A moderate community polarizes slowly through homophily alone.",
        question: "How does a fair-minded community become entrenched without bad actors?",
    },
    ScenarioInfo {
        key: "bridger",
        name: "The Bridger",
        description: "Two polarized communities share one connecting agent.",
        question: "Can one person genuinely bridge two worlds?",
    },
    ScenarioInfo {
        key: "evidence",
        name: "The Evidence",
        description: "Ground truth enters an echo chamber through peripheral agents.",
        question: "How does evidence propagate (or fail to propagate) through closed systems?",
    },
    ScenarioInfo {
        key: "cascade",
        name: "The Cascade",
        description: "A high-degree influencer changes their belief mid-simulation.",
        question: "How fast does a hub's belief change cascade through a scale-free network?",
    },
    ScenarioInfo {
        key: "reconstruction",
        name: "The Reconstruction",
        description: "An embedded agent begins questioning, then forms new connections.",
        question: "What happens to a community when one member finds new information?",
    },
];

/// A constructed scenario: the population plus its run configuration.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// The registry entry this scenario was built from.
    pub info: ScenarioInfo,
    /// The constructed population.
    pub network: BeliefNetwork,
    /// Ready-to-run engine configuration.
    pub config: RunConfig,
}

/// Scenario construction failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// The key matches no registry entry.
    UnknownScenario(String),
    /// The generated population failed structural validation.
    Network(NetworkError),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::UnknownScenario(key) => {
                let known: Vec<&str> = SCENARIOS.iter().map(|info| info.key).collect();
                write!(
                    f,
                    "unknown scenario \"{}\"; known scenarios: {}",
                    key,
                    known.join(", ")
                )
            }
            ScenarioError::Network(e) => write!(f, "scenario construction failed: {}", e),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NetworkError> for ScenarioError {
    fn from(e: NetworkError) -> Self {
        ScenarioError::Network(e)
    }
}

/// Looks up a registry entry by key.
pub fn lookup(key: &str) -> Option<&'static ScenarioInfo> {
    SCENARIOS.iter().find(|info| info.key == key)
}

/// Builds the named scenario from a seed.
pub fn build(key: &str, seed: u64) -> Result<Scenario, ScenarioError> {
    let info = lookup(key).ok_or_else(|| ScenarioError::UnknownScenario(key.to_string()))?;

    let mut rng = SmallRng::seed_from_u64(seed);
    let (network, config) = match info.key {
        "long_slide" => presets::long_slide(&mut rng)?,
        "bridger" => presets::bridger(&mut rng)?,
        "evidence" => presets::evidence(&mut rng)?,
        "cascade" => presets::cascade(&mut rng)?,
        "reconstruction" => presets::reconstruction(&mut rng)?,
        other => return Err(ScenarioError::UnknownScenario(other.to_string())),
    };

    Ok(Scenario {
        info: *info,
        network,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_registry_keys_are_unique() {
        let keys: BTreeSet<&str> = SCENARIOS.iter().map(|info| info.key).collect();
        assert_eq!(keys.len(), SCENARIOS.len());
    }

    #[test]
    fn test_lookup() {
        let info = lookup("bridger").unwrap();
        assert_eq!(info.name, "The Bridger");
        assert!(lookup("does_not_exist").is_none());
    }

    #[test]
    fn test_build_every_registered_scenario() {
        for info in &SCENARIOS {
            let scenario = build(info.key, 42).unwrap();
            assert_eq!(scenario.info.key, info.key);
            assert!(scenario.network.agent_count() > 0, "{} is empty", info.key);
            assert!(scenario.network.edge_count() > 0);
            assert!(scenario.config.steps > 0);
        }
    }

    #[test]
    fn test_build_unknown_key() {
        let err = build("downfall", 42).unwrap_err();
        assert_eq!(err, ScenarioError::UnknownScenario("downfall".into()));
        let message = err.to_string();
        assert!(message.contains("downfall"));
        assert!(message.contains("long_slide"));
    }

    #[test]
    fn test_build_is_deterministic_per_seed() {
        for info in &SCENARIOS {
            let first = build(info.key, 7).unwrap();
            let second = build(info.key, 7).unwrap();
            assert_eq!(
                first.network.all_beliefs(),
                second.network.all_beliefs(),
                "{} beliefs varied under one seed",
                info.key
            );
            assert_eq!(
                first.network.graph().edges().collect::<Vec<_>>(),
                second.network.graph().edges().collect::<Vec<_>>(),
                "{} edges varied under one seed",
                info.key
            );
        }
    }

    #[test]
    fn test_build_varies_across_seeds() {
        let first = build("long_slide", 1).unwrap();
        let second = build("long_slide", 2).unwrap();
        assert_ne!(first.network.all_beliefs(), second.network.all_beliefs());
    }
}
