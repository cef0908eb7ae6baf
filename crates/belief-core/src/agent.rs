//! Agents: belief holders with bounded state and append-only history.
//!
//! An agent's belief always lives in [0, 1]. It is clamped at creation and
//! on every update, and every committed value is appended to the agent's
//! history, so `history.len()` is always the number of commits plus one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for an agent.
///
/// Ids are dense: a network of `n` agents uses exactly the ids `0..n`, and
/// the id doubles as the agent's index in the network's arena. `Ord` is
/// derived so id-keyed iteration is stable and deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Returns the id as an arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(id: u32) -> Self {
        AgentId(id)
    }
}

/// Five-bucket categorization of a belief value.
///
/// Buckets are half-open on the right except the last: [0, 0.2) through
/// [0.8, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    StrongDisbelief,
    Skeptical,
    Uncertain,
    Inclined,
    StrongBelief,
}

impl Stance {
    /// Categorizes a belief value into its stance bucket.
    pub fn from_belief(belief: f64) -> Self {
        if belief < 0.2 {
            Stance::StrongDisbelief
        } else if belief < 0.4 {
            Stance::Skeptical
        } else if belief < 0.6 {
            Stance::Uncertain
        } else if belief < 0.8 {
            Stance::Inclined
        } else {
            Stance::StrongBelief
        }
    }

    /// Human-readable form, e.g. for summary tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::StrongDisbelief => "strong disbelief",
            Stance::Skeptical => "skeptical",
            Stance::Uncertain => "uncertain",
            Stance::Inclined => "inclined",
            Stance::StrongBelief => "strong belief",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single belief holder.
///
/// Fields are private: belief and history change only through the network
/// commit path, and resistance, community, and label are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    id: AgentId,
    belief: f64,
    resistance: f64,
    community: String,
    label: Option<String>,
    history: Vec<f64>,
}

impl Agent {
    /// Creates an agent with the given starting belief.
    ///
    /// The belief is clamped into [0, 1] before it is stored and becomes
    /// the first entry of the history. Resistance is stored verbatim;
    /// callers keep it in [0, 1] (the fraction of social influence the
    /// agent rejects each step).
    pub fn new(
        id: AgentId,
        belief: f64,
        resistance: f64,
        community: impl Into<String>,
    ) -> Self {
        let belief = belief.clamp(0.0, 1.0);
        Self {
            id,
            belief,
            resistance,
            community: community.into(),
            label: None,
            history: vec![belief],
        }
    }

    /// Attaches a human-readable label, for key agents worth annotating.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The agent's identifier.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Current belief, always in [0, 1].
    pub fn belief(&self) -> f64 {
        self.belief
    }

    /// Fraction of social influence rejected each step.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Community label used for grouping in metrics.
    pub fn community(&self) -> &str {
        &self.community
    }

    /// Human-readable label, if one was attached.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Every belief this agent has held, oldest first. The last entry is
    /// always the current belief.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Stance bucket of the current belief.
    pub fn stance(&self) -> Stance {
        Stance::from_belief(self.belief)
    }

    /// Belief at a historical step, holding the last recorded value when
    /// `step` runs past the end of this agent's history.
    pub fn belief_at_step(&self, step: usize) -> f64 {
        self.history.get(step).copied().unwrap_or(self.belief)
    }

    /// Commits a new belief: clamps into [0, 1], appends to history, and
    /// makes it current. Only the network's commit path calls this.
    pub(crate) fn update(&mut self, new_belief: f64) {
        self.belief = new_belief.clamp(0.0, 1.0);
        self.history.push(self.belief);
    }
}
