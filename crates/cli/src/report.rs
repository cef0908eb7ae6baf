//! JSON run reports.
//!
//! One pretty-printed document per completed run, written to
//! `<out_dir>/<key>_report.json`. Reports capture everything a reader
//! needs to revisit the run without the console scrollback: the seed, the
//! final aggregate, the per-community trajectory, and where the named
//! agents ended up.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use belief_core::{BeliefNetwork, NetworkSummary, Stance};
use scenarios::ScenarioInfo;

/// A complete run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Scenario registry key.
    pub scenario: String,
    /// Scenario display name.
    pub name: String,
    /// Seed the run was built and driven from.
    pub seed: u64,
    /// Final aggregate state.
    pub summary: NetworkSummary,
    /// Mean belief per community at every recorded step.
    pub community_history: BTreeMap<String, Vec<f64>>,
    /// Named agents and where they ended up.
    pub labeled_agents: Vec<LabeledAgentReport>,
}

/// One labeled agent's final state.
#[derive(Debug, Clone, Serialize)]
pub struct LabeledAgentReport {
    pub id: u32,
    pub label: String,
    pub community: String,
    pub belief: f64,
    pub stance: Stance,
}

impl RunReport {
    /// Captures a finished run.
    pub fn new(info: &ScenarioInfo, seed: u64, network: &BeliefNetwork) -> Self {
        let labeled_agents = network
            .labeled_agents()
            .iter()
            .map(|agent| LabeledAgentReport {
                id: agent.id().0,
                label: agent.label().unwrap_or_default().to_string(),
                community: agent.community().to_string(),
                belief: agent.belief(),
                stance: agent.stance(),
            })
            .collect();

        Self {
            scenario: info.key.to_string(),
            name: info.name.to_string(),
            seed,
            summary: network.summary(),
            community_history: network.community_history(),
            labeled_agents,
        }
    }
}

/// Writes the report under `out_dir`, creating the directory on demand.
///
/// Returns the path written.
pub fn write_report(report: &RunReport, out_dir: &Path) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(out_dir).map_err(ReportError::Io)?;
    let path = out_dir.join(format!("{}_report.json", report.scenario));
    let json = serde_json::to_string_pretty(report).map_err(ReportError::Serialization)?;
    fs::write(&path, json).map_err(ReportError::Io)?;
    Ok(path)
}

/// Errors that can occur while writing a run report.
#[derive(Debug)]
pub enum ReportError {
    /// IO error creating the directory or writing the file
    Io(std::io::Error),
    /// Error serializing the report to JSON
    Serialization(serde_json::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "IO error: {}", e),
            ReportError::Serialization(e) => write!(f, "JSON serialize error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
            ReportError::Serialization(e) => Some(e),
        }
    }
}
