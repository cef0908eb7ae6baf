//! Plain-text rendering for the menu, scenario panels, and summaries.
//!
//! Everything returns a `String`; callers decide where it goes.

use belief_core::NetworkSummary;
use scenarios::ScenarioInfo;

/// A proportion bar: `round(value * width)` filled characters, dot-padded.
pub fn bar(value: f64, width: usize) -> String {
    let filled = ((value * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

/// The scenario table shown before the interactive prompt.
pub fn menu(infos: &[ScenarioInfo]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<16} {:<22} {}\n", "Key", "Scenario", "Question"));
    out.push_str(&format!("{:<16} {:<22} {}\n", "---", "--------", "--------"));
    for info in infos {
        out.push_str(&format!(
            "{:<16} {:<22} {}\n",
            info.key, info.name, info.question
        ));
    }
    out.push_str("\nType a key, \"all\" to run everything, or \"quit\" to exit.\n");
    out
}

/// The panel introducing one scenario.
pub fn scenario_panel(info: &ScenarioInfo) -> String {
    format!(
        "=== {} ===\n{}\nQuestion: {}\n",
        info.name, info.description, info.question
    )
}

/// The final-state table for one completed run.
pub fn summary_table(summary: &NetworkSummary, bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<26} {}\n", "Steps simulated", summary.steps));
    out.push_str(&format!("{:<26} {}\n", "Agents", summary.agents));
    out.push_str(&format!("{:<26} {}\n", "Connections", summary.edges));
    out.push_str(&format!(
        "{:<26} {:.4}\n",
        "Overall mean belief", summary.overall_mean
    ));
    out.push_str(&format!(
        "{:<26} {:.4}  {}\n",
        "Polarization",
        summary.polarization,
        bar(summary.polarization, bar_width)
    ));
    out.push_str(&format!(
        "{:<26} {:.4}  {}\n",
        "Echo chamber score",
        summary.echo_chamber_score,
        bar(summary.echo_chamber_score, bar_width)
    ));
    for (community, mean) in &summary.community_means {
        out.push_str(&format!(
            "{:<26} {:.4}  {}\n",
            format!("  [{}] mean belief", community),
            mean,
            bar(*mean, bar_width)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use belief_core::{Agent, AgentId, BeliefNetwork, Edge};

    #[test]
    fn test_bar_extremes() {
        assert_eq!(bar(0.0, 20), "....................");
        assert_eq!(bar(1.0, 20), "####################");
    }

    #[test]
    fn test_bar_rounds_to_nearest_cell() {
        assert_eq!(bar(0.5, 20), "##########..........");
        assert_eq!(bar(0.26, 20), "#####...............");
        assert_eq!(bar(0.24, 10), "##........");
    }

    #[test]
    fn test_bar_clamps_overflow() {
        assert_eq!(bar(1.7, 10), "##########");
        assert_eq!(bar(-0.3, 10), "..........");
    }

    #[test]
    fn test_menu_lists_every_scenario() {
        let rendered = menu(&scenarios::SCENARIOS);
        for info in &scenarios::SCENARIOS {
            assert!(rendered.contains(info.key), "menu misses {}", info.key);
            assert!(rendered.contains(info.name));
        }
        assert!(rendered.contains("quit"));
        assert!(rendered.contains("all"));
    }

    #[test]
    fn test_scenario_panel_contents() {
        let info = scenarios::lookup("bridger").unwrap();
        let panel = scenario_panel(info);
        assert!(panel.contains("The Bridger"));
        assert!(panel.contains("Question: Can one person genuinely bridge two worlds?"));
    }

    #[test]
    fn test_summary_table_layout() {
        let agents = vec![
            Agent::new(AgentId(0), 0.5, 0.1, "north"),
            Agent::new(AgentId(1), 0.5, 0.1, "south"),
        ];
        let network = BeliefNetwork::new(agents, &[Edge::new(0, 1)], 0.5).unwrap();
        let rendered = summary_table(&network.summary(), 20);

        let line = |prefix: &str| {
            rendered
                .lines()
                .find(|l| l.trim_start().starts_with(prefix))
                .unwrap_or_else(|| panic!("no row starting with {:?}", prefix))
                .to_string()
        };

        assert!(line("Steps simulated").ends_with('0'));
        assert!(line("Agents").ends_with('2'));
        assert!(line("Connections").ends_with('1'));
        assert!(line("Overall mean belief").ends_with("0.5000"));
        // Both endpoints agree, so the echo bar is full.
        assert!(line("Echo chamber score").ends_with("1.0000  ####################"));
        assert!(line("[north] mean belief").contains("0.5000"));
        assert!(line("[south] mean belief").contains("0.5000"));
    }
}
