//! uigraph CLI entry point.

mod args;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uigraph_core::action::ActionType;
use uigraph_core::config::HashConfig;
use uigraph_core::error::ModelError;
use uigraph_core::graph::Graph;
use uigraph_core::hash::HashNode;
use uigraph_core::node::{Node, Serializable};
use uigraph_core::state::State;
use uigraph_core::widget::WidgetSpec;

use crate::args::{Cli, Commands, HashArgs, ReplayArgs};

/// One observed screen as written by a device-side dumper.
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    activity: String,
    #[serde(default)]
    widgets: Vec<WidgetSpec>,
}

#[derive(Debug, Serialize)]
struct StateReport {
    id: String,
    hash: String,
    activity: String,
    widgets: usize,
    actions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_list: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct Admission {
    file: String,
    new: bool,
    state: StateReport,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    admissions: Vec<Admission>,
    states: usize,
    actions: u64,
    unvisited_actions: usize,
    visited_activities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ActionTypeReport {
    name: &'static str,
    priority: i32,
    requires_target: bool,
    model_act: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli
        .hash
        .apply(HashConfig::from_env().context("Invalid UIGRAPH_* environment")?);
    debug!("Using {:?}", config);

    match cli.command {
        Commands::Hash(args) => run_hash(&args, &config),
        Commands::Replay(args) => run_replay(&args, &config),
        Commands::Actions => print_json(&action_table()),
    }
}

fn run_hash(args: &HashArgs, config: &HashConfig) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let mut graph = Graph::new();
    let state = graph.add_state(State::create(
        snapshot.activity,
        &snapshot.widgets,
        config,
    ))?;
    print_json(&describe_state(&state, args.actions))
}

fn run_replay(args: &ReplayArgs, config: &HashConfig) -> anyhow::Result<()> {
    let mut graph = Graph::new();
    let mut admissions = Vec::with_capacity(args.snapshots.len());

    for path in &args.snapshots {
        let snapshot = load_snapshot(path)?;
        let before = graph.state_count();
        let state = graph
            .add_state(State::create(snapshot.activity, &snapshot.widgets, config))
            .with_context(|| format!("Failed to admit {}", path.display()))?;
        let new = graph.state_count() > before;
        state.visit(graph.timestamp());
        debug!("Admitted {} as {}", path.display(), state.serialize());

        admissions.push(Admission {
            file: path.display().to_string(),
            new,
            state: describe_state(&state, false),
        });
    }

    info!(
        "Replayed {} snapshots into {} states",
        admissions.len(),
        graph.state_count()
    );

    print_json(&ReplayReport {
        admissions,
        states: graph.state_count(),
        actions: graph.action_count(),
        unvisited_actions: graph.unvisited_action_count(),
        visited_activities: graph.visited_activities().iter().cloned().collect(),
    })
}

fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_snapshot(&text).with_context(|| format!("Failed to load {}", path.display()))
}

fn parse_snapshot(text: &str) -> Result<Snapshot, ModelError> {
    serde_json::from_str(text).map_err(|e| ModelError::invalid_snapshot(e.to_string()))
}

fn describe_state(state: &Arc<State>, with_actions: bool) -> StateReport {
    StateReport {
        id: state.id(),
        hash: format!("{:016x}", state.hash_code()),
        activity: state.activity().to_string(),
        widgets: state.widgets().len(),
        actions: state.actions().len(),
        action_list: with_actions
            .then(|| state.actions().iter().map(|a| a.serialize()).collect()),
    }
}

fn action_table() -> Vec<ActionTypeReport> {
    ActionType::ALL
        .iter()
        .map(|action| ActionTypeReport {
            name: action.name(),
            priority: action.priority(),
            requires_target: action.requires_target(),
            model_act: action.is_model_act(),
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "activity": "com.example.MainActivity",
        "widgets": [
            {
                "class": "android.widget.Button",
                "resource_id": "com.example:id/ok",
                "clickable": true,
                "enabled": true,
                "bounds": {"left": 0, "top": 0, "right": 100, "bottom": 50}
            },
            {
                "class": "android.widget.ScrollView",
                "scrollable": true,
                "enabled": true,
                "bounds": {"left": 0, "top": 50, "right": 100, "bottom": 500}
            }
        ]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = parse_snapshot(SNAPSHOT).unwrap();
        assert_eq!(snapshot.activity, "com.example.MainActivity");
        assert_eq!(snapshot.widgets.len(), 2);
        assert!(snapshot.widgets[0].clickable);
    }

    #[test]
    fn test_parse_snapshot_defaults() {
        let snapshot = parse_snapshot("{}").unwrap();
        assert!(snapshot.activity.is_empty());
        assert!(snapshot.widgets.is_empty());
    }

    #[test]
    fn test_parse_snapshot_rejects_garbage() {
        let err = parse_snapshot("not json").unwrap_err();
        assert_eq!(err.code(), "INVALID_SNAPSHOT");
    }

    #[test]
    fn test_describe_state() {
        let snapshot = parse_snapshot(SNAPSHOT).unwrap();
        let mut graph = Graph::new();
        let state = graph
            .add_state(State::create(
                snapshot.activity,
                &snapshot.widgets,
                &HashConfig::default(),
            ))
            .unwrap();

        let report = describe_state(&state, true);
        assert_eq!(report.id, "g0s0");
        assert_eq!(report.hash.len(), 16);
        assert_eq!(report.widgets, 2);
        // click, two vertical scrolls, back
        assert_eq!(report.actions, 4);
        assert_eq!(report.action_list.as_ref().map(Vec::len), Some(4));

        let json = serde_json::to_value(describe_state(&state, false)).unwrap();
        assert!(json.get("action_list").is_none());
    }

    #[test]
    fn test_action_table() {
        let table = action_table();
        assert_eq!(table.len(), ActionType::COUNT);
        let click = table.iter().find(|row| row.name == "CLICK").unwrap();
        assert_eq!(click.priority, 4);
        assert!(click.requires_target);
    }
}
