//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uigraph_core::config::HashConfig;

/// Build and inspect UI exploration graphs.
///
/// Loads widget snapshots (one JSON file per observed screen), abstracts them
/// into states and reports the identities and actions the model derives.
/// Output is JSON on stdout; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "uigraph", version)]
pub struct Cli {
    #[command(flatten)]
    pub hash: HashFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Abstract one snapshot into a state and print its identity
    #[command(after_help = "\
Examples:
  uigraph hash screen.json                  # Default abstraction
  uigraph --with-text hash screen.json      # Short texts split states
  uigraph --widget-order hash screen.json   # Widget order matters")]
    Hash(HashArgs),

    /// Admit snapshots into one graph, in order, and report admissions
    #[command(after_help = "\
Examples:
  uigraph replay a.json b.json a.json       # Third admission reuses the first state
  UIGRAPH_WITH_INDEX=1 uigraph replay *.json")]
    Replay(ReplayArgs),

    /// Print the action type table with priorities
    Actions,
}

/// Overrides for the state-abstraction configuration.
///
/// Flags only switch features on; leave them out to keep the value from the
/// environment.
#[derive(Debug, Default, Args)]
pub struct HashFlags {
    /// Combine widget identities in document order
    #[arg(long, global = true)]
    pub widget_order: bool,

    /// Fold short widget texts into widget identity
    #[arg(long, global = true)]
    pub with_text: bool,

    /// Widest text (in columns) that still counts towards identity
    #[arg(long, global = true, value_name = "COLUMNS")]
    pub text_max_width: Option<usize>,

    /// Fold the sibling index into widget identity
    #[arg(long, global = true)]
    pub with_index: bool,

    /// Offer SCROLL_BOTTOM_UP_N on list widgets
    #[arg(long, global = true)]
    pub scroll_bottom_up_n: bool,
}

impl HashFlags {
    /// Apply the flags on top of `config`.
    pub fn apply(&self, mut config: HashConfig) -> HashConfig {
        config.widget_order |= self.widget_order;
        config.with_text |= self.with_text;
        config.with_index |= self.with_index;
        config.scroll_bottom_up_n |= self.scroll_bottom_up_n;
        if let Some(width) = self.text_max_width {
            config.text_max_width = width;
        }
        config
    }
}

#[derive(Debug, Args)]
pub struct HashArgs {
    /// Snapshot file (`{"activity": ..., "widgets": [...]}`)
    pub snapshot: PathBuf,

    /// Also list every derived action
    #[arg(short, long)]
    pub actions: bool,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Snapshot files, admitted in the given order
    #[arg(required = true)]
    pub snapshots: Vec<PathBuf>,
}
