//! ForkSwitch CLI
//!
//! Developer harness for the parts of the extension that break silently:
//! replay recorded button snapshots through the planner and recorded
//! mutation batches through the classifier, without a browser in the loop.

use std::fs;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use fsw_core::classify::{batch_impact, ChangeRecord, NodeInterest, WatchedAttr};
use fsw_core::{plan_button, ButtonSnapshot, Fork};

#[derive(Parser)]
#[command(name = "fsw-cli")]
#[command(about = "ForkSwitch planning and classification tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported forks
    Forks,

    /// Plan the edits for recorded button snapshots
    Plan {
        /// JSON file with an array of {href, label, marked} objects
        #[arg(short, long)]
        input: String,

        /// Target fork identifier
        #[arg(short, long, default_value = "codium")]
        fork: String,
    },

    /// Classify a recorded mutation batch
    Classify {
        /// JSON file with an array of change-record objects
        #[arg(short, long)]
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Forks => cmd_forks(),
        Commands::Plan { input, fork } => cmd_plan(&input, &fork),
        Commands::Classify { input } => cmd_classify(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_forks() -> Result<(), String> {
    println!("{:<10} {:<20} {}", "id", "label", "href prefix");
    for fork in Fork::ALL {
        println!(
            "{:<10} {:<20} {}",
            fork.id(),
            fork.install_label(),
            fork.href_prefix()
        );
    }
    Ok(())
}

// =============================================================================
// plan
// =============================================================================

#[derive(Deserialize)]
struct SnapshotFixture {
    href: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    marked: bool,
}

fn cmd_plan(input: &str, fork_id: &str) -> Result<(), String> {
    let fork: Fork = fork_id.parse().map_err(|e| format!("{e}"))?;

    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let fixtures: Vec<SnapshotFixture> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse '{}': {}", input, e))?;

    let mut writes = 0usize;
    for (index, fixture) in fixtures.iter().enumerate() {
        let snapshot = ButtonSnapshot {
            href: fixture.href.clone(),
            label: fixture.label.clone(),
            marked: fixture.marked,
        };
        let plan = plan_button(&snapshot, fork);

        println!("[{}] {}", index, fixture.href);
        match &plan.href {
            Some(href) => println!("    href  -> {}", href),
            None => println!("    href     unchanged"),
        }
        match plan.label {
            Some(label) => println!("    label -> {:?}", label),
            None => println!("    label    unchanged"),
        }
        println!("    mark     {}", if plan.mark { "yes" } else { "no" });
        if !plan.is_noop() {
            writes += 1;
        }
    }

    println!();
    println!(
        "Planned {} button(s) for '{}', {} needing writes",
        fixtures.len(),
        fork.id(),
        writes
    );
    Ok(())
}

// =============================================================================
// classify
// =============================================================================

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RecordFixture {
    NodesChanged {
        touches_button: bool,
    },
    AttributeChanged {
        target: String,
        attr: String,
        #[serde(default)]
        marker_present: bool,
    },
    TextChanged {
        in_label: bool,
    },
}

impl RecordFixture {
    fn into_record(self) -> Result<ChangeRecord, String> {
        Ok(match self {
            RecordFixture::NodesChanged { touches_button } => {
                ChangeRecord::NodesChanged { touches_button }
            }
            RecordFixture::AttributeChanged {
                target,
                attr,
                marker_present,
            } => ChangeRecord::AttributeChanged {
                target: match target.as_str() {
                    "link" => NodeInterest::Link,
                    "container" => NodeInterest::Container,
                    "other" => NodeInterest::Other,
                    other => return Err(format!("unknown target {other:?}")),
                },
                attr: WatchedAttr::from_name(&attr)
                    .ok_or_else(|| format!("unwatched attribute {attr:?}"))?,
                marker_present,
            },
            RecordFixture::TextChanged { in_label } => ChangeRecord::TextChanged { in_label },
        })
    }
}

fn cmd_classify(input: &str) -> Result<(), String> {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let fixtures: Vec<RecordFixture> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse '{}': {}", input, e))?;

    let batch = fixtures
        .into_iter()
        .map(RecordFixture::into_record)
        .collect::<Result<Vec<_>, _>>()?;

    for (index, record) in batch.iter().enumerate() {
        println!("[{}] {:?}", index, record);
    }

    let impact = batch_impact(&batch);
    println!();
    println!("Impact:   {:?}", impact);
    println!(
        "Verdict:  {}",
        if impact.is_empty() {
            "irrelevant (no reconcile pass)"
        } else {
            "relevant (schedule a reconcile pass)"
        }
    );
    Ok(())
}
