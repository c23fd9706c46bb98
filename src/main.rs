use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use taskmill::stages::{ValidatorConfig, validate_assignments};
use taskmill::{
    BatchOutput, Roster, RuleSet, TaskReport, load_roster_file, read_transcript, run_pipeline,
};

#[derive(Parser)]
#[command(name = "taskmill")]
#[command(author, version, about = "Meeting transcript task extraction and assignment pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a transcript into an assigned, ordered task batch
    Process {
        /// Input transcript file (plain text)
        #[arg(short, long)]
        input: PathBuf,

        /// Team roster file (JSON)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Output file for the task batch (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable report (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Processing-time anchor as RFC 3339; defaults to now
        #[arg(long)]
        anchor: Option<String>,

        /// Rule table file overriding the built-in heuristics (JSON)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Re-check a processed batch against a roster snapshot
    Validate {
        /// Task batch file produced by `process` (JSON)
        #[arg(short, long)]
        tasks: PathBuf,

        /// Team roster file (JSON)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Flag assignments below this confidence
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Rule table file overriding the built-in heuristics (JSON)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output file for suggestions (JSON); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            roster,
            output,
            human_readable,
            anchor,
            rules,
            verbose,
        } => {
            setup_logging(verbose);
            process_transcript(input, roster, output, human_readable, anchor, rules)
        }
        Commands::Validate {
            tasks,
            roster,
            threshold,
            rules,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            validate_batch(tasks, roster, threshold, rules, output)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn process_transcript(
    input: PathBuf,
    roster_path: Option<PathBuf>,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    anchor: Option<String>,
    rules_path: Option<PathBuf>,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = read_transcript(&input)?;

    let roster = load_roster(roster_path)?;
    info!("Roster snapshot: {} members", roster.len());

    let rules = match rules_path {
        Some(path) => RuleSet::from_file(&path)?,
        None => RuleSet::default(),
    };

    let anchor = parse_anchor(anchor)?;
    info!("Processing anchor: {}", anchor);

    let result = run_pipeline(&transcript, &roster, anchor, &rules);

    info!(
        "Pipeline complete: {} sentences, {} tasks, {} edges, cycles={}",
        result.sentences.len(),
        result.tasks.len(),
        result.graph.edges.len(),
        result.graph.has_cycles
    );
    for diagnostic in &result.diagnostics {
        info!(
            "Diagnostic [{}] task {:?}: {}",
            diagnostic.stage, diagnostic.task_id, diagnostic.message
        );
    }

    let batch = BatchOutput::from_result(&result, anchor);
    batch.write_json(&output)?;
    info!("Output written to {:?}", output);

    if let Some(path) = human_readable {
        TaskReport::new(&result).write_file(&path)?;
        info!("Human-readable report written to {:?}", path);
    }

    Ok(())
}

fn validate_batch(
    tasks_path: PathBuf,
    roster_path: Option<PathBuf>,
    threshold: f64,
    rules_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    info!("Loading batch from {:?}", tasks_path);
    let batch = BatchOutput::read_json(&tasks_path)?;
    let tasks: Vec<_> = batch.tasks.into_iter().map(|record| record.into_task()).collect();

    let roster = load_roster(roster_path)?;
    info!("Roster snapshot: {} members", roster.len());

    let config = ValidatorConfig {
        confidence_threshold: threshold,
        ..Default::default()
    };
    let rules = match rules_path {
        Some(path) => RuleSet::from_file(&path)?,
        None => RuleSet::default(),
    };
    let suggestions = validate_assignments(&tasks, &roster, &rules.roles, &config);

    let rendered =
        serde_json::to_string_pretty(&suggestions).context("Failed to serialize suggestions")?;
    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write suggestions: {:?}", path))?;
            info!("Suggestions written to {:?}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn load_roster(path: Option<PathBuf>) -> Result<Roster> {
    match path {
        Some(path) => Ok(load_roster_file(&path)?),
        // no roster file means an empty snapshot; tasks stay unassigned
        None => Ok(Roster::default()),
    }
}

fn parse_anchor(anchor: Option<String>) -> Result<DateTime<Utc>> {
    match anchor {
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(&text)
                .with_context(|| format!("Invalid anchor timestamp: {:?}", text))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}
