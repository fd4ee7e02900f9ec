//! One-shot training plan generator.
//!
//! Reads an athlete profile as JSON, asks the model for a weekly plan, and
//! prints it to stdout. Logs go to stderr. Reads the API key from the
//! `OPENROUTER_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Generate from a profile file
//! coach generate --profile athlete.json > plan.md
//!
//! # Pipe the profile in and inspect the prompt without calling the API
//! cat athlete.json | coach generate --stdin --dry-run
//!
//! # Record feedback on a plan; the next generation sees it
//! coach feedback --plan plan.md --text "too hard, knees sore after runs"
//!
//! # Show stored plan/feedback pairs
//! coach history
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use coach_rs::config::{
    CoachConfig, DEFAULT_HISTORY_PATH, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
use coach_rs::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate hybrid strength, gymnastics, and running plans with an LLM.
#[derive(Parser)]
#[command(name = "coach")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model to use for completions.
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens in the generated plan.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, global = true, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// OpenAI-compatible chat-completions URL (default: OpenRouter).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Plan/feedback history file.
    #[arg(long, global = true, default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a plan for the given profile.
    Generate {
        /// Path to a JSON athlete profile.
        #[arg(long, conflicts_with = "stdin")]
        profile: Option<PathBuf>,

        /// Read the JSON profile from stdin.
        #[arg(long)]
        stdin: bool,

        /// Ignore stored history for this generation.
        #[arg(long)]
        no_history: bool,

        /// Print the prompt instead of calling the API.
        #[arg(long)]
        dry_run: bool,
    },
    /// Store feedback on a previously generated plan.
    Feedback {
        /// File holding the plan text the feedback refers to.
        #[arg(long)]
        plan: PathBuf,

        /// The athlete's feedback.
        #[arg(long)]
        text: String,
    },
    /// Print the stored plan/feedback history as JSON.
    History,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    let config = CoachConfig {
        model: cli.model,
        max_tokens: cli.max_tokens,
        temperature: cli.temperature,
        api_url: cli.api_url,
        history_path: Some(cli.history.clone()),
    };
    let history = JsonFileHistory::new(&cli.history);

    match cli.command {
        Command::Generate {
            profile,
            stdin,
            no_history,
            dry_run,
        } => {
            let profile = read_profile(profile, stdin)?;
            let recent_history: Box<dyn HistoryLog> = if no_history {
                Box::new(InMemoryHistory::new())
            } else {
                Box::new(history)
            };

            if dry_run {
                let recent = recent_history.recent(coach_rs::history::RECENT_HISTORY_LEN)?;
                println!("{}", build_prompt(&profile, &recent));
                return Ok(());
            }

            let client = config.build_client()?;
            let coach = Coach::new(&client, recent_history.as_ref(), config.generation_params());
            let plan = coach.generate_plan(&profile).await?;
            println!("{plan}");
            info!("Usage: {}", client.usage_summary());
            Ok(())
        }
        Command::Feedback { plan, text } => {
            if text.trim().is_empty() {
                return Err("feedback is empty; nothing was saved".into());
            }
            let plan = std::fs::read_to_string(&plan)
                .map_err(|e| format!("failed to read plan {}: {e}", plan.display()))?;
            history.append(HistoryEntry::new(plan, text))?;
            info!("Feedback saved to {}", history.path().display());
            Ok(())
        }
        Command::History => {
            let entries = history.load()?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
    }
}

fn read_profile(
    path: Option<PathBuf>,
    stdin: bool,
) -> Result<AthleteProfile, Box<dyn std::error::Error>> {
    let json = match (path, stdin) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read profile {}: {e}", path.display()))?,
        (None, true) => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (None, false) => return Err("provide --profile <FILE> or --stdin".into()),
    };
    Ok(serde_json::from_str(&json).map_err(|e| format!("invalid profile JSON: {e}"))?)
}
