//! Interactive terminal coach.
//!
//! Fill in the program form, generate a plan, give feedback, and get the
//! next plan with that feedback folded in. Reads the API key from the
//! `OPENROUTER_KEY` environment variable.
//!
//! ```sh
//! OPENROUTER_KEY=sk-... cargo run -p coach-tui
//! OPENROUTER_KEY=sk-... cargo run -p coach-tui -- --history ~/.coach/history.json
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use coach_rs::config::{
    CoachConfig, DEFAULT_HISTORY_PATH, DEFAULT_MODEL, DEFAULT_TEMPERATURE, TUI_MAX_TOKENS,
};
use coach_rs::prelude::*;
use coach_rs::ui::tracing::UiTracingLayer;
use coach_rs::ui::{UiState, apply_step, begin_request, set_history_len, show_warning};
use coach_tui::{TuiCommand, TuiConfig, spawn_tui};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Interactive terminal coach.
#[derive(Parser)]
#[command(name = "coach-tui")]
struct Cli {
    /// Model to use for completions.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens per generated plan.
    #[arg(long, default_value_t = TUI_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// OpenAI-compatible chat-completions URL (default: OpenRouter).
    #[arg(long)]
    api_url: Option<String>,

    /// Plan/feedback history file.
    #[arg(long, default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = CoachConfig {
        model: cli.model,
        max_tokens: cli.max_tokens,
        temperature: cli.temperature,
        api_url: cli.api_url,
        history_path: Some(cli.history.clone()),
    };

    let client = match config.build_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let history = JsonFileHistory::new(&cli.history);

    let ui_state = Arc::new(Mutex::new(UiState {
        model: config.model.clone(),
        ..Default::default()
    }));

    // Tracing → TUI log pane.
    let (tracing_layer, log_buffer) = UiTracingLayer::new();
    tracing_subscriber::registry().with(tracing_layer).init();

    let (commands, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let tui_handle = spawn_tui(
        ui_state.clone(),
        TuiConfig {
            commands,
            log_buffer: Some(log_buffer),
        },
    );

    refresh_history_len(&ui_state, &history);
    info!("History file: {}", history.path().display());

    let coach = Coach::new(&client, &history, config.generation_params());
    let mut session = CoachSession::new();

    // Ends when the TUI thread exits and drops its sender.
    while let Some(command) = rx.recv().await {
        let step = match command {
            TuiCommand::Generate(profile) => {
                begin_request(&ui_state, "Generating plan...");
                coach.generate(std::mem::take(&mut session), &profile).await
            }
            TuiCommand::Feedback { profile, text } => {
                begin_request(&ui_state, "Saving feedback and regenerating...");
                coach
                    .submit_feedback(std::mem::take(&mut session), &profile, &text)
                    .await
            }
        };
        apply_step(&ui_state, &step);
        session = step.session;
        refresh_history_len(&ui_state, &history);
    }

    if let Ok(mut s) = ui_state.lock() {
        s.running = false;
    }
    if tui_handle.join().is_err() {
        eprintln!("Error: TUI thread panicked");
        std::process::exit(1);
    }
    // The log pane is gone by now; print to the restored terminal.
    eprintln!("Usage: {}", client.usage_summary());
}

fn refresh_history_len(state: &Arc<Mutex<UiState>>, history: &JsonFileHistory) {
    match history.load() {
        Ok(entries) => set_history_len(state, entries.len()),
        Err(e) => {
            warn!("Could not read history: {e}");
            show_warning(state, &format!("History unreadable: {e}"));
        }
    }
}
