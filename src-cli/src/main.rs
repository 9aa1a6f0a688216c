mod commands;
mod config;
mod constants;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use generation::{GenerationClient, GenerationConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use viz_engine::{HistoryStore, JsonFilePersistence, Session};

use commands::{execute, Command, Flow};
use config::AppConfig;
use constants::{paths, repl};

#[derive(Parser, Debug)]
#[command(
    name = "promptviz",
    version,
    about = "Turn prompts into Mermaid diagrams, charts and SVG",
    long_about = "Interactive session for generating, refining and editing visualizations. \
                  Set PROMPTVIZ_API_KEY (or GEMINI_API_KEY) before generating."
)]
struct Cli {
    /// Directory holding config.json and history.json
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Model to use; remembered in config.json
    #[arg(long, value_name = "NAME")]
    model: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging - RUST_LOG overrides the default filter
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    log::info!("promptviz starting...");

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    let mut app_config = match AppConfig::load(&data_dir).await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };

    if let Some(model) = cli.model {
        if app_config.model.as_deref() != Some(model.as_str()) {
            app_config.model = Some(model);
            if let Err(e) = app_config.save(&data_dir).await {
                log::warn!("Failed to save config: {}", e);
            }
        }
    }

    let generation_config = app_config.overlay(GenerationConfig::from_env());
    if generation_config.credential().is_none() {
        log::warn!("No API key configured; generate and refine will fail until one is set");
    }
    log::info!("Using model {}", generation_config.model);

    let history_path = app_config.history_path(&data_dir);
    log::info!("History file: {:?}", history_path);

    let mut session = Session::new(
        GenerationClient::new(generation_config),
        HistoryStore::open(JsonFilePersistence::new(history_path)),
    );

    println!("{}", commands::HELP);
    run_loop(&mut session).await;

    log::info!("promptviz exiting");
}

/// Read commands from stdin until `quit` or end of input
async fn run_loop(session: &mut Session<GenerationClient, JsonFilePersistence>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        print!("{}", repl::PROMPT);
        if let Err(e) = stdout.flush() {
            log::debug!("Failed to flush stdout: {}", e);
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match execute(session, command, &mut stdout).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                log::debug!("Command failed: {}", e);
                println!("Error: {}", e.user_message());
            }
        }
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(paths::APP_DIR),
        None => {
            log::warn!("No platform data directory; using {}", paths::FALLBACK_DIR);
            PathBuf::from(paths::FALLBACK_DIR)
        }
    }
}
