//! confab CLI: streaming chat client for an answer service

use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};

use confab_engine::{ApiClient, ClientConfig, SESSION_LIMIT_NOTICE};
use confab_tui::Theme;

/// Streaming chat client with a terminal UI
#[derive(Parser)]
#[command(name = "confab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Path to the config file
    #[arg(long, default_value = "confab.json")]
    config: PathBuf,

    /// Write logs to this file (the terminal is owned by the TUI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Color theme
    #[arg(long, value_enum, default_value_t = ThemeChoice::Mocha)]
    theme: ThemeChoice,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeChoice {
    Mocha,
    Latte,
    HighContrast,
}

impl ThemeChoice {
    fn theme(self) -> Theme {
        match self {
            Self::Mocha => Theme::mocha(),
            Self::Latte => Theme::latte(),
            Self::HighContrast => Theme::high_contrast(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Chat,

    /// Ask a single question and stream the answer to stdout
    Ask {
        /// The question to ask
        question: String,
    },

    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path);
    }

    if matches!(cli.command, Some(Commands::Init)) {
        cmd_init(&cli.config);
        return;
    }

    let config = load_config(&cli);

    match cli.command {
        None | Some(Commands::Chat) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            if let Err(e) = rt.block_on(confab_tui::run_tui(config, cli.theme.theme())) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { question }) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(cmd_ask(&config, &question));
        }
        Some(Commands::Init) => unreachable!("handled above"),
    }
}

fn init_logging(path: &Path) {
    use tracing_subscriber::EnvFilter;

    let file = match std::fs::File::create(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to create log file {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> ClientConfig {
    let mut config = match ClientConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    if let Some(server) = &cli.server {
        config.base_url = server.trim_end_matches('/').to_string();
    }

    config
}

fn cmd_init(path: &Path) {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return;
    }

    match ClientConfig::default().save(path) {
        Ok(()) => {
            println!("Created {}", path.display());
            println!("Edit it to point at your answer service.");
        }
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
}

/// One-shot question: stream the answer to stdout as it arrives.
async fn cmd_ask(config: &ClientConfig, question: &str) {
    let client = match ApiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut frames = match client.ask(question).await {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // The server sends the full answer-so-far in every frame; print only
    // the newly appended suffix when the text grows in place.
    let mut shown = String::new();
    while let Some(item) = frames.next().await {
        match item {
            Ok(frame) => {
                if let Some(answer) = frame.partial_answer {
                    if let Some(suffix) = answer.strip_prefix(shown.as_str()) {
                        print!("{suffix}");
                    } else {
                        print!("\n{answer}");
                    }
                    let _ = std::io::stdout().flush();
                    shown = answer;
                }
                if frame.complete {
                    if let Some(count) = frame.question_count {
                        if count >= config.session_limit {
                            eprintln!();
                            eprintln!("{SESSION_LIMIT_NOTICE}");
                        }
                    }
                }
            }
            Err(e) => {
                eprintln!();
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
    println!();
}
