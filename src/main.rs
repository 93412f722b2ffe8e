use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use nudge::ai::provider::AsyncAiProvider;
use nudge::ai::{CachedSuggestion, PipelineCommand, SuggestionEngine, SuggestionEvent, run_pipeline};
use nudge::config::{self, Config, ConfigResult};
use nudge::error::NudgeError;
use nudge::monitor::{DesktopCapture, MonitorController, SpeechFeed, speech_channel};
use nudge::usage::{UsageStats, UsageStore, default_usage_path};

/// Context-aware suggestions from what you are doing right now
#[derive(Parser, Debug)]
#[command(version, about = "Watches your active window and clipboard and suggests what to do next")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ~/.config/nudge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Usage counter file (default: <data dir>/nudge/usage.json)
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch context and print suggestions (default)
    Run {
        /// Print each suggestion as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Show provider request counters
    Usage {
        /// Reset the counters to zero
        #[arg(long)]
        reset: bool,
    },
}

/// Lines accepted on stdin while running
#[derive(Debug, PartialEq, Eq)]
enum InputCommand {
    Reload,
    Usage,
    Reset,
    Speech(String),
    Quit,
    Unknown(String),
}

impl InputCommand {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let command = match word {
            "reload" => InputCommand::Reload,
            "usage" => InputCommand::Usage,
            "reset" => InputCommand::Reset,
            "speech" => InputCommand::Speech(rest.trim().to_string()),
            "quit" | "exit" => InputCommand::Quit,
            _ => InputCommand::Unknown(word.to_string()),
        };
        Some(command)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.verbose, args.log_file.as_deref())?;

    let config_path = args.config.unwrap_or_else(config::get_config_path);
    let state_path = args.state_file.unwrap_or_else(default_usage_path);
    let usage = Arc::new(UsageStore::open(state_path).map_err(NudgeError::from)?);

    match args.command.unwrap_or(Command::Run { json: false }) {
        Command::Usage { reset } => {
            if reset {
                usage.reset().map_err(NudgeError::from)?;
                println!("Usage counters reset");
            }
            println!("{}", format_usage(&usage.stats()));
            Ok(())
        }
        Command::Run { json } => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(NudgeError::from)?;
            rt.block_on(run(config_path, usage, json))
        }
    }
}

/// Timestamped `[time] [LEVEL] message` lines; `RUST_LOG` overrides the level
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use std::io::Write;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .format(|buf, record| {
            use std::time::SystemTime;
            let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
            writeln!(
                buf,
                "[{}] [{}] {}",
                datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        });

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(NudgeError::from)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn load_config(path: &Path) -> Config {
    let ConfigResult { config, warning } = config::load_config_from(path);
    if let Some(warning) = warning {
        eprintln!("Warning: {} (using defaults)", warning);
    }
    config
}

fn build_engine(
    config: &Config,
    usage: &Arc<UsageStore>,
    config_path: &Path,
) -> SuggestionEngine<AsyncAiProvider> {
    let engine = SuggestionEngine::from_config(config, Arc::clone(usage));
    if !engine.is_configured() {
        eprintln!(
            "AI provider not configured. Add an API key to {} to get suggestions.",
            config_path.display()
        );
    }
    engine
}

fn build_capture(config: &Config, speech: &SpeechFeed) -> DesktopCapture {
    DesktopCapture::new(config.capture.clone()).with_speech(speech.clone())
}

async fn run(config_path: PathBuf, usage: Arc<UsageStore>, json: bool) -> Result<()> {
    let config = load_config(&config_path);
    let (speech, speech_feed) = speech_channel();

    let mut monitor = MonitorController::new(
        build_capture(&config, &speech_feed),
        config.cost_saving.polling_interval(),
        config.capture.capture_timeout(),
    );

    let (command_tx, command_rx) = mpsc::channel(4);
    let (suggestion_tx, mut suggestion_rx) = mpsc::channel(32);
    let cancel = CancellationToken::new();

    let pipeline = tokio::spawn(run_pipeline(
        build_engine(&config, &usage, &config_path),
        monitor.subscribe(),
        command_rx,
        suggestion_tx,
        cancel.clone(),
    ));

    monitor.start().await;
    let mut input = spawn_stdin_reader();

    loop {
        tokio::select! {
            Some(event) = suggestion_rx.recv() => print_suggestion(&event, json)?,

            Some(line) = input.recv() => {
                let Some(command) = InputCommand::parse(&line) else {
                    continue;
                };

                match command {
                    InputCommand::Reload => {
                        let config = load_config(&config_path);
                        let engine = build_engine(&config, &usage, &config_path);
                        if command_tx.send(PipelineCommand::Reconfigure(engine)).await.is_err() {
                            break;
                        }
                        monitor.reconfigure(
                            build_capture(&config, &speech_feed),
                            config.cost_saving.polling_interval(),
                            config.capture.capture_timeout(),
                        );
                        monitor.start().await;
                        eprintln!("Configuration reloaded");
                    }
                    InputCommand::Usage => eprintln!("{}", format_usage(&usage.stats())),
                    InputCommand::Reset => match usage.reset() {
                        Ok(stats) => eprintln!("Usage counters reset\n{}", format_usage(&stats)),
                        Err(e) => eprintln!("Failed to reset usage: {}", e),
                    },
                    InputCommand::Speech(text) => {
                        if !speech.publish(&text) {
                            eprintln!("Ignoring blank transcript");
                        }
                    }
                    InputCommand::Quit => break,
                    InputCommand::Unknown(word) => {
                        eprintln!("Unknown command '{}'. Try: reload, usage, reset, speech <text>, quit", word);
                    }
                }
            }

            else => break,
        }
    }

    monitor.stop().await;
    cancel.cancel();
    pipeline.await?;

    Ok(())
}

/// Forward stdin lines until EOF
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

#[derive(Serialize)]
struct PrintedSuggestion<'a> {
    #[serde(flatten)]
    suggestion: &'a CachedSuggestion,
    cached: bool,
}

fn print_suggestion(event: &SuggestionEvent, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(&PrintedSuggestion {
            suggestion: &event.suggestion,
            cached: event.from_cache,
        })?;
        println!("{}", line);
    } else {
        let local = event.suggestion.timestamp.with_timezone(&chrono::Local);
        println!(
            "[{}]{} {}",
            local.format("%H:%M:%S"),
            if event.from_cache { " (cached)" } else { "" },
            event.suggestion.text.trim()
        );
    }
    Ok(())
}

fn format_usage(stats: &UsageStats) -> String {
    format!(
        "Requests: {}\nSince: {}",
        stats.request_count,
        stats.last_reset.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
    )
}
