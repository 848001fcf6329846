use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use edgeops_api::config::{self, validation::validate_config, ConfigError, EdgeOpsConfig};
use edgeops_api::console::{
    run_cycle, sample_deployments, spawn_console, ClientStatusState, ConsoleSettings, HttpTransport,
    StatusView,
};
use edgeops_api::lifecycle::{signals, Shutdown};
use edgeops_api::observability::logging;

#[derive(Parser)]
#[command(name = "edgeops-console")]
#[command(about = "Polling console for the EdgeOps deployment-identity probe", long_about = None)]
struct Cli {
    /// Probe API base URL (overrides API_BASE)
    #[arg(short, long, global = true)]
    api_base: Option<String>,

    /// Frontend marker URL (overrides FRONTEND_MARKER_URL)
    #[arg(short, long, global = true)]
    marker_url: Option<String>,

    /// Auto-refresh interval in seconds
    #[arg(short, long, global = true)]
    interval: Option<u64>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live console (default)
    Watch {
        /// Start with auto-refresh off
        #[arg(long)]
        no_auto_refresh: bool,

        /// Start with the raw version JSON shown
        #[arg(long)]
        raw: bool,
    },
    /// Run one poll cycle and print both payloads as JSON
    Once,
    /// Sample the version endpoint to observe the traffic split
    Sample {
        /// Number of probes
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Probes in flight at once
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Print the tally as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&logging::default_directive("warn"));

    let transport = Arc::new(HttpTransport::from_config(&config.console)?);
    let settings = ConsoleSettings::from(&config.console);

    match cli.command.unwrap_or(Commands::Watch { no_auto_refresh: false, raw: false }) {
        Commands::Watch { no_auto_refresh, raw } => {
            let settings = ConsoleSettings {
                auto_refresh: settings.auto_refresh && !no_auto_refresh,
                ..settings
            };
            watch(transport, settings, &config.console.api_base, raw).await?;
        }
        Commands::Once => {
            let report = run_cycle(transport.as_ref(), settings.request_timeout).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Sample { count, concurrency, json } => {
            let tally =
                sample_deployments(transport.as_ref(), count, concurrency, settings.request_timeout).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&tally)?);
            } else {
                println!("{:<12} {:>8} {:>8}", "DEPLOYMENT", "COUNT", "SHARE");
                for (deployment, count) in &tally.by_deployment {
                    println!(
                        "{:<12} {:>8} {:>7.1}%",
                        deployment,
                        count,
                        tally.fraction(deployment) * 100.0
                    );
                }
                println!("{:<12} {:>8}", "failures", tally.failures);
                if tally.duplicate_request_ids > 0 {
                    eprintln!("Warning: {} duplicate request ids", tally.duplicate_request_ids);
                }
            }
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<EdgeOpsConfig, ConfigError> {
    let mut config = config::load_config(cli.config.as_deref())?;

    if let Some(api_base) = &cli.api_base {
        config.console.api_base = api_base.clone();
    }
    if let Some(marker_url) = &cli.marker_url {
        config.console.marker_url = Some(marker_url.clone());
    }
    if let Some(interval) = cli.interval {
        config.console.refresh_interval_secs = interval;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn watch(
    transport: Arc<HttpTransport>,
    settings: ConsoleSettings,
    api_base: &str,
    mut show_raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let console = spawn_console(transport, settings);
    let mut updates = console.subscribe();

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    let mut stop = shutdown.subscribe();

    let mut input = spawn_stdin_reader();
    let mut stdin_open = true;

    render(&updates.borrow_and_update(), api_base, show_raw);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&updates.borrow_and_update(), api_base, show_raw);
            }
            line = input.recv(), if stdin_open => match line {
                Some(line) => match line.trim() {
                    "r" => console.refresh(),
                    "a" => console.toggle_auto_refresh(),
                    "j" => {
                        show_raw = !show_raw;
                        render(&updates.borrow(), api_base, show_raw);
                    }
                    "q" => break,
                    "" => {}
                    other => eprintln!("Unknown command: {other}"),
                },
                None => stdin_open = false,
            },
            _ = stop.recv() => break,
        }
    }

    console.shutdown().await;
    Ok(())
}

/// Read operator commands on a plain thread; a pending tokio stdin read
/// would hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn render(state: &ClientStatusState, api_base: &str, show_raw: bool) {
    let mut view = StatusView::new(state, api_base);
    if show_raw {
        view = view.with_raw_json(state);
    }
    println!("\x1b[2J\x1b[H{}", view);
}
