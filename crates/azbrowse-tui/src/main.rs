//! `azbrowse` — interactive terminal browser for Azure resources.
//!
//! Drill from subscriptions into resource groups, resources, deployments
//! and provider actions, viewing the raw JSON of every node. Built on
//! [ratatui](https://ratatui.rs) over the `azbrowse-core` navigation engine.
//!
//! Logs go to a file (default `$TMPDIR/azbrowse.log`) so they never corrupt
//! the terminal. `--navigate <ID>` walks the tree to a resource on startup.
//!
//! Entry point: CLI parsing, tracing setup, panic hooks, client construction
//! and app launch.

mod action;
mod app;
mod event;
mod nav_bridge;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use azbrowse_api::ArmClient;

use crate::app::App;

/// Interactive terminal browser for Azure Resource Manager.
#[derive(Parser, Debug)]
#[command(name = "azbrowse", version, about)]
struct Cli {
    /// Resource id to navigate to on startup
    /// (e.g. /subscriptions/<id>/resourceGroups/<name>)
    #[arg(long, value_name = "ID")]
    navigate: Option<String>,

    /// Log at debug level (same as -vv)
    #[arg(long)]
    debug: bool,

    /// Mask subscription ids and other GUIDs on screen
    #[arg(long)]
    demo: bool,

    /// Bearer token for the Resource Manager API
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Resource Manager endpoint (defaults to the public cloud)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Log file path
    #[arg(long, default_value_os_t = default_log_file())]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("azbrowse.log")
}

/// File-only tracing; anything written to stdout would corrupt the UI.
/// The returned guard must live until exit so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let verbosity = if cli.debug { cli.verbose.max(2) } else { cli.verbose };
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "azbrowse={log_level},azbrowse_core={log_level},azbrowse_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("azbrowse.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal switches modes
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let mut config = azbrowse_config::load_config().wrap_err("failed to load configuration")?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
        config.validate()?;
    }
    config.demo |= cli.demo;

    let token = config.resolve_token(cli.token.as_deref())?;
    let client = ArmClient::new(config.endpoint_url()?, token, &config.transport_config())?;

    let navigate = cli.navigate.filter(|id| !id.is_empty());
    info!(
        endpoint = %config.endpoint,
        navigate = navigate.as_deref().unwrap_or("(none)"),
        demo = config.demo,
        "starting azbrowse"
    );

    let mut app = App::new(Arc::new(client), &config, navigate);
    app.run().await?;

    Ok(())
}
