use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use upswatch::config::Config;
use upswatch::nmc::NmcClient;
use upswatch::poller::Poller;
use upswatch::sink::{self, ClickHouseSink, ClickHouseWriter};
use upswatch::snmp::SnmpClient;

/// APC UPS fleet telemetry collector with a ClickHouse sink.
#[derive(Parser)]
#[command(name = "upswatch", about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logging verbosity level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print version information and exit.
    Version,
}

/// Build-time version info, injected via RUSTFLAGS or build.rs.
mod version {
    /// Release version string (set at build time).
    pub const RELEASE: &str = env!("CARGO_PKG_VERSION");

    /// Git commit hash (set at build time via env, or "unknown").
    pub fn git_commit() -> &'static str {
        option_env!("GIT_COMMIT").unwrap_or("unknown")
    }

    /// Target OS.
    pub fn target_os() -> &'static str {
        std::env::consts::OS
    }

    /// Target architecture.
    pub fn target_arch() -> &'static str {
        std::env::consts::ARCH
    }

    /// Full version string with platform info.
    pub fn full() -> String {
        format!(
            "{} (commit: {}, {}/{})",
            RELEASE,
            git_commit(),
            target_os(),
            target_arch(),
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle version subcommand before anything else.
    if let Some(Command::Version) = &cli.command {
        println!("upswatch {}", version::full());
        return Ok(());
    }

    // Initialize tracing.
    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;

    fmt().with_env_filter(filter).with_target(true).init();

    // Config is required for the main collector run.
    let config_path = cli
        .config
        .context("--config is required (use --help for usage)")?;

    let cfg = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    tracing::info!(
        version = version::RELEASE,
        commit = version::git_commit(),
        "starting upswatch",
    );

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    rt.block_on(async { run(cfg).await })
}

async fn run(cfg: Config) -> Result<()> {
    let targets = cfg.resolve_targets()?;

    // Set up signal handling.
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let ctrl_c = tokio::signal::ctrl_c();
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("received SIGINT, shutting down");
                }
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, shutting down");
                }
            }

            shutdown.cancel();
        });
    }

    // Connect the sink before starting any poller.
    let mut writer = ClickHouseWriter::new(cfg.clickhouse.clone());
    writer.start().await?;
    let pool = writer
        .pool()
        .context("ClickHouse pool not started")?
        .clone();

    let (tx, rx) = mpsc::channel(cfg.queue_limit);
    let writer_handle = tokio::spawn(sink::run_writer(
        ClickHouseSink::new(pool, cfg.clickhouse.clone()),
        rx,
        shutdown.clone(),
    ));

    let nmc = NmcClient::new()?;

    tracing::info!(targets = targets.len(), "starting pollers");

    let mut poller_handles = Vec::with_capacity(targets.len());
    for target in targets {
        let snmp = SnmpClient::new(
            &target.host,
            target.snmp_port,
            target.credentials.clone(),
            target.fetch_timeout,
        );
        let poller = Poller::new(target, snmp, nmc.clone(), tx.clone(), shutdown.clone());
        poller_handles.push(tokio::spawn(poller.run()));
    }

    // The writer's recv sees a closed queue only once every poller is
    // done with its clone.
    drop(tx);

    for handle in poller_handles {
        let _ = handle.await;
    }
    let _ = writer_handle.await;

    writer.stop();

    tracing::info!("upswatch stopped");

    Ok(())
}
