//! ccmonitor - Live monitor for Claude Code token usage

use ccmonitor::{
    cli::Cli,
    live_monitor::{LiveMonitor, Renderer},
};
use ccmonitor_core::error::Result;
use ccmonitor_provider_claude::DataLoader;
use ccmonitor_terminal::{CompactFormatter, MonitorDisplay};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the rendered frames.
    // --verbose overrides RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("ccmonitor=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ccmonitor=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let timezone = cli.timezone_config()?;
    info!("Using timezone: {}", timezone.display_name());

    let plan = cli.plan();
    info!("Monitoring plan {} ({} tokens)", plan.name, plan.limit_or_default());

    // A missing data directory is reported by each cycle, not here
    let source = DataLoader::new().await?;

    let renderer = if cli.compact {
        let fields = cli.compact_fields.clone().unwrap_or_default();
        Renderer::Compact(CompactFormatter::new(timezone).with_fields(fields))
    } else {
        let display = MonitorDisplay::new(timezone, cli.interval).with_theme(cli.theme);
        let plain = cli.no_color || !is_terminal::is_terminal(std::io::stdout());
        Renderer::Full(if plain { display.with_color(false) } else { display })
    };

    let monitor = LiveMonitor::new(source, plan, renderer, cli.interval);

    if cli.is_snapshot() {
        println!("{}", monitor.run_once(cli.json).await?);
        return Ok(());
    }

    monitor.run().await
}
