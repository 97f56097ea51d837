use anyhow::Result;
use clap::Parser;

use triager::config::Config;
use triager::logging::init_logging;
use triager::rest::{serve, ApiState};
use triager::workflow::spawn_sweeper;

#[derive(Parser)]
#[command(name = "triager")]
#[command(about = "Feedback triage service: turns Jira feedback tickets into user stories")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let _logging = init_logging(&config, cli.debug)?;

    tracing::info!("Starting triager");

    let port = cli.port.unwrap_or(config.server.port);
    let retention = config.retention();
    let sweep_interval = config.sweep_interval();

    let state = ApiState::new(config)?;

    // Reclaim finished workflow records on a timer, independent of shutdown
    spawn_sweeper(state.registry.clone(), sweep_interval, retention);

    serve(state, port).await
}
