mod config;
mod connection;
mod discovery;
mod pipeline;

use pulseguard_protocol::{AgentIdentity, AgentMessage, Platform, RegisterData};
use pulseguard_tailer::{RawLine, TailerConfig, TailerHandle};
use tokio::sync::mpsc;
use tracing::info;

use config::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pulseguard_shared::logging::init_unified_logging(
        "pulseguard-agent",
        std::env::var("PULSEGUARD_AGENT_LOG_FILE").ok().as_deref(),
    )?;

    let config = AgentConfig::from_env()?;
    info!(server_id = %config.server_id, "starting pulseguard agent");

    let log_files = discovery::resolve_log_files(config.log_file_paths());
    if log_files.is_empty() {
        tracing::warn!("no log files configured and none of the auto-discovery candidates exist; agent will idle");
    }
    for spec in &log_files {
        info!(path = %spec.path.display(), format = ?spec.format, "tailing log file");
    }

    let (raw_tx, raw_rx) = mpsc::channel::<RawLine>(1024);
    let tailer_config = TailerConfig {
        poll_interval: std::time::Duration::from_millis(config.poll_interval_ms),
        ..TailerConfig::default()
    };

    let mut tailers: Vec<TailerHandle> = Vec::new();
    for spec in &log_files {
        tailers.push(pulseguard_tailer::spawn(spec.path.clone(), tailer_config, raw_tx.clone()));
    }
    drop(raw_tx);

    let identity = AgentIdentity::new(
        config.server_id.clone(),
        config.server_name.clone(),
        Platform {
            hostname: config.server_name.clone(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            runtime_version: "tokio".to_string(),
        },
        log_files.clone(),
    );
    let register = RegisterData::from_identity(&identity, env!("CARGO_PKG_VERSION"));

    let (outbound_tx, outbound_rx) = mpsc::channel::<AgentMessage>(256);

    let connection_task = tokio::spawn(connection::run(config.clone(), register, outbound_rx));
    let pipeline = pipeline::Pipeline::new(&config, log_files);
    let pipeline_task = tokio::spawn(pipeline.run(raw_rx, outbound_tx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping agent");
    for tailer in tailers {
        tailer.stop();
    }
    connection_task.abort();
    pipeline_task.abort();

    Ok(())
}
