mod config;
mod sessions;

use config::ProxyConfig;
use crossplay_connector::{Registries, Translators};
use crossplay_data::MappingData;
use sessions::SessionManager;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ProxyConfig::load(Path::new("config/crossplay.toml"))?;

    let default_level = if config.debug_mode { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting crossplay...");
    info!(
        "Config loaded: bedrock={}:{}, remote={}:{} (protocol {}), max_sessions={}",
        config.bedrock.bind,
        config.bedrock.port,
        config.remote.address,
        config.remote.port,
        config.remote.protocol_version,
        config.max_sessions
    );

    // Mapping files are large; parse them off the runtime threads.
    let mappings_dir = config.mappings_dir.clone();
    let data = tokio::task::spawn_blocking(move || match mappings_dir {
        Some(dir) => MappingData::load(&dir),
        None => MappingData::bundled(),
    })
    .await??;

    let registries = Registries::build(&data)?;
    if !registries.blocks.is_supported(config.remote.protocol_version) {
        anyhow::bail!(
            "no block mappings for Java protocol {}",
            config.remote.protocol_version
        );
    }
    let translators = Arc::new(Translators::build()?);

    let manager = SessionManager::new(
        registries,
        translators,
        config.session_config(),
        config.tick_interval(),
        config.max_sessions,
    );

    // Graceful shutdown channel
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    info!("Ready; waiting for the transport to open sessions");
    let _ = shutdown_rx.changed().await;

    manager.shutdown("Proxy shutting down").await;
    info!("Proxy shut down cleanly");
    Ok(())
}
