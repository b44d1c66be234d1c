use crossplay_connector::SessionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub bedrock: BedrockConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Load mapping files from here instead of the bundled copies.
    #[serde(default)]
    pub mappings_dir: Option<PathBuf>,
    #[serde(default = "default_cache_chunks")]
    pub cache_chunks: bool,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default)]
    pub debug_mode: bool,
}

/// Where Bedrock clients connect.
#[derive(Debug, Deserialize)]
pub struct BedrockConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_bedrock_port")]
    pub port: u16,
}

/// The Java server sessions are proxied to.
#[derive(Debug, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_address")]
    pub address: String,
    #[serde(default = "default_remote_port")]
    pub port: u16,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
}

fn default_bind() -> String {
    "0.0.0.0".into()
}

fn default_bedrock_port() -> u16 {
    19132
}

fn default_remote_address() -> String {
    "127.0.0.1".into()
}

fn default_remote_port() -> u16 {
    25565
}

fn default_protocol_version() -> u32 {
    767
}

fn default_cache_chunks() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_max_sessions() -> usize {
    100
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_bedrock_port(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            address: default_remote_address(),
            port: default_remote_port(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bedrock: BedrockConfig::default(),
            remote: RemoteConfig::default(),
            mappings_dir: None,
            cache_chunks: default_cache_chunks(),
            tick_interval_ms: default_tick_interval_ms(),
            max_sessions: default_max_sessions(),
            debug_mode: false,
        }
    }
}

impl ProxyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: ProxyConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            protocol_version: self.remote.protocol_version,
            cache_chunks: self.cache_chunks,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
