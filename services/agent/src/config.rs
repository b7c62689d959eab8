use serde::Deserialize;
use uuid::Uuid;

/// Agent-side tunables, loaded from `PULSEGUARD_AGENT__*` environment
/// variables via `pulseguard_shared::config::env_loader`, mirroring the
/// teacher's `Config::from_env()` shape.
///
/// `log_files` is a comma-separated list of paths; empty means "run
/// auto-discovery over the fixed candidate set" per spec §4.3.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub server_id: String,
    pub server_name: String,
    pub server_host: String,
    pub server_port: u16,
    #[serde(default)]
    pub log_files: String,
    pub poll_interval_ms: u64,
    pub stats_every_n: u64,
    pub urgency_gate: u8,
    pub backoff_base_ms: u64,
    pub backoff_cap_secs: u64,
    /// Negative means unlimited reconnect attempts.
    pub max_attempts: i64,
}

impl AgentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_server_id = Uuid::new_v4().to_string();
        let default_server_name = std::env::var("HOSTNAME").unwrap_or_else(|_| "pulseguard-agent".to_string());

        let config = pulseguard_shared::config::env_loader("AGENT")
            .set_default("server_id", default_server_id)?
            .set_default("server_name", default_server_name)?
            .set_default("server_host", "127.0.0.1")?
            .set_default("server_port", 8080)?
            .set_default("log_files", "")?
            .set_default("poll_interval_ms", 500)?
            .set_default("stats_every_n", 10)?
            .set_default("urgency_gate", 5)?
            .set_default("backoff_base_ms", 1000)?
            .set_default("backoff_cap_secs", 60)?
            .set_default("max_attempts", -1)?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn log_file_paths(&self) -> Vec<String> {
        self.log_files
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
