use serde::Deserialize;

/// Server-side tunables, loaded from `PULSEGUARD_SERVER__*` environment
/// variables, mirroring the teacher's env-override pattern
/// (`GATEWAY_HOST`/`GATEWAY_PORT`) but namespaced through the `config`
/// crate rather than one `std::env::var` call per field.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub http_host: String,
    pub http_port: u16,
    /// Dashboard push transport port. Defaults to `http_port + 1` unless
    /// explicitly overridden.
    pub ws_port: u16,
    pub agent_tcp_port: u16,
    pub max_errors: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let http_port_default = 3001u16;

        let config = pulseguard_shared::config::env_loader("SERVER")
            .set_default("http_host", "0.0.0.0")?
            .set_default("http_port", http_port_default as i64)?
            .set_default("ws_port", (http_port_default + 1) as i64)?
            .set_default("agent_tcp_port", 8080)?
            .set_default("max_errors", 1000)?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
