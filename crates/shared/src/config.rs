use tracing_subscriber::EnvFilter;

/// Environment variable prefix shared by both binaries, e.g. `PULSEGUARD_AGENT__SERVER_HOST`.
pub const ENV_PREFIX: &str = "PULSEGUARD";

/// Build a `config::Config` loader seeded from `.env` and a
/// `PULSEGUARD_<sub_prefix>_`-namespaced set of environment variables.
/// Mirrors the teacher's `Config::from_env()` shape, parameterized so the
/// agent and server binaries can each load their own settings struct from one
/// helper instead of duplicating the builder plumbing.
pub fn env_loader(sub_prefix: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
    dotenvy::dotenv().ok();

    config::Config::builder().add_source(
        config::Environment::with_prefix(&format!("{}_{}", ENV_PREFIX, sub_prefix))
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}

/// Initialize console tracing. Each binary additionally installs its own
/// structured-log sink on top of this via [`crate::logging`].
pub fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();
}
