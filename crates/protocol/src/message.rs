use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentIdentity, Platform};
use crate::event::{ParserKind, Semantics};

/// `register.data` — sent once, immediately after the transport opens.
/// `log_files` carries paths only; the wire protocol does not transmit the
/// per-file format hint, so the server reconstructs each as
/// `LogFormat::Auto` when building the `AgentRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub server_id: String,
    pub server_name: String,
    pub log_files: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub platform: Platform,
}

impl RegisterData {
    /// Flattens an `AgentIdentity` into the wire form sent at connect time.
    pub fn from_identity(identity: &AgentIdentity, version: impl Into<String>) -> Self {
        Self {
            server_id: identity.server_id.clone(),
            server_name: identity.server_name.clone(),
            log_files: identity.log_files.iter().map(|s| s.path.display().to_string()).collect(),
            timestamp: Utc::now(),
            version: version.into(),
            platform: identity.platform.clone(),
        }
    }
}

/// `error.data` — one high-urgency error event forwarded from the agent
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorData {
    pub server_id: String,
    pub server_name: String,
    pub log_file: String,
    pub line_number: u64,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    pub parser: ParserKind,
    pub urgency: u8,
    pub semantics: Semantics,
}

/// The rolling per-level counters carried by `stats.data`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatsCounters {
    pub errors: u64,
    pub warnings: u64,
    pub success: u64,
    pub total_lines: u64,
}

/// `stats.data` — a resynchronizing, droppable heartbeat sent every N
/// processed lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsData {
    pub server_id: String,
    pub stats: StatsCounters,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub memory_bytes: u64,
}

/// One `{ type, data }` frame crossing the agent/server transport. Encoded
/// as newline-delimited JSON with `type` as an internally-tagged
/// discriminant, so a malformed or unknown frame deserializes to an `Err`
/// the ingestion hub logs and skips rather than a panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AgentMessage {
    Register(RegisterData),
    Error(ErrorData),
    Stats(StatsData),
}

impl ErrorData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        server_id: impl Into<String>,
        server_name: impl Into<String>,
        log_file: impl Into<String>,
        line_number: u64,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
        parser: ParserKind,
        urgency: u8,
        semantics: Semantics,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            server_name: server_name.into(),
            log_file: log_file.into(),
            line_number,
            timestamp,
            error_message: message.into(),
            parser,
            urgency,
            semantics,
        }
    }
}

/// Server → dashboard broadcast frames. Pushed on subscribe (all three, in
/// order) and incrementally as ingestion mutates the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DashboardFrame {
    #[serde(rename = "servers")]
    Servers(serde_json::Value),
    #[serde(rename = "errors")]
    Errors(serde_json::Value),
    #[serde(rename = "newError")]
    NewError(serde_json::Value),
    #[serde(rename = "insights")]
    Insights(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{LogFileSpec, LogFormat};

    #[test]
    fn register_data_flattens_identity_log_files_to_paths() {
        let identity = AgentIdentity::new(
            "agent-a",
            "Agent A",
            Platform {
                hostname: "host-a".to_string(),
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                runtime_version: "tokio".to_string(),
            },
            vec![LogFileSpec::new("/var/log/nginx/error.log", LogFormat::Nginx)],
        );
        let register = RegisterData::from_identity(&identity, "0.1.0");
        assert_eq!(register.log_files, vec!["/var/log/nginx/error.log".to_string()]);
        assert_eq!(register.server_id, "agent-a");
    }
}
