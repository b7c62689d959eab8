use serde::{Deserialize, Serialize};

use crate::spec::LogFileSpec;

/// Host facts sent once at `register` time, mirrored into `AgentRecord` on
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub runtime_version: String,
}

/// Identity an agent asserts to the server. `log_files` is empty when the
/// agent relied on auto-discovery — the server only needs the resolved
/// paths, not whether they were configured or discovered.
///
/// This is the agent's internal view, with a typed `LogFileSpec` per file;
/// `RegisterData` (the wire form built from it) flattens each to a bare
/// path string, since the transport never carries the format hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub server_id: String,
    pub server_name: String,
    pub platform: Platform,
    pub log_files: Vec<LogFileSpec>,
}

impl AgentIdentity {
    pub fn new(server_id: impl Into<String>, server_name: impl Into<String>, platform: Platform, log_files: Vec<LogFileSpec>) -> Self {
        Self {
            server_id: server_id.into(),
            server_name: server_name.into(),
            platform,
            log_files,
        }
    }
}
