use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which parser handles a tailed file. `Auto` defers to content-based
/// dispatch in `pulseguard-parser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Nginx,
    Apache,
    Json,
    Syslog,
    Auto,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Auto
    }
}

/// Immutable once configured: a single file to tail plus the parser to
/// apply to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFileSpec {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub format: LogFormat,
}

impl LogFileSpec {
    pub fn new(path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Infer a format from a basename, used by the agent's auto-discovery
    /// probe over the fixed candidate paths.
    pub fn infer_format(path: &std::path::Path) -> LogFormat {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        if name.contains("nginx") {
            LogFormat::Nginx
        } else if name.contains("apache") {
            LogFormat::Apache
        } else if name.ends_with(".json") {
            LogFormat::Json
        } else if name.contains("syslog") || name.contains("messages") || name.contains("auth") {
            LogFormat::Syslog
        } else {
            LogFormat::Auto
        }
    }
}
