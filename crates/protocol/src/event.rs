use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized log level. The enum stays closed at four variants; unknown
/// source tokens fold to `Level::Info` in `normalize_level`, matching the
/// spec's "treat as INFO-equivalent for counting" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

/// Which parser ultimately produced an event, including the two
/// failure-path variants (`Generic`'s last-resort keyword match and the
/// total-function fallback when nothing else matched).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Nginx,
    Apache,
    Json,
    Syslog,
    Generic,
    Fallback,
}

/// Boolean feature vector over the message body, used both for urgency
/// scoring and surfaced to the server for category/search heuristics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semantics {
    pub has_ip_address: bool,
    pub has_url: bool,
    pub has_status_code: bool,
    pub has_timestamp: bool,
    pub has_database: bool,
    pub has_network: bool,
    pub has_auth: bool,
    pub has_memory: bool,
    pub has_security: bool,
}

/// The output of `pulseguard_parser::parse`: a total function, never a
/// `Result` — on internal failure it always falls back to the fallback
/// event shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub original_line: String,
    pub parser: ParserKind,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub semantics: Semantics,
    pub urgency: u8,
}
