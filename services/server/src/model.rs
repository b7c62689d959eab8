use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deterministic category assigned to a stored error's raw message. Order
/// matters: `categorize` tries these top-to-bottom and the first keyword
/// match wins, falling back to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DatabaseConnectivity,
    Authentication,
    NetworkIssues,
    FileSystem,
    MemoryIssues,
    DataProcessing,
    ResourceManagement,
    Configuration,
    ApiIssues,
    Security,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::DatabaseConnectivity => "Database Connectivity",
            Category::Authentication => "Authentication",
            Category::NetworkIssues => "Network Issues",
            Category::FileSystem => "File System",
            Category::MemoryIssues => "Memory Issues",
            Category::DataProcessing => "Data Processing",
            Category::ResourceManagement => "Resource Management",
            Category::Configuration => "Configuration",
            Category::ApiIssues => "API Issues",
            Category::Security => "Security",
            Category::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity inferred from the raw message (§4.4). Total over any nonempty
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Occurrence trend of a normalized message, recomputed on every merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    New,
    Stable,
    Increasing,
    Decreasing,
}

/// A deduplicated error record. Identity is the fingerprint
/// `(server_id, log_file, normalize(error_message))`; merges increment
/// `count` and recompute `trend` in place rather than creating a new row.
///
/// Only ever serialized out to the REST/broadcast surfaces (§6), never
/// parsed back in, so it derives `Serialize` only — a `Deserialize` derive
/// would require `Category: Deserialize`, which it doesn't implement since
/// every `Category` value is produced by `categorize`, never read off the
/// wire. `rename_all = "camelCase"` matches the documented dashboard
/// contract (`serverId`, `errorMessage`, `firstSeen`, ...).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredError {
    pub id: Uuid,
    pub server_id: String,
    pub server_name: String,
    pub log_file: String,
    pub line_number: u64,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    pub parser: pulseguard_protocol::ParserKind,
    pub urgency: u8,
    pub semantics: pulseguard_protocol::Semantics,
    pub severity: Severity,
    #[serde(serialize_with = "serialize_category")]
    pub category: Category,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub trend: Trend,
}

fn serialize_category<S: serde::Serializer>(category: &Category, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(category.as_str())
}

/// Keyed by normalized message; tracks how many stored errors share that
/// normalized text, across how many distinct agents, for the
/// cross-server-pattern insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    pub count: u64,
    pub server_set: HashSet<String>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Pattern,
    Anomaly,
    Recommendation,
}

/// Derived fact about the corpus, replaced wholesale on every ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Offline,
}

/// Server-side view of a registered agent. `registered_at` is set once;
/// `last_seen` updates on every message and on the offline transition.
/// `rename_all = "camelCase"` matches the documented `GET /api/servers`
/// contract (`serverId`, `errorCount`, `registeredAt`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub server_id: String,
    pub server_name: String,
    pub platform: pulseguard_protocol::Platform,
    pub log_files: Vec<String>,
    pub status: AgentStatus,
    pub error_count: u64,
    pub warning_count: u64,
    pub success_count: u64,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}
