mod category;
mod insights;
mod normalize;
mod patterns;
mod severity;
mod trend;

pub use normalize::normalize as normalize_message;

use std::collections::{HashMap, VecDeque};

use chrono::{Duration, Utc};
use pulseguard_protocol::{ErrorData, Platform};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{AgentRecord, AgentStatus, Insight, PatternEntry, StoredError};

type Fingerprint = (String, String, String);

/// Connection identity the ingestion hub hands out per accepted socket,
/// used to locate the owning `AgentRecord` on transport close without
/// bidirectional object references (§9).
pub type ConnectionId = Uuid;

struct StoreInner {
    errors_by_id: HashMap<Uuid, StoredError>,
    /// Most-recent-first order of error ids; front is newest.
    order: VecDeque<Uuid>,
    fingerprint_index: HashMap<Fingerprint, Uuid>,
    patterns: HashMap<String, PatternEntry>,
    insights: Vec<Insight>,
    agents: HashMap<String, AgentRecord>,
    connections: HashMap<ConnectionId, String>,
}

/// The process-wide Memory Store (C4): one owned value behind a single
/// `RwLock`, so `addError` and its induced pattern/insight recomputation
/// are atomic with respect to concurrent REST reads and broadcast
/// snapshots, per §5.
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
    max_errors: usize,
    max_patterns: usize,
}

impl MemoryStore {
    pub fn new(max_errors: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                errors_by_id: HashMap::new(),
                order: VecDeque::new(),
                fingerprint_index: HashMap::new(),
                patterns: HashMap::new(),
                insights: Vec::new(),
                agents: HashMap::new(),
                connections: HashMap::new(),
            }),
            max_errors,
            // §9 open question: the pattern table never evicted in the source.
            // We close it with an LRU-by-last_seen cap sized to a multiple of
            // the bounded error capacity.
            max_patterns: max_errors.saturating_mul(10).max(100),
        }
    }

    /// Idempotent under fingerprint `(server_id, log_file,
    /// normalize(error_message))`: merges into the existing record if one
    /// exists, otherwise inserts a new one at count 1. Always re-derives
    /// insights before returning. Returns the merged/created record.
    pub async fn add_error(&self, incoming: &ErrorData) -> StoredError {
        let mut guard = self.inner.write().await;
        let normalized = normalize::normalize(&incoming.error_message);
        let fingerprint: Fingerprint = (incoming.server_id.clone(), incoming.log_file.clone(), normalized.clone());
        let now = Utc::now();
        let window_start = now - Duration::minutes(60);

        let result = if let Some(existing_id) = guard.fingerprint_index.get(&fingerprint).copied() {
            // Count siblings before mutating the record itself so it
            // doesn't count its own prior occurrence twice.
            let siblings = guard
                .errors_by_id
                .values()
                .filter(|e| e.id != existing_id && normalize::normalize(&e.error_message) == normalized && e.last_seen >= window_start)
                .count();

            let entry = guard.errors_by_id.get_mut(&existing_id).expect("fingerprint index is stale");
            entry.count += 1;
            entry.last_seen = now;
            entry.trend = trend::classify(siblings);
            entry.clone()
        } else {
            let siblings = guard
                .errors_by_id
                .values()
                .filter(|e| normalize::normalize(&e.error_message) == normalized && e.last_seen >= window_start)
                .count();

            let stored = StoredError {
                id: Uuid::new_v4(),
                server_id: incoming.server_id.clone(),
                server_name: incoming.server_name.clone(),
                log_file: incoming.log_file.clone(),
                line_number: incoming.line_number,
                timestamp: incoming.timestamp,
                error_message: incoming.error_message.clone(),
                parser: incoming.parser,
                urgency: incoming.urgency,
                semantics: incoming.semantics,
                severity: severity::severity_of(&incoming.error_message),
                category: category::categorize(&incoming.error_message),
                count: 1,
                first_seen: now,
                last_seen: now,
                trend: trend::classify(siblings),
            };

            guard.fingerprint_index.insert(fingerprint, stored.id);
            guard.order.push_front(stored.id);
            guard.errors_by_id.insert(stored.id, stored.clone());
            trim_to_capacity(&mut guard, self.max_errors);
            stored
        };

        update_pattern(&mut guard, &normalized, &incoming.server_id, now);
        patterns::enforce_capacity(&mut guard.patterns, self.max_patterns);
        guard.insights = insights::generate(&ordered_errors(&guard), &guard.patterns);

        result
    }

    pub async fn recent_errors(&self, limit: usize) -> Vec<StoredError> {
        let guard = self.inner.read().await;
        ordered_errors(&guard).into_iter().take(limit).collect()
    }

    pub async fn all_errors(&self) -> Vec<StoredError> {
        let guard = self.inner.read().await;
        ordered_errors(&guard)
    }

    pub async fn insights(&self) -> Vec<Insight> {
        self.inner.read().await.insights.clone()
    }

    pub async fn search(&self, q: &str, limit: usize) -> Vec<StoredError> {
        let errors = self.all_errors().await;
        crate::search::search(&errors, q, limit)
    }

    /// `register` (§4.5): creates or revives an `AgentRecord` and binds the
    /// transport's connection id to it.
    pub async fn register_agent(
        &self,
        connection_id: ConnectionId,
        server_id: String,
        server_name: String,
        platform: Platform,
        log_files: Vec<String>,
    ) -> AgentRecord {
        let mut guard = self.inner.write().await;
        let now = Utc::now();

        let record = guard
            .agents
            .entry(server_id.clone())
            .and_modify(|r| {
                r.status = AgentStatus::Online;
                r.last_seen = now;
                r.platform = platform.clone();
                r.log_files = log_files.clone();
                r.server_name = server_name.clone();
            })
            .or_insert_with(|| AgentRecord {
                server_id: server_id.clone(),
                server_name: server_name.clone(),
                platform,
                log_files,
                status: AgentStatus::Online,
                error_count: 0,
                warning_count: 0,
                success_count: 0,
                registered_at: now,
                last_seen: now,
            })
            .clone();

        guard.connections.insert(connection_id, server_id);
        record
    }

    pub async fn record_error_seen(&self, server_id: &str) {
        let mut guard = self.inner.write().await;
        if let Some(agent) = guard.agents.get_mut(server_id) {
            agent.error_count += 1;
            agent.last_seen = Utc::now();
        }
    }

    /// `stats` (§4.5): merges the agent's self-reported counters and
    /// refreshes `last_seen`.
    pub async fn apply_stats(
        &self,
        server_id: &str,
        errors: u64,
        warnings: u64,
        success: u64,
    ) {
        let mut guard = self.inner.write().await;
        if let Some(agent) = guard.agents.get_mut(server_id) {
            agent.error_count = errors;
            agent.warning_count = warnings;
            agent.success_count = success;
            agent.last_seen = Utc::now();
        }
    }

    /// Transport close (§4.5, §9): flips the owning agent offline and
    /// drops the connection mapping. A no-op if the connection was never
    /// registered (e.g. it disconnected before sending `register`).
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Option<String> {
        let mut guard = self.inner.write().await;
        let server_id = guard.connections.remove(&connection_id)?;
        if let Some(agent) = guard.agents.get_mut(&server_id) {
            agent.status = AgentStatus::Offline;
            agent.last_seen = Utc::now();
        }
        Some(server_id)
    }

    pub async fn list_agents(&self) -> Vec<AgentRecord> {
        self.inner.read().await.agents.values().cloned().collect()
    }

    pub async fn summary_stats(&self) -> SummaryStats {
        let guard = self.inner.read().await;
        let mut summary = SummaryStats::default();
        for agent in guard.agents.values() {
            summary.total_errors += agent.error_count;
            summary.total_warnings += agent.warning_count;
            summary.total_success += agent.success_count;
            summary.total_servers += 1;
            if agent.status == AgentStatus::Online {
                summary.online_servers += 1;
            }
        }
        summary
    }

    pub async fn error_count(&self) -> usize {
        self.inner.read().await.errors_by_id.len()
    }
}

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_errors: u64,
    pub total_success: u64,
    pub total_warnings: u64,
    pub total_servers: u64,
    pub online_servers: u64,
}

fn ordered_errors(guard: &StoreInner) -> Vec<StoredError> {
    guard
        .order
        .iter()
        .filter_map(|id| guard.errors_by_id.get(id).cloned())
        .collect()
}

fn trim_to_capacity(guard: &mut StoreInner, max_errors: usize) {
    while guard.order.len() > max_errors {
        if let Some(oldest_id) = guard.order.pop_back() {
            if let Some(error) = guard.errors_by_id.remove(&oldest_id) {
                let normalized = normalize::normalize(&error.error_message);
                let fingerprint = (error.server_id, error.log_file, normalized);
                guard.fingerprint_index.remove(&fingerprint);
            }
        }
    }
}

fn update_pattern(guard: &mut StoreInner, normalized: &str, server_id: &str, now: chrono::DateTime<chrono::Utc>) {
    let entry = guard.patterns.entry(normalized.to_string()).or_insert_with(|| PatternEntry {
        count: 0,
        server_set: Default::default(),
        last_seen: now,
    });
    entry.count += 1;
    entry.server_set.insert(server_id.to_string());
    entry.last_seen = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_protocol::Semantics;

    fn error_data(server_id: &str, message: &str) -> ErrorData {
        ErrorData::new(
            server_id,
            format!("{server_id}-name"),
            "/var/log/app.log",
            42,
            Utc::now(),
            message,
            pulseguard_protocol::ParserKind::Generic,
            9,
            Semantics::default(),
        )
    }

    #[tokio::test]
    async fn merges_repeated_errors_by_fingerprint() {
        let store = MemoryStore::new(1000);
        store.add_error(&error_data("agent-a", "Database connection failed")).await;
        let merged = store.add_error(&error_data("agent-a", "Database connection failed")).await;

        assert_eq!(merged.count, 2);
        assert_eq!(store.error_count().await, 1);
    }

    #[tokio::test]
    async fn distinct_servers_produce_distinct_stored_errors() {
        let store = MemoryStore::new(1000);
        store.add_error(&error_data("agent-a", "Database connection failed")).await;
        store.add_error(&error_data("agent-b", "Database connection failed")).await;
        assert_eq!(store.error_count().await, 2);
    }

    #[tokio::test]
    async fn bounded_capacity_trims_oldest() {
        let store = MemoryStore::new(2);
        store.add_error(&error_data("agent-a", "first unique error")).await;
        store.add_error(&error_data("agent-a", "second unique error")).await;
        store.add_error(&error_data("agent-a", "third unique error")).await;
        assert_eq!(store.error_count().await, 2);

        let errors = store.all_errors().await;
        assert!(errors.iter().all(|e| e.error_message != "first unique error"));
    }

    #[tokio::test]
    async fn cross_server_pattern_produces_insight_with_expected_confidence() {
        // Two agents each send six errors that normalize to the same
        // message; they stay distinct StoredErrors (fingerprint includes
        // server_id) but collide in the pattern table, per scenario 3 in
        // spec §8.
        let store = MemoryStore::new(1000);
        for _ in 0..6 {
            store.add_error(&error_data("agent-a", "shared failure")).await;
        }
        for _ in 0..6 {
            store.add_error(&error_data("agent-b", "shared failure")).await;
        }

        assert_eq!(store.error_count().await, 2);
        let insights = store.insights().await;
        let pattern_insight = insights.iter().find(|i| i.kind == crate::model::InsightType::Pattern);
        assert!(pattern_insight.is_some());
        assert_eq!(pattern_insight.unwrap().confidence, 84);
    }

    #[tokio::test]
    async fn agent_transitions_offline_on_disconnect() {
        let store = MemoryStore::new(1000);
        let connection_id = Uuid::new_v4();
        store
            .register_agent(
                connection_id,
                "agent-a".to_string(),
                "Agent A".to_string(),
                Platform {
                    hostname: "host-a".to_string(),
                    os: "linux".to_string(),
                    arch: "x86_64".to_string(),
                    runtime_version: "tokio".to_string(),
                },
                vec!["/var/log/app.log".to_string()],
            )
            .await;

        let disconnected = store.disconnect(connection_id).await;
        assert_eq!(disconnected.as_deref(), Some("agent-a"));

        let agents = store.list_agents().await;
        let agent = agents.iter().find(|a| a.server_id == "agent-a").unwrap();
        assert_eq!(agent.status, AgentStatus::Offline);
    }
}
