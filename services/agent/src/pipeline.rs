use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use pulseguard_protocol::{AgentMessage, ErrorData, Level, LogFileSpec, StatsCounters, StatsData};
use pulseguard_tailer::RawLine;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::AgentConfig;

/// Per-line pipeline (§4.3): parse, bucket by level, gate error emission
/// on urgency, and resynchronize with a `stats` frame every N lines.
/// Counters are global across files, not per-file — an implementation
/// choice the spec leaves open as long as it's applied consistently.
pub struct Pipeline {
    server_id: String,
    server_name: String,
    urgency_gate: u8,
    stats_every_n: u64,
    specs: HashMap<PathBuf, LogFileSpec>,
    metrics: pulseguard_parser::ParserMetrics,
    counters: StatsCounters,
    started_at: Instant,
}

impl Pipeline {
    pub fn new(config: &AgentConfig, specs: Vec<LogFileSpec>) -> Self {
        let specs = specs.into_iter().map(|s| (s.path.clone(), s)).collect();
        Self {
            server_id: config.server_id.clone(),
            server_name: config.server_name.clone(),
            urgency_gate: config.urgency_gate,
            stats_every_n: config.stats_every_n,
            specs,
            metrics: pulseguard_parser::ParserMetrics::new(),
            counters: StatsCounters::default(),
            started_at: Instant::now(),
        }
    }

    /// Consumes raw lines from every tailer and forwards `error`/`stats`
    /// frames to `outbound`. Returns when the raw-line channel closes
    /// (all tailers stopped).
    pub async fn run(mut self, mut raw_lines: mpsc::Receiver<RawLine>, outbound: mpsc::Sender<AgentMessage>) {
        while let Some(raw) = raw_lines.recv().await {
            let Some(spec) = self.specs.get(&raw.path).cloned() else {
                continue;
            };

            let event = pulseguard_parser::parse(&raw.line, &spec);
            self.metrics.record(event.parser);
            self.counters.total_lines += 1;

            match event.level {
                Level::Error => self.counters.errors += 1,
                Level::Warn => self.counters.warnings += 1,
                _ => self.counters.success += 1,
            }

            if event.level == Level::Error && event.urgency >= self.urgency_gate {
                let line_number = approximate_line_number(&raw.path);
                let error = ErrorData::new(
                    self.server_id.clone(),
                    self.server_name.clone(),
                    raw.path.display().to_string(),
                    line_number,
                    event.timestamp,
                    event.message.clone(),
                    event.parser,
                    event.urgency,
                    event.semantics,
                );
                if outbound.send(AgentMessage::Error(error)).await.is_err() {
                    return;
                }
            }

            if self.counters.total_lines % self.stats_every_n == 0 {
                let stats = StatsData {
                    server_id: self.server_id.clone(),
                    stats: self.counters,
                    timestamp: Utc::now(),
                    uptime_secs: self.started_at.elapsed().as_secs(),
                    memory_bytes: resident_memory_bytes(),
                };
                info!(total = self.counters.total_lines, parsed = self.metrics.parsed_total(), "stats checkpoint");
                if outbound.send(AgentMessage::Stats(stats)).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// A coarse advisory line-count approximation, per spec §4.3: the source
/// sends `floor(fileSize / 100)` rather than a true line count. Callers
/// must not assert exactness against this value.
fn approximate_line_number(path: &PathBuf) -> u64 {
    std::fs::metadata(path).map(|m| m.len() / 100).unwrap_or(0)
}

/// Best-effort resident memory size for the `stats` heartbeat; `0` when
/// unavailable (e.g. non-Linux, or `/proc` unreadable in a sandbox).
fn resident_memory_bytes() -> u64 {
    std::fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|s| s.split_whitespace().nth(1).map(str::to_string))
        .and_then(|pages| pages.parse::<u64>().ok())
        .map(|pages| pages * 4096)
        .unwrap_or(0)
}
