use std::sync::atomic::{AtomicU64, Ordering};

use pulseguard_protocol::ParserKind;

/// Per-process counters of how many lines each parser kind handled,
/// surfaced in the agent's `stats` message and in `tracing::info!` spans.
/// This is ambient observability, not a feature the spec's non-goals
/// exclude — they rule out a query language and durability, not counting
/// what got parsed.
#[derive(Debug, Default)]
pub struct ParserMetrics {
    nginx: AtomicU64,
    apache: AtomicU64,
    json: AtomicU64,
    syslog: AtomicU64,
    generic: AtomicU64,
    fallback: AtomicU64,
}

impl ParserMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: ParserKind) {
        let counter = match kind {
            ParserKind::Nginx => &self.nginx,
            ParserKind::Apache => &self.apache,
            ParserKind::Json => &self.json,
            ParserKind::Syslog => &self.syslog,
            ParserKind::Generic => &self.generic,
            ParserKind::Fallback => &self.fallback,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fallback_total(&self) -> u64 {
        self.fallback.load(Ordering::Relaxed)
    }

    pub fn parsed_total(&self) -> u64 {
        self.nginx.load(Ordering::Relaxed)
            + self.apache.load(Ordering::Relaxed)
            + self.json.load(Ordering::Relaxed)
            + self.syslog.load(Ordering::Relaxed)
            + self.generic.load(Ordering::Relaxed)
            + self.fallback.load(Ordering::Relaxed)
    }
}
