pub mod apache;
pub mod generic;
pub mod json;
pub mod nginx;
pub mod syslog;

use chrono::{DateTime, Utc};
use pulseguard_protocol::{Level, ParsedEvent, ParserKind};
use std::collections::HashMap;

use crate::semantics::extract_semantics;
use crate::urgency::score_urgency;

/// One format-specific extraction: everything a parser module recovers
/// from a line before the shared semantics/urgency pass runs.
pub struct Extraction {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Finishes an `Extraction` into a full `ParsedEvent` by running the
/// shared semantic-feature and urgency passes over the extracted message.
/// Every format module funnels through this so urgency scoring never
/// drifts between formats.
pub fn finish(original_line: &str, parser: ParserKind, extraction: Extraction) -> ParsedEvent {
    let semantics = extract_semantics(&extraction.message);
    let urgency = score_urgency(extraction.level, &extraction.message, &semantics);
    ParsedEvent {
        timestamp: extraction.timestamp,
        level: extraction.level,
        message: extraction.message,
        original_line: original_line.to_string(),
        parser,
        metadata: extraction.metadata,
        semantics,
        urgency,
    }
}
