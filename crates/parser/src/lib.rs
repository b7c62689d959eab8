//! Smart Log Parser (C1): turns one raw log line into a
//! [`pulseguard_protocol::ParsedEvent`].
//!
//! `parse` is total — it never panics and never surfaces a `Result`. Every
//! format-specific parser either produces an event or falls through to the
//! next candidate; the generic parser's final fallback arm always matches,
//! so there is no path that reaches the caller without an event.
//!
//! Modeled as a tagged `LogFormat` plus a dispatch table of pure functions
//! rather than a parser class hierarchy, per the source's own design note.

mod dispatch;
pub mod formats;
mod level;
mod metrics;
mod semantics;
mod timestamp;
mod urgency;

pub use dispatch::parse;
pub use level::detect_level_from_content;
pub use metrics::ParserMetrics;
pub use timestamp::parse_timestamp;
