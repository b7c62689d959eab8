//! Wire types shared by the `pulseguard-agent` and `pulseguard-server`
//! binaries: the log-file spec, the parsed-event shape produced by
//! `pulseguard-parser`, agent identity, and the `{type, data}` message
//! envelopes that cross the agent/server transport.
//!
//! Keeping these in one crate is the Rust-native counterpart of the
//! original system's shared JSON schema: both binaries compile against one
//! definition instead of hand-duplicating structs that could drift.

mod agent;
mod event;
mod message;
mod spec;

pub use agent::{AgentIdentity, Platform};
pub use event::{Level, ParserKind, ParsedEvent, Semantics};
pub use message::{AgentMessage, DashboardFrame, ErrorData, RegisterData, StatsData, StatsCounters};
pub use spec::{LogFileSpec, LogFormat};
