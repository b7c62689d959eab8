use pulseguard_protocol::{LogFileSpec, LogFormat, ParsedEvent, ParserKind};

use crate::formats::{self, apache, generic, json, nginx, syslog};

/// Routes an `auto`-typed line to a specific format by content, per the
/// fixed priority order in the spec: JSON (leading brace) beats literal
/// "nginx"/"apache" substrings, which beat the syslog-prefix regex, which
/// beats generic.
fn detect_format(line: &str) -> LogFormat {
    let trimmed = line.trim_start();
    if trimmed.starts_with('{') {
        LogFormat::Json
    } else if line.contains("nginx") {
        LogFormat::Nginx
    } else if line.contains("apache") {
        LogFormat::Apache
    } else if syslog::PREFIX.is_match(line) {
        LogFormat::Syslog
    } else {
        LogFormat::Auto
    }
}

/// Total entry point: parses one raw log line into a `ParsedEvent`,
/// never failing. If `spec.format` names a specific parser and that
/// parser's pattern doesn't match, falls through to the generic parser
/// rather than erroring.
pub fn parse(line: &str, spec: &LogFileSpec) -> ParsedEvent {
    let format = match spec.format {
        LogFormat::Auto => detect_format(line),
        other => other,
    };

    match format {
        LogFormat::Json => match json::parse(line) {
            Some(extraction) => formats::finish(line, ParserKind::Json, extraction),
            None => parse_generic(line),
        },
        LogFormat::Nginx => match nginx::parse(line) {
            Some(extraction) => formats::finish(line, ParserKind::Nginx, extraction),
            None => parse_generic(line),
        },
        LogFormat::Apache => match apache::parse(line) {
            Some(extraction) => formats::finish(line, ParserKind::Apache, extraction),
            None => parse_generic(line),
        },
        LogFormat::Syslog => match syslog::parse(line) {
            Some(extraction) => formats::finish(line, ParserKind::Syslog, extraction),
            None => parse_generic(line),
        },
        LogFormat::Auto => parse_generic(line),
    }
}

fn parse_generic(line: &str) -> ParsedEvent {
    let (kind, extraction) = generic::parse(line);
    formats::finish(line, kind, extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(format: LogFormat) -> LogFileSpec {
        LogFileSpec::new("/var/log/test.log", format)
    }

    #[test]
    fn json_round_trip_from_spec_example() {
        let line = r#"{"timestamp":"2025-08-01T10:30:15Z", "level":"error", "message":"API timeout"}"#;
        let event = parse(line, &spec(LogFormat::Auto));
        assert_eq!(event.level, pulseguard_protocol::Level::Error);
        assert_eq!(event.message, "API timeout");
        assert_eq!(event.parser, ParserKind::Json);
    }

    #[test]
    fn auto_routes_generic_bracket_line_to_generic_parser() {
        let line = "[2025-08-01 10:30:15] ERROR: Database connection failed";
        let event = parse(line, &spec(LogFormat::Auto));
        assert_eq!(event.parser, ParserKind::Generic);
        assert_eq!(event.message, "Database connection failed");
        assert_eq!(event.urgency, 10);
    }

    #[test]
    fn explicit_format_falls_through_to_generic_on_mismatch() {
        let line = "totally unstructured text with no nginx markers";
        let event = parse(line, &spec(LogFormat::Nginx));
        assert_eq!(event.parser, ParserKind::Fallback);
    }

    #[test]
    fn never_panics_on_empty_line() {
        let event = parse("", &spec(LogFormat::Auto));
        assert_eq!(event.message, "");
    }
}
