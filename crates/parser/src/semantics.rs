use once_cell::sync::Lazy;
use pulseguard_protocol::Semantics;
use regex::Regex;

static IP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static STATUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[4-5]\d{2}\b").unwrap());
static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").unwrap());

const DATABASE_KEYWORDS: &[&str] = &["database", "db", "sql", "mysql", "postgres", "mongo", "query"];
const NETWORK_KEYWORDS: &[&str] = &["network", "dns", "socket", "connection", "tcp", "udp"];
const AUTH_KEYWORDS: &[&str] = &["auth", "login", "password", "token", "credential", "unauthorized"];
const MEMORY_KEYWORDS: &[&str] = &["memory", "heap", "oom", "out of memory", "stack overflow"];
const SECURITY_KEYWORDS: &[&str] = &["security", "attack", "breach", "suspicious", "firewall", "exploit"];

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}

/// Extracts the boolean semantic feature vector from a message body. Each
/// flag is independent — a line can set several at once (e.g. a database
/// timeout with an embedded IP).
pub fn extract_semantics(message: &str) -> Semantics {
    let lower = message.to_ascii_lowercase();
    Semantics {
        has_ip_address: IP_RE.is_match(message),
        has_url: URL_RE.is_match(message),
        has_status_code: STATUS_RE.is_match(message),
        has_timestamp: TIMESTAMP_RE.is_match(message),
        has_database: contains_any(&lower, DATABASE_KEYWORDS),
        has_network: contains_any(&lower, NETWORK_KEYWORDS),
        has_auth: contains_any(&lower, AUTH_KEYWORDS),
        has_memory: contains_any(&lower, MEMORY_KEYWORDS),
        has_security: contains_any(&lower, SECURITY_KEYWORDS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_database_and_network_independently() {
        let s = extract_semantics("database connection to 10.0.0.5 timed out over tcp");
        assert!(s.has_database);
        assert!(s.has_network);
        assert!(s.has_ip_address);
    }

    #[test]
    fn flags_status_code() {
        let s = extract_semantics("upstream responded with 503 Service Unavailable");
        assert!(s.has_status_code);
    }

    #[test]
    fn flags_auth_and_security() {
        let s = extract_semantics("suspicious login attempt blocked by firewall, invalid token");
        assert!(s.has_auth);
        assert!(s.has_security);
    }
}
