use crate::model::Category;

/// Ordered keyword tables; first match wins. Mirrors the GLOSSARY's
/// category keyword sets verbatim.
const TABLE: &[(Category, &[&str])] = &[
    (
        Category::DatabaseConnectivity,
        &["connection", "timeout", "database", "db", "mysql", "postgres", "mongo"],
    ),
    (
        Category::Authentication,
        &["auth", "login", "password", "token", "permission", "unauthorized", "401", "403"],
    ),
    (
        Category::NetworkIssues,
        &["network", "dns", "host", "unreachable", "connection refused", "timeout"],
    ),
    (
        Category::FileSystem,
        &["file", "directory", "permission denied", "disk", "space", "io error"],
    ),
    (
        Category::MemoryIssues,
        &["memory", "oom", "heap", "stack overflow", "out of memory"],
    ),
    (
        Category::DataProcessing,
        &["json", "parse", "format", "invalid", "malformed", "corrupt"],
    ),
    (
        Category::ResourceManagement,
        &["queue", "pool", "limit", "capacity", "overflow", "resource"],
    ),
    (
        Category::Configuration,
        &["config", "setting", "parameter", "missing", "invalid config"],
    ),
    (
        Category::ApiIssues,
        &["api", "endpoint", "route", "404", "500", "service unavailable"],
    ),
    (
        Category::Security,
        &["security", "attack", "breach", "suspicious", "blocked", "firewall"],
    ),
];

/// Deterministic category assignment: `categorize(m1) == categorize(m2)`
/// whenever `m1 == m2`, since this is a pure function of the lowercased
/// message against a fixed, ordered keyword table.
pub fn categorize(message: &str) -> Category {
    let lower = message.to_ascii_lowercase();
    for (category, keywords) in TABLE {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    Category::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_keyword_wins_first() {
        assert_eq!(categorize("Database connection failed"), Category::DatabaseConnectivity);
    }

    #[test]
    fn unmatched_message_is_general() {
        assert_eq!(categorize("everything is fine here"), Category::General);
    }

    #[test]
    fn is_deterministic() {
        let m = "401 Unauthorized: invalid token";
        assert_eq!(categorize(m), categorize(m));
    }
}
