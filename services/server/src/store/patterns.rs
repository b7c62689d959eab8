use std::collections::HashMap;

use crate::model::PatternEntry;

/// Closes the source's open question (§9): the pattern table is not
/// allowed to grow without bound. Callers pass `max_errors * 10` as `cap`;
/// when exceeded, the entries with the oldest `last_seen` are evicted
/// until the table is back under capacity.
pub fn enforce_capacity(patterns: &mut HashMap<String, PatternEntry>, cap: usize) {
    if patterns.len() <= cap {
        return;
    }
    let mut by_age: Vec<(String, chrono::DateTime<chrono::Utc>)> =
        patterns.iter().map(|(k, v)| (k.clone(), v.last_seen)).collect();
    by_age.sort_by_key(|(_, last_seen)| *last_seen);

    let excess = patterns.len() - cap;
    for (key, _) in by_age.into_iter().take(excess) {
        patterns.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn evicts_oldest_entries_over_capacity() {
        let mut patterns = HashMap::new();
        for i in 0i64..5 {
            patterns.insert(
                format!("pattern-{i}"),
                PatternEntry {
                    count: 1,
                    server_set: Default::default(),
                    last_seen: Utc::now() - Duration::minutes(5 - i),
                },
            );
        }
        enforce_capacity(&mut patterns, 3);
        assert_eq!(patterns.len(), 3);
        assert!(!patterns.contains_key("pattern-0"));
        assert!(!patterns.contains_key("pattern-1"));
        assert!(patterns.contains_key("pattern-4"));
    }
}
