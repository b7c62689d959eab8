use pulseguard_protocol::LogFileSpec;

/// Probed when the configuration enumerates no files. Each candidate that
/// exists on disk is tailed, with its parser inferred from the basename.
const CANDIDATES: &[&str] = &[
    "/var/log/syslog",
    "/var/log/messages",
    "/var/log/nginx/error.log",
    "/var/log/apache2/error.log",
    "/var/log/auth.log",
];

/// Builds the list of `LogFileSpec`s to tail: the explicitly configured
/// paths if any were given, otherwise the existing members of the fixed
/// candidate set.
pub fn resolve_log_files(configured: Vec<String>) -> Vec<LogFileSpec> {
    if !configured.is_empty() {
        return configured
            .into_iter()
            .map(|path| {
                let format = LogFileSpec::infer_format(std::path::Path::new(&path));
                LogFileSpec::new(path, format)
            })
            .collect();
    }

    CANDIDATES
        .iter()
        .filter(|path| std::path::Path::new(path).exists())
        .map(|path| {
            let format = LogFileSpec::infer_format(std::path::Path::new(path));
            LogFileSpec::new(*path, format)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_protocol::LogFormat;

    #[test]
    fn configured_paths_take_precedence_over_discovery() {
        let specs = resolve_log_files(vec!["/tmp/one.log".to_string()]);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].path.to_str().unwrap(), "/tmp/one.log");
    }

    #[test]
    fn format_inference_matches_basename() {
        let specs = resolve_log_files(vec![
            "/var/log/nginx/error.log".to_string(),
            "/var/log/apache2/error.log".to_string(),
            "/var/log/data.json".to_string(),
        ]);
        assert_eq!(specs[0].format, LogFormat::Nginx);
        assert_eq!(specs[1].format, LogFormat::Apache);
        assert_eq!(specs[2].format, LogFormat::Json);
    }
}
