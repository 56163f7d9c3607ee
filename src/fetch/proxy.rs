//! Proxy pool
//!
//! The pool is read-only after construction and sampled randomly per
//! request attempt; there are no sticky sessions.

use crate::config::ProxyConfig;
use rand::seq::SliceRandom;
use std::path::Path;

/// A read-only pool of proxy URIs
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    entries: Vec<String>,
}

impl ProxyPool {
    /// Builds the pool from configuration: inline list plus an optional
    /// file with one URI per line (blank lines and `#` comments skipped).
    pub fn from_config(config: &ProxyConfig) -> std::io::Result<Self> {
        let mut entries = config.list.clone();

        if let Some(path) = &config.list_file {
            let content = std::fs::read_to_string(Path::new(path))?;
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                entries.push(line.to_string());
            }
        }

        Ok(Self { entries })
    }

    /// Creates an empty pool (all requests go out directly)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Samples one proxy URI at random, or None if the pool is empty
    pub fn sample(&self) -> Option<&str> {
        self.entries
            .choose(&mut rand::thread_rng())
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_pool_samples_none() {
        let pool = ProxyPool::empty();
        assert!(pool.is_empty());
        assert_eq!(pool.sample(), None);
    }

    #[test]
    fn test_sample_returns_pool_member() {
        let pool = ProxyPool {
            entries: vec![
                "http://10.0.0.1:8080".to_string(),
                "http://10.0.0.2:8080".to_string(),
            ],
        };

        for _ in 0..20 {
            let picked = pool.sample().unwrap();
            assert!(pool.entries.iter().any(|e| e == picked));
        }
    }

    #[test]
    fn test_from_config_merges_list_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http://10.0.0.3:8080").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "http://10.0.0.4:8080").unwrap();
        file.flush().unwrap();

        let config = ProxyConfig {
            list: vec!["http://10.0.0.1:8080".to_string()],
            list_file: Some(file.path().to_string_lossy().to_string()),
        };

        let pool = ProxyPool::from_config(&config).unwrap();
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_from_config_missing_file_errors() {
        let config = ProxyConfig {
            list: vec![],
            list_file: Some("/nonexistent/proxies.txt".to_string()),
        };
        assert!(ProxyPool::from_config(&config).is_err());
    }
}
