use std::path::Path;

use rand::seq::IndexedRandom;

/// A pool of User-Agent strings rotated across outbound requests to avoid
/// presenting a single fingerprint to every source.
///
/// Threaded through as `Arc<UserAgentPool>` rather than a process-wide
/// singleton, so tests and multiple concurrent managers can use independent
/// pools.
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Load newline-delimited User-Agent strings from a file, ignoring blank
    /// lines and lines starting with `#`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, or contains no usable
    /// entries.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let agents: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();

        if agents.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "User-Agent file contained no usable entries",
            ));
        }

        Ok(Self { agents })
    }

    /// A small built-in pool, used when no User-Agent file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
            ],
        }
    }

    /// Pick a random User-Agent from the pool.
    ///
    /// # Panics
    /// Never: the pool is guaranteed non-empty by construction.
    #[must_use]
    pub fn random(&self) -> &str {
        self.agents
            .choose(&mut rand::rng())
            .expect("UserAgentPool is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_pool_is_non_empty_and_random_returns_member() {
        let pool = UserAgentPool::builtin();
        let picked = pool.random();
        assert!(pool.agents.iter().any(|a| a == picked));
    }

    #[test]
    fn from_file_skips_blank_and_comment_lines() {
        let dir = std::env::temp_dir().join(format!("koel-ua-test-{}", std::process::id()));
        std::fs::write(&dir, "# comment\n\nMyAgent/1.0\n").unwrap();
        let pool = UserAgentPool::from_file(&dir).unwrap();
        std::fs::remove_file(&dir).ok();
        assert_eq!(pool.agents, vec!["MyAgent/1.0".to_string()]);
    }

    #[test]
    fn from_file_rejects_empty_pool() {
        let dir = std::env::temp_dir().join(format!("koel-ua-empty-{}", std::process::id()));
        std::fs::write(&dir, "# only comments\n").unwrap();
        let result = UserAgentPool::from_file(&dir);
        std::fs::remove_file(&dir).ok();
        assert!(result.is_err());
    }
}
