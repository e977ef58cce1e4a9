//! Command prefix management.
//!
//! Prefixes form an insertion-ordered set. Matching is case-sensitive and the
//! longest registered prefix that starts the message wins, so `"!f "` beats
//! `"!"` for `"!f ping"`.

use tracing::{debug, info};

/// Set of strings that mark a message as an explicit command invocation.
#[derive(Debug, Clone, Default)]
pub struct PrefixManager {
    prefixes: Vec<String>,
}

impl PrefixManager {
    /// Creates a manager seeded with `prefixes`; duplicates are dropped.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        debug!("Prefix manager created.");
        let mut manager = Self::default();
        for prefix in prefixes {
            manager.add_prefix(prefix);
        }
        manager
    }

    /// Adds a prefix. Returns false, leaving the set unchanged, if it was
    /// already present.
    pub fn add_prefix(&mut self, prefix: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if self.prefixes.contains(&prefix) {
            info!("Failed to load {prefix:?}: duplicate.");
            return false;
        }
        info!("Prefix {prefix:?} loaded.");
        self.prefixes.push(prefix);
        true
    }

    /// Removes a prefix. Returns whether an entry existed and was removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> bool {
        match self.prefixes.iter().position(|p| p == prefix) {
            Some(index) => {
                self.prefixes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registered prefixes in insertion order.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns the longest registered prefix that `content` starts with.
    #[must_use]
    pub fn match_prefix(&self, content: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .filter(|p| !p.is_empty() && content.starts_with(p.as_str()))
            .max_by_key(|p| p.len())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_prefix_twice_keeps_one_entry() {
        let mut manager = PrefixManager::default();
        assert!(manager.add_prefix("!f "));
        assert!(!manager.add_prefix("!f "));
        assert_eq!(manager.prefixes(), ["!f "]);
    }

    #[test]
    fn test_new_drops_duplicates_and_keeps_order() {
        let manager = PrefixManager::new(["b", "a", "b", "c"]);
        assert_eq!(manager.prefixes(), ["b", "a", "c"]);
    }

    #[test]
    fn test_remove_prefix_reports_presence() {
        let mut manager = PrefixManager::new(["!f ", "?"]);
        assert!(manager.remove_prefix("?"));
        assert!(!manager.remove_prefix("?"));
        assert_eq!(manager.prefixes(), ["!f "]);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let manager = PrefixManager::new(["!", "!f "]);
        assert_eq!(manager.match_prefix("!f ping"), Some("!f "));
        assert_eq!(manager.match_prefix("!ping"), Some("!"));
        assert_eq!(manager.match_prefix("ping"), None);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let manager = PrefixManager::new(["!f "]);
        assert_eq!(manager.match_prefix("!F ping"), None);
    }
}
