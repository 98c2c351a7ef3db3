use regex::Regex;
use std::collections::HashSet;

use crate::{ActivityEntry, ActivityKind};

/// Compiled filter for activity lines
#[derive(Clone)]
pub struct ActivityFilter {
    /// Regex pattern (if any)
    regex: Option<Regex>,

    /// Original pattern string
    pattern: String,

    /// Kinds to include (empty = all)
    kinds: HashSet<ActivityKind>,

    /// Case sensitivity
    case_insensitive: bool,
}

impl ActivityFilter {
    /// Create a new filter from a pattern string
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::build(pattern, false)
    }

    /// Create a case-insensitive filter
    pub fn new_case_insensitive(pattern: &str) -> Result<Self, regex::Error> {
        Self::build(pattern, true)
    }

    fn build(pattern: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let regex = if pattern.is_empty() {
            None
        } else if case_insensitive {
            Some(Regex::new(&format!("(?i){}", pattern))?)
        } else {
            Some(Regex::new(pattern)?)
        };

        Ok(Self {
            regex,
            pattern: pattern.to_string(),
            kinds: HashSet::new(),
            case_insensitive,
        })
    }

    /// Check if an entry matches this filter
    pub fn matches(&self, entry: &ActivityEntry) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&entry.kind) {
            return false;
        }

        match &self.regex {
            Some(re) => re.is_match(&entry.text),
            None => true,
        }
    }

    /// Find all match positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            None => Vec::new(),
        }
    }

    /// Get the original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl std::fmt::Debug for ActivityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityFilter")
            .field("pattern", &self.pattern)
            .field("kinds", &self.kinds)
            .finish()
    }
}

/// Quick filter presets
pub struct FilterPresets;

impl FilterPresets {
    /// Commands and errors only, no captured output
    pub fn commands_and_errors() -> ActivityFilter {
        let kinds = HashSet::from([ActivityKind::Command, ActivityKind::Error]);
        ActivityFilter {
            regex: None,
            pattern: String::new(),
            kinds,
            case_insensitive: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_filter() {
        let filter = ActivityFilter::new("project").unwrap();
        let mut entry = ActivityEntry::new(ActivityKind::Command, "kde project ls");
        assert!(filter.matches(&entry));

        entry.text = "kde ls".to_string();
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn test_case_insensitive() {
        let filter = ActivityFilter::new_case_insensitive("RUNNING").unwrap();
        let entry = ActivityEntry::new(ActivityKind::Info, "dev is running");
        assert!(filter.matches(&entry));
        assert!(filter.is_case_insensitive());
    }

    #[test]
    fn test_kind_preset() {
        let filter = FilterPresets::commands_and_errors();
        assert!(filter.matches(&ActivityEntry::new(ActivityKind::Error, "boom")));
        assert!(!filter.matches(&ActivityEntry::new(ActivityKind::Output, "dev")));
    }

    #[test]
    fn test_find_matches() {
        let filter = ActivityFilter::new("kde").unwrap();
        assert_eq!(filter.find_matches("kde use dev && kde stop dev").len(), 2);
    }

    #[test]
    fn test_invalid_regex() {
        assert!(ActivityFilter::new("(").is_err());
    }
}
