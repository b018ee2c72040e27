//! History API
//!
//! Session history (`pushState`, `replaceState`, back, forward, go) and the
//! `window.location` view of the current entry.

use url::Url;

use crate::DomError;

/// History entry
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub url: Url,
    pub state: Option<String>, // JSON-serialized state
}

/// `window.location` snapshot of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Full URL
    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// Pathname
    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    /// Hash/fragment including `#`; empty when absent or bare `#`
    pub fn hash(&self) -> String {
        match self.url.fragment() {
            Some(f) if !f.is_empty() => format!("#{}", f),
            _ => String::new(),
        }
    }
}

/// History manager
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
}

impl History {
    pub fn new(initial_url: &str) -> Result<Self, DomError> {
        Ok(Self {
            entries: vec![HistoryEntry {
                url: Url::parse(initial_url)?,
                state: None,
            }],
            current: 0,
        })
    }

    fn resolve(&self, url: &str) -> Result<Url, DomError> {
        Ok(self.current().url.join(url)?)
    }

    /// Push a new history entry; `url` is resolved against the current one
    pub fn push_state(&mut self, state: Option<String>, url: &str) -> Result<(), DomError> {
        let url = self.resolve(url)?;

        // Remove forward history
        self.entries.truncate(self.current + 1);

        self.entries.push(HistoryEntry { url, state });
        self.current = self.entries.len() - 1;
        Ok(())
    }

    /// Replace current entry
    pub fn replace_state(&mut self, state: Option<String>, url: &str) -> Result<(), DomError> {
        let url = self.resolve(url)?;
        let entry = &mut self.entries[self.current];
        entry.url = url;
        entry.state = state;
        Ok(())
    }

    /// Go back
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        self.go(-1)
    }

    /// Go forward
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        self.go(1)
    }

    /// Go to specific offset; out-of-range offsets are ignored
    pub fn go(&mut self, delta: isize) -> Option<&HistoryEntry> {
        let target = self.current.checked_add_signed(delta)?;
        if delta == 0 || target >= self.entries.len() {
            return None;
        }
        self.current = target;
        Some(&self.entries[self.current])
    }

    /// Get current entry
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// Location of the current entry
    pub fn location(&self) -> Location {
        Location::new(self.current().url.clone())
    }

    /// Get history length
    pub fn length(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_push() {
        let mut history = History::new("https://example.com/").unwrap();

        history.push_state(None, "#zone-map").unwrap();
        assert_eq!(history.length(), 2);
        assert_eq!(history.location().hash(), "#zone-map");
        assert_eq!(history.location().pathname(), "/");
    }

    #[test]
    fn test_history_navigation() {
        let mut history = History::new("https://example.com/").unwrap();
        history.push_state(None, "#one").unwrap();
        history.push_state(None, "#two").unwrap();

        history.back();
        assert_eq!(history.location().hash(), "#one");

        history.back();
        assert_eq!(history.location().hash(), "");
        assert!(history.back().is_none());

        history.forward();
        assert_eq!(history.location().hash(), "#one");

        // Pushing drops forward entries
        history.push_state(None, "#three").unwrap();
        assert_eq!(history.length(), 3);
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_history_replace() {
        let mut history = History::new("https://example.com/#home").unwrap();
        history.replace_state(None, "#zone-ink").unwrap();

        assert_eq!(history.length(), 1);
        assert_eq!(history.location().href(), "https://example.com/#zone-ink");
    }

    #[test]
    fn test_bare_hash_is_empty() {
        let history = History::new("https://example.com/#").unwrap();
        assert_eq!(history.location().hash(), "");
    }
}
