use anyhow::Result;

use crate::message::Message;

pub const HISTORY_FAILED: &str = "Failed to load chat history";

/// Past messages fetched from the service, shown on the history screen.
///
/// This list shares the message shape with the live transcript but is a
/// separate collection; the two are never merged or de-duplicated (the
/// service does not guarantee consistent ids across the two paths).
pub struct History {
    sessions: Vec<Message>,
    loading: bool,
    loaded: bool,
    error: Option<String>,
    private_mode: bool,
}

impl History {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            loading: false,
            loaded: false,
            error: None,
            private_mode: false,
        }
    }

    /// Mark a fetch as started. Returns false when one is already in
    /// flight, so callers don't dispatch a second request.
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    /// Apply the fetch outcome: success replaces the list wholesale,
    /// failure sets a generic error and leaves the list as it was.
    pub fn finish_load(&mut self, result: Result<Vec<Message>>) {
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(messages) => {
                self.sessions = messages;
            }
            Err(_) => {
                self.error = Some(HISTORY_FAILED.to_string());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a fetch has ever completed; used to load once on first
    /// entry to the history screen.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_private(&self) -> bool {
        self.private_mode
    }

    /// Private mode gates display only. Fetches still run and their
    /// results are still stored while it is on; toggling it off reveals
    /// whatever arrived in the meantime.
    pub fn toggle_private_mode(&mut self) {
        self.private_mode = !self.private_mode;
    }

    /// The messages to render: the fetched list, or nothing while private
    /// mode is on.
    pub fn visible(&self) -> &[Message] {
        if self.private_mode {
            &[]
        } else {
            &self.sessions
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn fetched(n: usize) -> Vec<Message> {
        (0..n).map(|i| Message::assistant(format!("msg {}", i))).collect()
    }

    #[test]
    fn test_successful_load_replaces_wholesale() {
        let mut history = History::new();
        assert!(history.begin_load());
        history.finish_load(Ok(fetched(3)));

        assert_eq!(history.visible().len(), 3);
        assert!(!history.is_loading());
        assert!(history.has_loaded());
        assert!(history.error().is_none());

        // A second load does not merge, it replaces.
        assert!(history.begin_load());
        history.finish_load(Ok(fetched(2)));
        assert_eq!(history.visible().len(), 2);
    }

    #[test]
    fn test_failed_load_sets_error_and_keeps_list() {
        let mut history = History::new();
        history.begin_load();
        history.finish_load(Err(anyhow!("503")));

        assert!(history.is_empty());
        assert_eq!(history.error(), Some(HISTORY_FAILED));
        assert!(history.has_loaded());
    }

    #[test]
    fn test_begin_load_guards_concurrent_fetches() {
        let mut history = History::new();
        assert!(history.begin_load());
        assert!(!history.begin_load());

        history.finish_load(Ok(Vec::new()));
        assert!(history.begin_load());
    }

    #[test]
    fn test_retry_clears_previous_error() {
        let mut history = History::new();
        history.begin_load();
        history.finish_load(Err(anyhow!("down")));
        assert!(history.error().is_some());

        history.begin_load();
        assert!(history.error().is_none());
    }

    #[test]
    fn test_private_mode_hides_but_retains_fetches() {
        let mut history = History::new();
        history.toggle_private_mode();
        assert!(history.is_private());

        // The fetch still happens and its result is stored.
        history.begin_load();
        history.finish_load(Ok(fetched(2)));
        assert!(history.visible().is_empty());
        assert_eq!(history.len(), 2);

        history.toggle_private_mode();
        assert_eq!(history.visible().len(), 2);
    }
}
