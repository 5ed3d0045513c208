//! Submission history with a navigation cursor

/// Maximum number of history entries
const HISTORY_LIMIT: usize = 1000;

/// Text submissions, oldest first
///
/// The cursor ranges over `0..=len`; `len` means "not navigating", where the
/// input line shows the draft that was being typed before navigation began.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    draft: Option<String>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Create an empty history keeping at most `max_entries`
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            draft: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position, always `<= len()`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entries, oldest first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append a submission and reset the cursor to the end
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        while self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
        self.draft = None;
    }

    /// Step to the previous (older) entry
    ///
    /// Returns the text the input should now show, or `None` when already at
    /// the oldest entry. `current` is kept as the draft when leaving the end.
    pub fn back(&mut self, current: &str) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        if self.cursor == self.entries.len() {
            self.draft = Some(current.to_string());
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step to the next (newer) entry, or back to the draft at the end
    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        if self.cursor == self.entries.len() {
            Some(self.draft.as_deref().unwrap_or(""))
        } else {
            Some(&self.entries[self.cursor])
        }
    }
}
