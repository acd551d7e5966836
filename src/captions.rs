//! Caption data model
//!
//! A caption entry is a finalized (text, emotion) pair produced by the
//! classifier. The log is append-only: entries are never mutated, removed,
//! or reordered once added, and insertion order is display order.

use serde::{Deserialize, Serialize};

/// A finalized caption segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CaptionEntry {
    /// Text returned by the classifier (already trimmed)
    pub text: String,
    /// Predicted emotion label (e.g. "Happy"), if one was returned
    pub emotion: Option<String>,
}

/// Append-only ordered caption log
#[derive(Debug, Default, Clone)]
pub(crate) struct CaptionLog {
    entries: Vec<CaptionEntry>,
}

impl CaptionLog {
    /// Append an entry to the end of the log
    pub fn push(&mut self, entry: CaptionEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clone the current contents for a snapshot reply
    pub fn snapshot(&self) -> Vec<CaptionEntry> {
        self.entries.clone()
    }
}
