// History ledger for the AV Ops console
// Bounded, most-recent-first log of completed exchanges, plus replay into a draft

use std::collections::VecDeque;

use crate::models::{RequestDraft, ResponseRecord};
use crate::request::strip_query;

pub const HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone)]
pub struct HistoryLedger {
    entries: VecDeque<ResponseRecord>,
    capacity: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a record and evict the oldest ones past capacity.
    pub fn record(&mut self, entry: ResponseRecord) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// 0 is the most recent entry.
    pub fn get(&self, index: usize) -> Option<&ResponseRecord> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponseRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stage a past request in the draft without resending it.
///
/// Method, path and body come from the summary. The query string is dropped
/// and path/query params are left as they are.
pub fn replay(entry: &ResponseRecord, draft: &mut RequestDraft) {
    draft.method = entry.request.method;
    draft.path = strip_query(&entry.request.path).to_string();
    draft.body_text = entry.request.body_sent.clone();
}
