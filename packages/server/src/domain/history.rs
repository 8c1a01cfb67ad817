//! Bounded history of recently broadcast webhook messages.
//!
//! Used to pre-populate the home page; it is not replayed to clients.

use std::collections::VecDeque;

use serde::Serialize;

/// Number of messages kept by default.
pub const DEFAULT_HISTORY_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Rendered message body
    pub body: String,
    /// Unix timestamp (milliseconds) when the webhook was received
    pub received_at: i64,
}

/// FIFO of the most recent messages, oldest first.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl MessageHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest ones beyond capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(body: &str) -> HistoryEntry {
        HistoryEntry {
            body: body.to_string(),
            received_at: 1000,
        }
    }

    #[test]
    fn test_history_drops_oldest_beyond_capacity() {
        // テスト項目: 容量を超えると最も古いメッセージから削除される
        // given (前提条件):
        let mut history = MessageHistory::new(2);

        // when (操作):
        history.push(entry("one"));
        history.push(entry("two"));
        history.push(entry("three"));

        // then (期待する結果):
        let bodies: Vec<&str> = history.entries().map(|e| e.body.as_str()).collect();
        assert_eq!(bodies, vec!["two", "three"]);
    }

    #[test]
    fn test_history_with_zero_capacity_keeps_nothing() {
        // テスト項目: 容量 0 の履歴には何も保存されない
        // given (前提条件):
        let mut history = MessageHistory::new(0);

        // when (操作):
        history.push(entry("one"));

        // then (期待する結果):
        assert!(history.is_empty());
    }
}
