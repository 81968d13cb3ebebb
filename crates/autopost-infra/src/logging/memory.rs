use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Mutex;

use autopost_core::{LogEntry, LogLevel};

use super::LogSink;

pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Bounded in-memory log, oldest entries evicted first.
#[derive(Debug)]
pub struct MemorySink {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// One line per entry: level, timestamp, message.
    pub fn render_text(&self, include_debug: bool) -> String {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = String::new();
        for entry in entries.iter() {
            if entry.level == LogLevel::Debug && !include_debug {
                continue;
            }
            let _ = writeln!(
                out,
                "{:<6} {:<19} {}",
                entry.level.to_string(),
                entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                entry.message
            );
        }
        out
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_first() {
        let sink = MemorySink::new(3);
        for i in 0..5 {
            sink.write(&LogEntry::new(LogLevel::Info, format!("entry {}", i)));
        }
        let messages: Vec<_> = sink.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_render_text_filters_debug() {
        let sink = MemorySink::default();
        sink.write(&LogEntry::new(LogLevel::Debug, "noisy"));
        sink.write(&LogEntry::new(LogLevel::Error, "broken"));

        let text = sink.render_text(false);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("error  "));
        assert!(text.trim_end().ends_with("broken"));

        let text = sink.render_text(true);
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("debug  "));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let sink = MemorySink::new(0);
        sink.write(&LogEntry::new(LogLevel::Info, "a"));
        sink.write(&LogEntry::new(LogLevel::Info, "b"));
        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.capacity(), 1);
    }
}
