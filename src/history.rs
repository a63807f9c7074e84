//! Command history
//!
//! A bounded, numbered record of submitted command lines. Numbers start at 1,
//! only ever grow, and survive eviction: with capacity 3, after `a b c d` the
//! retained entries are 2, 3 and 4.
//!
//! The navigation cursor starts one past the newest entry. `previous` moves
//! back towards the oldest retained entry, `next` forward towards the newest;
//! both clamp at the ends.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: BTreeMap<u64, String>,
    capacity: usize,
    next_number: u64,
    cursor: u64,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl CommandHistory {
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: capacity.max(1),
            next_number: 1,
            cursor: 1,
        }
    }

    /// Record a line; returns its number
    pub fn add(&mut self, line: impl Into<String>) -> u64 {
        let number = self.next_number;
        self.entries.insert(number, line.into());
        self.next_number += 1;

        while self.entries.len() > self.capacity {
            self.entries.pop_first();
        }

        self.cursor = self.next_number;
        number
    }

    /// Step back one entry; empty string when there is no history
    pub fn previous(&mut self) -> String {
        let Some(first) = self.first_number() else {
            return String::new();
        };
        self.cursor = self.cursor.saturating_sub(1).max(first);
        self.current()
    }

    /// Step forward one entry; empty string when there is no history
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> String {
        let Some(last) = self.last_number() else {
            return String::new();
        };
        self.cursor = (self.cursor + 1).min(last);
        self.current()
    }

    fn current(&self) -> String {
        self.entries.get(&self.cursor).cloned().unwrap_or_default()
    }

    /// Forget everything, including the number sequence
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_number = 1;
        self.cursor = 1;
    }

    pub fn get(&self, number: u64) -> Option<&str> {
        self.entries.get(&number).map(String::as_str)
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(n, text)| (*n, text.as_str()))
    }

    pub fn first_number(&self) -> Option<u64> {
        self.entries.keys().next().copied()
    }

    pub fn last_number(&self) -> Option<u64> {
        self.entries.keys().next_back().copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `<right-aligned number> <text>` per entry, numbers padded to the
    /// width of the newest one
    pub fn listing(&self) -> String {
        let width = self.last_number().map_or(1, |n| n.to_string().len());
        self.entries
            .iter()
            .map(|(number, text)| format!("{:>width$} {}", number, text, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
