//! Token-budgeted window over the most recent turns
//!
//! The buffer is a view, never a system of record: eviction only drops
//! entries from the view, the durable transcript keeps everything. It can
//! be rebuilt from the transcript tail at any time, so it is not persisted
//! on its own.

use super::Turn;

/// Bounded oldest-first window of the latest turns in a session
///
/// Capacity is measured as an approximate token budget rather than a
/// message count. When an append pushes the total over budget, the oldest
/// entries are evicted until the budget is satisfied again.
#[derive(Debug, Clone)]
pub struct RecentBuffer {
    turns: Vec<Turn>,
    token_budget: usize,
    token_count: usize,
}

impl RecentBuffer {
    /// Create an empty buffer with the given token budget
    ///
    /// # Examples
    ///
    /// ```
    /// use mnemo::memory::RecentBuffer;
    ///
    /// let buffer = RecentBuffer::new(2000);
    /// assert!(buffer.is_empty());
    /// assert_eq!(buffer.token_budget(), 2000);
    /// ```
    pub fn new(token_budget: usize) -> Self {
        Self {
            turns: Vec::new(),
            token_budget,
            token_count: 0,
        }
    }

    /// Rebuild the view from turns ordered newest first
    ///
    /// Walks backwards from the newest turn, admitting entries until the
    /// budget is spent, then stores them oldest first. This is how the view
    /// is reconstructed from the persisted transcript after a restart.
    pub fn from_newest<I>(token_budget: usize, newest_first: I) -> Self
    where
        I: IntoIterator<Item = Turn>,
    {
        let mut buffer = Self::new(token_budget);

        for turn in newest_first {
            let cost = turn.token_cost();
            if buffer.token_count + cost > token_budget {
                break;
            }
            buffer.token_count += cost;
            buffer.turns.push(turn);
        }

        buffer.turns.reverse();
        buffer
    }

    /// Append a turn, evicting from the front until the budget holds
    ///
    /// A turn larger than the whole budget is evicted along with everything
    /// else, leaving the view empty. The transcript still records it.
    ///
    /// # Examples
    ///
    /// ```
    /// use mnemo::memory::{RecentBuffer, Turn};
    ///
    /// let mut buffer = RecentBuffer::new(2000);
    /// buffer.push(Turn::new("hello", "hi there"));
    /// assert_eq!(buffer.len(), 1);
    /// ```
    pub fn push(&mut self, turn: Turn) {
        self.token_count += turn.token_cost();
        self.turns.push(turn);

        while self.token_count > self.token_budget && !self.turns.is_empty() {
            let evicted = self.turns.remove(0);
            self.token_count -= evicted.token_cost();
        }
    }

    /// Turns currently in view, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Approximate token total of the turns in view
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Configured token budget
    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Number of turns in view
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true when nothing is in view
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn from the view
    pub fn clear(&mut self) {
        self.turns.clear();
        self.token_count = 0;
    }
}
