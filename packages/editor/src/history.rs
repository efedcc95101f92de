//! # History Stack
//!
//! Linear undo/redo over full snapshots of the component sequence.
//!
//! ## Design
//!
//! - `push` records the state *before* a mutation
//! - Undo hands back the most recent past state and parks the live one in
//!   the future list
//! - Redo is the inverse
//! - New pushes discard the future (no branching)
//! - The past list is bounded; the oldest entry is evicted first
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = HistoryStack::new();
//!
//! history.push(components.clone());
//! components.push(new_component);
//!
//! if let Some(previous) = history.undo(components.clone()) {
//!     components = previous;
//! }
//! ```

use std::collections::VecDeque;

/// Default number of undo levels
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded undo/redo log of snapshots
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    /// Snapshots before each mutation (most recent last)
    past: VecDeque<T>,

    /// Snapshots undone from (next redo first)
    future: VecDeque<T>,

    /// Maximum number of past entries (0 = unlimited)
    capacity: usize,
}

impl<T> HistoryStack<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            capacity,
        }
    }

    /// Record the state before a committed mutation
    pub fn push(&mut self, snapshot: T) {
        self.past.push_back(snapshot);
        self.evict_overflow();

        // New action invalidates future
        self.future.clear();
    }

    /// Step back; `current` is the live state being replaced
    ///
    /// Returns `None` (and drops nothing) when there is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Step forward; `current` is the live state being replaced
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.future.pop_front()?;
        self.past.push_back(current);
        self.evict_overflow();
        Some(next)
    }

    fn evict_overflow(&mut self) {
        while self.capacity > 0 && self.past.len() > self.capacity {
            self.past.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Past snapshots, oldest first
    pub fn past(&self) -> impl Iterator<Item = &T> {
        self.past.iter()
    }

    /// Future snapshots, next redo first
    pub fn future(&self) -> impl Iterator<Item = &T> {
        self.future.iter()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn past(stack: &HistoryStack<&'static str>) -> Vec<&'static str> {
        stack.past().copied().collect()
    }

    fn future(stack: &HistoryStack<&'static str>) -> Vec<&'static str> {
        stack.future().copied().collect()
    }

    #[test]
    fn test_history_creation() {
        let stack: HistoryStack<u32> = HistoryStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.capacity(), DEFAULT_HISTORY_CAPACITY);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_bound_keeps_most_recent_entries() {
        let mut stack = HistoryStack::new();
        for i in 1..=60u32 {
            stack.push(i);
        }

        let kept: Vec<u32> = stack.past().copied().collect();
        assert_eq!(kept, (11..=60).collect::<Vec<u32>>());
    }

    #[test]
    fn test_undo_redo_linearity() {
        // past=[A,B], live=C
        let mut stack = HistoryStack::new();
        stack.push("A");
        stack.push("B");
        let mut live = "C";

        live = stack.undo(live).unwrap();
        assert_eq!(live, "B");
        assert_eq!(future(&stack), vec!["C"]);

        live = stack.undo(live).unwrap();
        assert_eq!(live, "A");
        assert_eq!(future(&stack), vec!["B", "C"]);

        live = stack.redo(live).unwrap();
        assert_eq!(live, "B");
        assert_eq!(future(&stack), vec!["C"]);

        stack.push(live);
        live = "D";
        assert_eq!(past(&stack), vec!["A", "B"]);
        assert_eq!(live, "D");
        assert!(future(&stack).is_empty());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut stack: HistoryStack<&str> = HistoryStack::new();
        assert_eq!(stack.undo("live"), None);
        assert_eq!(stack.redo("live"), None);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_redo_respects_bound() {
        let mut stack = HistoryStack::with_capacity(2);
        stack.push(1);
        stack.push(2);
        let live = stack.undo(3).unwrap();
        assert_eq!(live, 2);

        // Redo pushes the live state back onto a full past list
        stack.push(10);
        stack.push(11);
        let live = stack.undo(12).unwrap();
        let live = stack.redo(live).unwrap();
        assert_eq!(live, 12);
        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut stack = HistoryStack::with_capacity(0);
        for i in 0..200 {
            stack.push(i);
        }
        assert_eq!(stack.undo_levels(), 200);
    }
}
