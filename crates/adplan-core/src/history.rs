//! Bounded undo history of drawable-list snapshots.

use crate::config::CoreConfig;
use crate::shapes::Drawable;
use std::collections::VecDeque;

/// Default number of undo levels kept.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 30;

/// A drawable list captured before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    pub description: String,
    pub drawables: Vec<Drawable>,
}

/// LIFO stack of snapshots. When full, recording drops the oldest entry.
#[derive(Debug, Clone)]
pub struct UndoManager {
    stack: VecDeque<UndoSnapshot>,
    max_levels: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl UndoManager {
    pub fn new(max_levels: usize) -> Self {
        Self {
            stack: VecDeque::with_capacity(max_levels.min(DEFAULT_MAX_UNDO_LEVELS)),
            max_levels,
        }
    }

    /// Undo history sized by `config.max_undo_levels`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.max_undo_levels)
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Snapshot `current` before it is mutated.
    pub fn record_action(&mut self, current: &[Drawable], description: impl Into<String>) {
        if self.max_levels == 0 {
            return;
        }
        while self.stack.len() >= self.max_levels {
            self.stack.pop_front();
        }
        let description = description.into();
        log::debug!("Recorded undo step: {description}");
        self.stack.push_back(UndoSnapshot {
            description,
            drawables: current.to_vec(),
        });
    }

    /// Pop the most recent snapshot, or `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<UndoSnapshot> {
        self.stack.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Description of the step `undo` would revert.
    pub fn peek_description(&self) -> Option<&str> {
        self.stack.back().map(|s| s.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
