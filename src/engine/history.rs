// ABOUTME: Bounded append-only log of task results with derived statistics
// ABOUTME: Oldest entries are discarded once capacity is exceeded (FIFO truncation)

use std::collections::VecDeque;

use super::result::{HistoryStats, TaskResult};

pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

pub struct ExecutionHistory {
    capacity: usize,
    entries: VecDeque<TaskResult>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        // A zero-capacity log could never accept an entry and would make
        // append spin on an empty deque; one entry is the floor.
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    /// Append a terminal result, evicting from the front when full.
    pub fn append(&mut self, result: TaskResult) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent `count` results, oldest first.
    pub fn recent(&self, count: usize) -> Vec<TaskResult> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn all(&self) -> Vec<TaskResult> {
        self.entries.iter().cloned().collect()
    }

    /// Statistics are derived from whatever currently survives truncation,
    /// never accumulated separately.
    pub fn stats(&self) -> HistoryStats {
        let total = self.entries.len();
        if total == 0 {
            return HistoryStats::default();
        }

        let successful = self.entries.iter().filter(|r| r.is_successful()).count();
        let total_duration: u64 = self.entries.iter().map(|r| r.duration_ms).sum();

        HistoryStats {
            total_executions: total,
            success_rate: (successful as f64 / total as f64) * 100.0,
            avg_duration_ms: total_duration as f64 / total as f64,
        }
    }
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new()
    }
}
