//! 高亮去抖：每次编辑把该缓冲区的截止时间推后，安静期过去后才重新解析

use crate::kernel::session::BufferId;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct HighlightScheduler {
    delay: Duration,
    deadlines: FxHashMap<BufferId, Instant>,
}

impl HighlightScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: FxHashMap::default(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, id: BufferId, now: Instant) {
        self.deadlines.insert(id, now + self.delay);
    }

    pub fn cancel(&mut self, id: BufferId) {
        self.deadlines.remove(&id);
    }

    pub fn is_pending(&self, id: BufferId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// 取出所有已到期的缓冲区，按 id 排序
    pub fn take_due(&mut self, now: Instant) -> Vec<BufferId> {
        let mut due: Vec<BufferId> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in &due {
            self.deadlines.remove(id);
        }
        due.sort();
        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/highlight.rs"]
mod tests;
