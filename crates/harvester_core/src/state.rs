use std::collections::VecDeque;

use crate::{HarvestConfig, Instance, RunStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Discovering,
    Summarizing,
    Harvesting,
    /// Summarizing a batch taken from instances an earlier search left
    /// queued; no search is issued until the queue drains.
    PageRemaining,
    Done,
}

/// State of the outer paging loop. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
    queue: VecDeque<Instance>,
    phase: Phase,
    paging_size: usize,
    instance_limit: usize,
    next_offset: usize,
    discovery_exhausted: bool,
    batch_len: usize,
    stats: RunStats,
}

impl PageState {
    pub fn new(paging_size: usize, instance_limit: usize, offset: usize) -> Self {
        Self {
            paging_size,
            instance_limit,
            next_offset: offset,
            ..Self::default()
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(config.paging_size, config.instance_limit, config.offset)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Discovered instances not yet handed out in a batch.
    pub fn remaining(&self) -> impl Iterator<Item = &Instance> {
        self.queue.iter()
    }

    pub fn remaining_len(&self) -> usize {
        self.queue.len()
    }

    pub fn next_offset(&self) -> usize {
        self.next_offset
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn has_queued(&self) -> bool {
        !self.queue.is_empty()
    }

    pub(crate) fn discovery_exhausted(&self) -> bool {
        self.discovery_exhausted
    }

    /// Queues a discovery result and decides whether the server may still
    /// hold more instances for the same search.
    pub(crate) fn accept_discovery(&mut self, instances: Vec<Instance>) {
        let count = instances.len();
        self.stats.discoveries += 1;
        self.next_offset += count;
        self.discovery_exhausted =
            count == 0 || self.instance_limit == 0 || count < self.instance_limit;
        self.queue.extend(instances);
    }

    /// Splits off the next batch: at most `paging_size` instances, or the
    /// whole queue when `paging_size` is 0.
    pub(crate) fn take_batch(&mut self) -> Vec<Instance> {
        let take = if self.paging_size > 0 {
            self.paging_size.min(self.queue.len())
        } else {
            self.queue.len()
        };
        let batch: Vec<Instance> = self.queue.drain(..take).collect();
        self.batch_len = batch.len();
        batch
    }

    pub(crate) fn record_summaries(&mut self, batch: &[Instance]) {
        self.stats.tasks_seen += batch.iter().map(|i| i.task_ids().len()).sum::<usize>();
    }

    pub(crate) fn record_harvest(&mut self, event_count: usize) {
        self.stats.iterations += 1;
        self.stats.instances_processed += self.batch_len;
        self.stats.events_harvested += event_count;
        self.batch_len = 0;
    }
}
