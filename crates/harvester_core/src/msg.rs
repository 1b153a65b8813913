use crate::Instance;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the run.
    Start,
    /// Result of a `Discover` effect. A failed search arrives as an empty list.
    Discovered(Vec<Instance>),
    /// The batch handed out by `SummarizeBatch`, with task lists populated.
    BatchSummarized(Vec<Instance>),
    /// The batch handed out by `HarvestBatch` has drained.
    BatchHarvested { event_count: usize },
}
