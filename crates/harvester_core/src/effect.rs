use crate::Instance;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue one instance search starting at `offset`.
    Discover { offset: usize },
    /// Fetch the task summaries of every instance in the batch.
    SummarizeBatch(Vec<Instance>),
    /// Fetch and map the task details of every instance in the batch.
    HarvestBatch(Vec<Instance>),
    /// The run is over.
    Finished(RunStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub iterations: usize,
    pub discoveries: usize,
    pub instances_processed: usize,
    pub tasks_seen: usize,
    pub events_harvested: usize,
}
