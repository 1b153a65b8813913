use crate::{EngineEvent, HarvestProgress, Stage};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: EngineEvent) {}
}

pub(crate) fn report(sink: &dyn ProgressSink, stage: Stage, completed: usize, total: usize) {
    sink.emit(EngineEvent::Progress(HarvestProgress {
        stage,
        completed,
        total,
    }));
}
