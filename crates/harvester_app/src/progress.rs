use std::sync::atomic::{AtomicUsize, Ordering};

use engine_logging::{engine_debug, engine_info};
use harvester_engine::{EngineEvent, HarvestProgress, ProgressSink, Stage};

/// Reports engine progress through the log, at most one info line per
/// tenth of a stage.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: AtomicUsize,
}

impl ProgressSink for LogProgress {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::Progress(HarvestProgress {
                stage: Stage::Summarizing | Stage::Harvesting,
                completed,
                total,
            }) if total > 0 => {
                let decile = completed * 10 / total;
                let previous = self.last_decile.swap(decile, Ordering::Relaxed);
                if decile != previous || completed == total {
                    engine_info!("{}/{} ({}%)", completed, total, decile * 10);
                }
            }
            EngineEvent::Progress(progress) => engine_debug!("{:?}", progress),
            EngineEvent::RunCompleted(stats) => {
                engine_debug!("Run statistics: {:?}", stats);
            }
        }
    }
}
