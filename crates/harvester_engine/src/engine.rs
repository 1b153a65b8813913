use std::collections::VecDeque;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use harvester_core::{
    update, CompiledMapping, ConfigError, Effect, HarvestConfig, Msg, PageState, ResultSet,
};

use crate::credentials::ConfigCredentialResolver;
use crate::discover::discover;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::harvest::harvest_events;
use crate::progress::{report, ProgressSink};
use crate::summary::fetch_summaries;
use crate::{EngineEvent, FetchError, Stage};

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Client(#[from] FetchError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Drives one harvesting run: executes the paging state machine's effects
/// against the REST service and collects the resulting events.
pub struct Harvester {
    config: Arc<HarvestConfig>,
    mapping: CompiledMapping,
    fetcher: Arc<dyn Fetcher>,
}

impl Harvester {
    pub fn new(config: HarvestConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, HarvestError> {
        config.validate()?;
        let mapping = config.mapping.compile()?;
        Ok(Self {
            config: Arc::new(config),
            mapping,
            fetcher,
        })
    }

    /// Builds the reqwest client and the credential resolver from `config`.
    pub fn connect(config: HarvestConfig, settings: FetchSettings) -> Result<Self, HarvestError> {
        let root = config.parsed_root_url()?;
        let credentials = Arc::new(ConfigCredentialResolver::new(config.credentials.clone()));
        let fetcher = ReqwestFetcher::new(settings, root, credentials)?;
        Self::new(config, Arc::new(fetcher))
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub async fn run(&self, sink: &dyn ProgressSink) -> ResultSet {
        let fetcher = self.fetcher.as_ref();
        let concurrency = self.config.concurrency;
        let mut results = ResultSet::new();

        let (mut state, effects) = update(PageState::from_config(&self.config), Msg::Start);
        let mut pending: VecDeque<Effect> = effects.into();

        while let Some(effect) = pending.pop_front() {
            let msg = match effect {
                Effect::Discover { offset } => {
                    let instances = discover(fetcher, &self.config, offset).await;
                    report(sink, Stage::Discovering, instances.len(), instances.len());
                    Msg::Discovered(instances)
                }
                Effect::SummarizeBatch(batch) => {
                    engine_info!(
                        "Processing {} instances, {} still queued",
                        batch.len(),
                        state.remaining_len()
                    );
                    Msg::BatchSummarized(fetch_summaries(fetcher, batch, concurrency, sink).await)
                }
                Effect::HarvestBatch(batch) => {
                    let events =
                        harvest_events(fetcher, &batch, &self.mapping, concurrency, sink).await;
                    let event_count = events.len();
                    results.merge(events);
                    engine_debug!("Batch produced {} events", event_count);
                    Msg::BatchHarvested { event_count }
                }
                Effect::Finished(stats) => {
                    engine_info!(
                        "Harvest finished: {} events from {} instances ({} tasks) in {} iterations",
                        stats.events_harvested,
                        stats.instances_processed,
                        stats.tasks_seen,
                        stats.iterations
                    );
                    report(sink, Stage::Done, stats.instances_processed, stats.instances_processed);
                    sink.emit(EngineEvent::RunCompleted(stats));
                    break;
                }
            };
            let (next, effects) = update(state, msg);
            state = next;
            pending.extend(effects);
        }

        results
    }

    /// Runs the harvest on a dedicated tokio runtime.
    pub fn run_blocking(&self, sink: &dyn ProgressSink) -> Result<ResultSet, HarvestError> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(runtime.block_on(self.run(sink)))
    }
}
