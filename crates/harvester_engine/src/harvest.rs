use engine_logging::{engine_info, engine_warn};
use futures_util::stream::{self, StreamExt};
use harvester_core::{map_to_event, CompiledMapping, Event, Instance, RawRecord, ResultSet};

use crate::fetch::{data_section, Endpoint, Fetcher};
use crate::progress::{report, ProgressSink};
use crate::{EndpointKind, FailureKind, FetchError, Stage};

/// Fetches the detail of every task of every instance, at most
/// `concurrency` requests in flight, and maps each into an event. A task
/// whose detail cannot be fetched contributes nothing; the others carry on.
pub async fn harvest_events(
    fetcher: &dyn Fetcher,
    instances: &[Instance],
    mapping: &CompiledMapping,
    concurrency: usize,
    sink: &dyn ProgressSink,
) -> ResultSet {
    let work: Vec<(&str, &str)> = instances
        .iter()
        .flat_map(|instance| {
            instance
                .task_ids()
                .iter()
                .map(move |task_id| (instance.process_instance_id(), task_id.as_str()))
        })
        .collect();
    let total = work.len();
    engine_info!("Creating events from {} tasks", total);

    let mut pending = stream::iter(work)
        .map(|(instance_id, task_id)| async move {
            match task_event(fetcher, task_id, mapping).await {
                Ok(event) => Some(event),
                Err(err) => {
                    engine_warn!(
                        "Skipping task {} of instance {}: {}",
                        task_id,
                        instance_id,
                        err
                    );
                    None
                }
            }
        })
        .buffer_unordered(concurrency.max(1));

    let mut completed = 0;
    let mut events = ResultSet::new();
    while let Some(outcome) = pending.next().await {
        completed += 1;
        if let Some(event) = outcome {
            events.push(event);
        }
        report(sink, Stage::Harvesting, completed, total);
    }
    events
}

async fn task_event(
    fetcher: &dyn Fetcher,
    task_id: &str,
    mapping: &CompiledMapping,
) -> Result<Event, FetchError> {
    let body = fetcher
        .fetch(&Endpoint::TaskDetail {
            task_id: task_id.to_string(),
        })
        .await?;
    let data = data_section(body, EndpointKind::TaskDetail)?;
    let raw = RawRecord::from_value(data)
        .ok_or_else(|| FetchError::new(FailureKind::Decode, "task detail is not an object"))?;

    let mapped = map_to_event(raw, mapping);
    for diagnostic in &mapped.diagnostics {
        engine_warn!("Task {}: {}", task_id, diagnostic);
    }
    Ok(mapped.event)
}
