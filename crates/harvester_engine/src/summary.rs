use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::stream::{self, StreamExt};
use harvester_core::Instance;
use serde_json::Value;

use crate::fetch::{data_section, Endpoint, Fetcher};
use crate::progress::{report, ProgressSink};
use crate::{EndpointKind, FailureKind, FetchError, Stage};

/// Fetches the task list of every instance, at most `concurrency` requests
/// in flight. Returns once every instance has its list; an instance whose
/// summary could not be fetched comes back with no tasks.
pub async fn fetch_summaries(
    fetcher: &dyn Fetcher,
    instances: Vec<Instance>,
    concurrency: usize,
    sink: &dyn ProgressSink,
) -> Vec<Instance> {
    let total = instances.len();
    engine_info!("Fetching task summaries for {} instances", total);

    let mut pending = stream::iter(instances)
        .map(|instance| async move {
            let result = task_ids(fetcher, instance.process_instance_id()).await;
            match result {
                Ok(ids) => {
                    engine_debug!(
                        "Instance {} has {} tasks",
                        instance.process_instance_id(),
                        ids.len()
                    );
                    instance.with_task_ids(ids)
                }
                Err(err) => {
                    engine_warn!(
                        "Task summary for instance {} failed: {}",
                        instance.process_instance_id(),
                        err
                    );
                    instance
                }
            }
        })
        .buffer_unordered(concurrency.max(1));

    let mut summarized = Vec::with_capacity(total);
    while let Some(instance) = pending.next().await {
        summarized.push(instance);
        report(sink, Stage::Summarizing, summarized.len(), total);
    }
    summarized
}

/// Task IDs of one instance, in the order the server lists them.
async fn task_ids(fetcher: &dyn Fetcher, instance_id: &str) -> Result<Vec<String>, FetchError> {
    let body = fetcher
        .fetch(&Endpoint::TaskSummary {
            instance_id: instance_id.to_string(),
        })
        .await?;
    let data = data_section(body, EndpointKind::TaskSummary)?;
    let tasks = data.get("tasks").and_then(Value::as_array).ok_or_else(|| {
        FetchError::new(FailureKind::Decode, "task summary has no `tasks` list")
    })?;

    Ok(tasks
        .iter()
        .filter_map(|task| match task.get("tkiid").and_then(Value::as_str) {
            Some(id) => Some(id.to_string()),
            None => {
                engine_warn!("Instance {} lists a task without tkiid", instance_id);
                None
            }
        })
        .collect())
}
