use engine_logging::{engine_error, engine_info, engine_warn};
use harvester_core::{HarvestConfig, Instance};
use serde_json::Value;

use crate::fetch::{data_section, Endpoint, Fetcher};
use crate::{EndpointKind, FailureKind, FetchError};

/// Query parameters of the instance search. The date filters, process and
/// project are always sent; limit, offset and status only when set.
pub fn search_query(config: &HarvestConfig, offset: usize) -> Vec<(String, String)> {
    let mut query = vec![
        (config.from_date_criteria.clone(), config.from_date.clone()),
        (config.to_date_criteria.clone(), config.to_date.clone()),
        ("searchFilter".to_string(), config.process_name.clone()),
        ("projectFilter".to_string(), config.project.clone()),
    ];
    if config.instance_limit > 0 {
        query.push(("limit".to_string(), config.instance_limit.to_string()));
    }
    if offset > 0 {
        query.push(("offset".to_string(), offset.to_string()));
    }
    if !config.status_filter.is_empty() {
        query.push(("statusFilter".to_string(), config.status_filter.clone()));
    }
    query
}

/// Runs one instance search. A failed search is logged and reported as no
/// instances, the same as an empty result.
pub async fn discover(fetcher: &dyn Fetcher, config: &HarvestConfig, offset: usize) -> Vec<Instance> {
    let endpoint = Endpoint::Search {
        query: search_query(config, offset),
    };
    let result = fetcher
        .fetch(&endpoint)
        .await
        .and_then(instances_from_search);

    match result {
        Ok(instances) => {
            engine_info!(
                "Found {} instances of {} in project {} (offset {})",
                instances.len(),
                config.process_name,
                config.project,
                offset
            );
            instances
        }
        Err(err) => {
            engine_error!(
                "Instance search for {} in project {} failed: {}",
                config.process_name,
                config.project,
                err
            );
            Vec::new()
        }
    }
}

fn instances_from_search(body: Value) -> Result<Vec<Instance>, FetchError> {
    let data = data_section(body, EndpointKind::Search)?;
    let processes = data
        .get("processes")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FetchError::new(FailureKind::Decode, "search response has no `processes` list")
        })?;

    Ok(processes
        .iter()
        .filter_map(|process| match process.get("piid").and_then(Value::as_str) {
            Some(piid) => Some(Instance::new(piid)),
            None => {
                engine_warn!("Skipping search entry without a piid: {}", process);
                None
            }
        })
        .collect())
}
