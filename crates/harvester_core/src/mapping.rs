//! Field mapping: turns one raw task-detail record into one [`Event`].
//!
//! The passes run in a fixed order (rename, include, exposed variables,
//! extracted variables). A source field is consumed by the first pass that
//! uses it, and a pass never replaces a key an earlier pass produced.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{PathQuery, RawRecord};
use crate::{ConfigError, Event};

pub const EXPOSED_PREFIX: &str = "trkd.";
pub const EXTRACTED_PREFIX: &str = "tsk.";

const VARIABLES_ROOT: &str = "variables";
const DATA_SECTION: &str = "data";
const PROCESS_DATA: &str = "processData";
const BUSINESS_DATA: &str = "businessData";

/// How raw task fields become event columns. Fields left out of a settings
/// file keep their [`FieldMappingSpec::baw_default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMappingSpec {
    /// `(output_key, source_key)` pairs, applied in order.
    pub rename: Vec<(String, String)>,
    /// Source keys copied verbatim when still present after renaming.
    pub include: Vec<String>,
    /// Dotted paths looked up under `data.variables`.
    pub extra_variable_paths: Vec<String>,
    pub export_exposed_variables: bool,
}

impl Default for FieldMappingSpec {
    fn default() -> Self {
        Self::baw_default()
    }
}

impl FieldMappingSpec {
    /// Process-mining mapping and task fields for IBM BAW task details.
    pub fn baw_default() -> Self {
        let rename = [
            ("process_ID", "piid"),
            ("task_name", "name"),
            ("start_date", "startTime"),
            ("end_date", "completionTime"),
            ("owner", "owner"),
            ("team", "teamDisplayName"),
        ];
        let include = [
            "activationTime",
            "atRiskTime",
            "completionTime",
            "description",
            "isAtRisk",
            "originator",
            "priority",
            "startTime",
            "state",
            "piid",
            "priorityName",
            "teamDisplayName",
            "managerTeamDisplayName",
            "tkiid",
            "name",
            "status",
            "owner",
            "assignedToDisplayName",
            "assignedToType",
            "dueTime",
            "closeByUser",
        ];
        Self {
            rename: rename
                .iter()
                .map(|(out, src)| (out.to_string(), src.to_string()))
                .collect(),
            include: include.iter().map(|k| k.to_string()).collect(),
            extra_variable_paths: Vec::new(),
            export_exposed_variables: false,
        }
    }

    pub fn compile(&self) -> Result<CompiledMapping, ConfigError> {
        let extracted = self
            .extra_variable_paths
            .iter()
            .map(|path| {
                let query = PathQuery::parse(path).map_err(|source| {
                    ConfigError::InvalidVariablePath {
                        path: path.clone(),
                        source,
                    }
                })?;
                Ok(ExtractedVariable {
                    column: format!("{EXTRACTED_PREFIX}{path}"),
                    query: query.prefixed(VARIABLES_ROOT),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(CompiledMapping {
            spec: self.clone(),
            extracted,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtractedVariable {
    column: String,
    query: PathQuery,
}

/// A [`FieldMappingSpec`] with its variable paths parsed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMapping {
    spec: FieldMappingSpec,
    extracted: Vec<ExtractedVariable>,
}

impl CompiledMapping {
    pub fn spec(&self) -> &FieldMappingSpec {
        &self.spec
    }
}

/// A renamed field whose source was absent from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingMiss {
    pub output_key: String,
    pub source_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingDiagnostic {
    Miss(MappingMiss),
    /// `processData.businessData` did not have the expected shape; the
    /// exposed-variable pass was skipped.
    MalformedBusinessData(String),
}

impl fmt::Display for MappingDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingDiagnostic::Miss(miss) => write!(
                f,
                "task data `{}` mapped to `{}` not found",
                miss.source_key, miss.output_key
            ),
            MappingDiagnostic::MalformedBusinessData(reason) => {
                write!(f, "exposed variables skipped: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedEvent {
    pub event: Event,
    pub diagnostics: Vec<MappingDiagnostic>,
}

/// Maps one raw task-detail record into an event. Pure; diagnostics are
/// handed back for the caller to log.
pub fn map_to_event(mut raw: RawRecord, mapping: &CompiledMapping) -> MappedEvent {
    let spec = &mapping.spec;
    let mut event = Event::new();
    let mut diagnostics = Vec::new();

    for (output_key, source_key) in &spec.rename {
        match raw.take(source_key) {
            Some(value) => {
                event.insert_new(output_key.as_str(), value);
            }
            None => diagnostics.push(MappingDiagnostic::Miss(MappingMiss {
                output_key: output_key.clone(),
                source_key: source_key.clone(),
            })),
        }
    }

    for key in &spec.include {
        if let Some(value) = raw.take(key) {
            event.insert_new(key.as_str(), value);
        }
    }

    if spec.export_exposed_variables {
        if let Some(process_data) = raw.get(PROCESS_DATA) {
            match exposed_variables(process_data) {
                Ok(pairs) => {
                    for (name, value) in pairs {
                        event.insert_new(format!("{EXPOSED_PREFIX}{name}"), value.clone());
                    }
                }
                Err(reason) => diagnostics.push(MappingDiagnostic::MalformedBusinessData(reason)),
            }
        }
    }

    let data = raw.get(DATA_SECTION);
    for variable in &mapping.extracted {
        let value = data
            .and_then(|section| variable.query.find_first(section))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        event.insert_new(variable.column.as_str(), value);
    }

    MappedEvent { event, diagnostics }
}

/// Validates the whole `businessData` sequence before yielding anything, so
/// a malformed entry skips the pass instead of exporting half of it.
fn exposed_variables(process_data: &Value) -> Result<Vec<(&str, &Value)>, String> {
    let business = process_data
        .get(BUSINESS_DATA)
        .ok_or_else(|| format!("`{PROCESS_DATA}` has no `{BUSINESS_DATA}`"))?;
    let entries = business
        .as_array()
        .ok_or_else(|| format!("`{BUSINESS_DATA}` is not a sequence"))?;

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("entry {idx} has no string `name`"))?;
            let value = entry
                .get("value")
                .ok_or_else(|| format!("entry {idx} (`{name}`) has no `value`"))?;
            Ok((name, value))
        })
        .collect()
}
