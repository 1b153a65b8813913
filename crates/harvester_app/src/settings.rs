use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use harvester_core::HarvestConfig;
use serde::{Deserialize, Serialize};

/// Where the export lands. An empty `csv_filename` is replaced by
/// `<process>_<timestamp>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub csv_path: PathBuf,
    pub csv_filename: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("."),
            csv_filename: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub harvest: HarvestConfig,
    pub output: OutputSettings,
    pub log_file: Option<PathBuf>,
}

impl AppSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {:?}", path))?;
        ron::from_str(&content).with_context(|| format!("failed to parse settings in {:?}", path))
    }

    /// Base name of the exported files, without extension.
    pub fn export_base_name(&self, now: DateTime<Local>) -> String {
        let configured = self.output.csv_filename.trim();
        if !configured.is_empty() {
            return configured.to_string();
        }
        let process: String = self
            .harvest
            .process_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("{}_{}", process, now.format("%Y-%m-%d_%H-%M-%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"(
        harvest: (
            root_url: "https://baw.example.com:9443",
            credentials: (user: "admin", password_env_var: "BAW_PASSWORD"),
            process_name: "Hiring Sample",
            project: "HSS",
            from_date: "2022-01-01T00:00:00Z",
            to_date: "2022-12-31T00:00:00Z",
            paging_size: 20,
            mapping: (
                extra_variable_paths: ["requisition.gmApproval"],
            ),
        ),
        output: (csv_path: "exports"),
        log_file: Some("harvest.log"),
    )"#;

    #[test]
    fn parses_partial_ron_with_defaults() {
        let settings: AppSettings = ron::from_str(SAMPLE).unwrap();

        assert_eq!(settings.harvest.process_name, "Hiring Sample");
        assert_eq!(settings.harvest.paging_size, 20);
        assert_eq!(settings.harvest.concurrency, 10);
        assert_eq!(settings.harvest.from_date_criteria, "createdAfter");
        assert_eq!(settings.harvest.credentials.password_env_var, "BAW_PASSWORD");
        assert_eq!(
            settings.harvest.mapping.extra_variable_paths,
            vec!["requisition.gmApproval".to_string()]
        );
        assert!(!settings.harvest.mapping.rename.is_empty());
        assert_eq!(settings.output.csv_path, PathBuf::from("exports"));
        assert_eq!(settings.log_file, Some(PathBuf::from("harvest.log")));
        assert!(settings.harvest.validate().is_ok());
    }

    #[test]
    fn base_name_defaults_to_process_and_timestamp() {
        let settings: AppSettings = ron::from_str(SAMPLE).unwrap();
        let now = Local.with_ymd_and_hms(2022, 3, 1, 10, 5, 9).unwrap();
        assert_eq!(
            settings.export_base_name(now),
            "Hiring_Sample_2022-03-01_10-05-09"
        );
    }

    #[test]
    fn configured_base_name_wins() {
        let mut settings = AppSettings::default();
        settings.output.csv_filename = "hiring_events".into();
        assert_eq!(settings.export_base_name(Local::now()), "hiring_events");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppSettings::load(&dir.path().join("missing.ron")).unwrap_err();
        assert!(err.to_string().contains("failed to read settings"));
    }
}
