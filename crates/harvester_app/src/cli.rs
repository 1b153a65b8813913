use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::settings::AppSettings;

/// Harvests task events of a workflow process into a CSV and ZIP export.
#[derive(Debug, Parser)]
#[command(name = "harvester", version)]
pub struct Cli {
    /// RON settings file.
    #[arg(short, long, default_value = "harvester.ron")]
    pub config: PathBuf,
    /// Directory for the export; overrides `output.csv_path`.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Export base name without extension; overrides `output.csv_filename`.
    #[arg(long)]
    pub output_name: Option<String>,
    /// Also write the log to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Instances summarized and harvested per iteration (0 = all).
    #[arg(long)]
    pub paging_size: Option<usize>,
    /// Simultaneous requests while fetching summaries and details.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Validate the server certificate chain.
    #[arg(long)]
    pub strict_tls: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(dir) = &self.output_dir {
            settings.output.csv_path = dir.clone();
        }
        if let Some(name) = &self.output_name {
            settings.output.csv_filename = name.clone();
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
        if let Some(paging_size) = self.paging_size {
            settings.harvest.paging_size = paging_size;
        }
        if let Some(concurrency) = self.concurrency {
            settings.harvest.concurrency = concurrency;
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
