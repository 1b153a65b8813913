mod cli;
mod logging;
mod progress;
mod settings;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use engine_logging::{engine_info, engine_warn};
use harvester_engine::{export_events, FetchSettings, Harvester};

use crate::cli::Cli;
use crate::progress::LogProgress;
use crate::settings::AppSettings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = AppSettings::load(&cli.config)?;
    cli.apply(&mut settings);
    logging::initialize(cli.log_level(), settings.log_file.as_deref());

    let started = Local::now();
    let harvest = &settings.harvest;
    engine_info!(
        "Harvesting {} in project {} from {} ({} {} .. {} {})",
        harvest.process_name,
        harvest.project,
        harvest.root_url,
        harvest.from_date_criteria,
        harvest.from_date,
        harvest.to_date_criteria,
        harvest.to_date
    );

    let fetch = FetchSettings {
        accept_invalid_certs: !cli.strict_tls,
        ..FetchSettings::default()
    };
    if fetch.accept_invalid_certs {
        engine_warn!("TLS certificate validation is disabled; pass --strict-tls to enable it");
    }

    let harvester =
        Harvester::connect(harvest.clone(), fetch).context("failed to set up the harvester")?;
    let events = harvester
        .run_blocking(&LogProgress::default())
        .context("harvest run failed")?;

    let base_name = settings.export_base_name(started);
    let exported = export_events(&events, &settings.output.csv_path, &base_name)
        .with_context(|| format!("failed to export to {:?}", settings.output.csv_path))?;
    match exported {
        Some(summary) => engine_info!(
            "Wrote {} events to {:?} and {:?} in {}s",
            summary.event_count,
            summary.csv_path,
            summary.zip_path,
            (Local::now() - started).num_seconds()
        ),
        None => engine_info!("No events harvested; nothing written"),
    }
    Ok(())
}
