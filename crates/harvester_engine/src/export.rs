use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use harvester_core::{Event, ResultSet};
use serde_json::Value;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::persist::{write_atomic, PersistError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub event_count: usize,
    pub columns: Vec<String>,
    pub csv_path: PathBuf,
    pub zip_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Writes `{base_name}.csv` and `{base_name}.zip` (the CSV, deflated) into
/// `dir`. Nothing is written for an empty result set.
pub fn export_events(
    events: &ResultSet,
    dir: &Path,
    base_name: &str,
) -> Result<Option<ExportSummary>, ExportError> {
    if events.is_empty() {
        engine_info!("No events extracted, nothing to export");
        return Ok(None);
    }

    let columns = events.columns();
    let csv = render_csv(&columns, events.events());
    let csv_name = format!("{base_name}.csv");
    let csv_path = write_atomic(dir, &csv_name, csv.as_bytes())?;

    let archive = zip_single(&csv_name, csv.as_bytes())?;
    let zip_path = write_atomic(dir, &format!("{base_name}.zip"), &archive)?;

    engine_info!(
        "Exported {} events with {} columns to {:?}",
        events.len(),
        columns.len(),
        zip_path
    );
    Ok(Some(ExportSummary {
        event_count: events.len(),
        columns,
        csv_path,
        zip_path,
    }))
}

/// RFC 4180 CSV with a header row. Cells an event lacks are left empty.
pub fn render_csv(columns: &[String], events: &[Event]) -> String {
    let mut buffer = String::new();
    push_row(&mut buffer, columns.iter().map(|c| Cow::Borrowed(c.as_str())));
    for event in events {
        push_row(&mut buffer, columns.iter().map(|c| cell(event.get(c))));
    }
    buffer
}

fn cell(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(text)) => Cow::Borrowed(text.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn push_row<'a>(buffer: &mut String, cells: impl Iterator<Item = Cow<'a, str>>) {
    for (idx, cell) in cells.enumerate() {
        if idx > 0 {
            buffer.push(',');
        }
        if cell.contains([',', '"', '\r', '\n']) {
            buffer.push('"');
            buffer.push_str(&cell.replace('"', "\"\""));
            buffer.push('"');
        } else {
            buffer.push_str(&cell);
        }
    }
    buffer.push_str("\r\n");
}

fn zip_single(name: &str, content: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(name, options)?;
    writer.write_all(content)?;
    Ok(writer.finish()?.into_inner())
}
