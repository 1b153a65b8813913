//! Harvester engine: REST fetching, effect execution and export.
mod credentials;
mod discover;
mod engine;
mod export;
mod fetch;
mod harvest;
mod persist;
mod progress;
mod summary;
mod types;

pub use credentials::{ConfigCredentialResolver, Credential, CredentialResolver, StaticCredential};
pub use discover::{discover, search_query};
pub use engine::{HarvestError, Harvester};
pub use export::{export_events, render_csv, ExportError, ExportSummary};
pub use fetch::{Endpoint, FetchSettings, Fetcher, ReqwestFetcher};
pub use harvest::harvest_events;
pub use persist::{ensure_output_dir, write_atomic, PersistError};
pub use progress::{NoProgress, ProgressSink};
pub use summary::fetch_summaries;
pub use types::{
    EndpointKind, EngineEvent, FailureKind, FetchError, HarvestProgress, Stage,
};
