//! Harvester core: run configuration, field mapping and the pure paging
//! state machine. Nothing in this crate performs IO.
mod config;
mod effect;
mod event;
mod instance;
pub mod mapping;
mod msg;
mod record;
mod state;
mod update;

pub use config::{ConfigError, CredentialsConfig, HarvestConfig};
pub use effect::{Effect, RunStats};
pub use event::{Event, ResultSet};
pub use instance::Instance;
pub use mapping::{
    map_to_event, CompiledMapping, FieldMappingSpec, MappedEvent, MappingDiagnostic, MappingMiss,
};
pub use msg::Msg;
pub use record::{PathQuery, PathQueryError, RawRecord};
pub use state::{PageState, Phase};
pub use update::update;
